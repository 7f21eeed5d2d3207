//! ShieldRegistry — Entity → Shield (один активный щит на entity)
//!
//! Владеется App как Resource (никаких static). BTreeMap — детерминированный
//! порядок обхода для тиков и snapshot'ов.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::config::{ShieldSettings, ShieldTuning};
use crate::error::{RegistryError, ShieldError};
use crate::geodesic::MeshCache;
use crate::shield::Shield;

/// Щит перешёл между «сломан» и «работает» за тик
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenTransition {
    pub entity: Entity,
    pub broken: bool,
}

#[derive(Resource, Debug, Default)]
pub struct ShieldRegistry {
    shields: BTreeMap<Entity, Shield>,
}

impl ShieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Регистрирует щит; повторная регистрация перезаписывает (старый возвращается).
    ///
    /// `Entity::PLACEHOLDER` отклоняется без изменения состояния.
    pub fn register(&mut self, entity: Entity, shield: Shield) -> Result<Option<Shield>, RegistryError> {
        if entity == Entity::PLACEHOLDER {
            crate::logger::log_warning("🛡️ Shield registration rejected: placeholder entity");
            return Err(RegistryError::PlaceholderEntity);
        }

        crate::logger::log(&format!(
            "🛡️ Shield registered: entity={:?}, kind={:?}, range={:.1}, max_hp={:.0}",
            entity,
            shield.kind(),
            shield.range(),
            shield.max_hp()
        ));
        Ok(self.shields.insert(entity, shield))
    }

    pub fn unregister(&mut self, entity: Entity) -> Option<Shield> {
        let removed = self.shields.remove(&entity);
        if removed.is_some() {
            crate::logger::log(&format!("🛡️ Shield unregistered: entity={:?}", entity));
        }
        removed
    }

    pub fn is_registered(&self, entity: Entity) -> bool {
        self.shields.contains_key(&entity)
    }

    pub fn get(&self, entity: Entity) -> Option<&Shield> {
        self.shields.get(&entity)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut Shield> {
        self.shields.get_mut(&entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Shield)> {
        self.shields.iter().map(|(&entity, shield)| (entity, shield))
    }

    pub fn len(&self) -> usize {
        self.shields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shields.is_empty()
    }

    /// Применяет `(range, kind, active)` к зарегистрированному щиту.
    ///
    /// - тот же kind: `set_active` + `recreate` при смене радиуса
    /// - другой kind: строится новый щит, переносится доля HP, старый заменяется
    pub fn apply_settings(
        &mut self,
        entity: Entity,
        settings: ShieldSettings,
        tuning: &ShieldTuning,
        cache: &mut MeshCache,
    ) -> Result<(), ShieldError> {
        let settings = settings.clamped(tuning);
        let shield = self
            .shields
            .get_mut(&entity)
            .ok_or(RegistryError::NotRegistered(entity))?;

        if shield.kind() == settings.kind {
            shield.set_active(settings.active);
            if shield.range() != settings.range {
                shield.recreate(settings.range);
                crate::logger::log(&format!(
                    "🛡️ Shield recreated: entity={:?}, range={:.1}, max_hp={:.0}",
                    entity,
                    settings.range,
                    shield.max_hp()
                ));
            }
            return Ok(());
        }

        let fraction = shield.health_fraction();
        let mut replacement = Shield::build(settings, tuning, cache)?;
        replacement.carry_health_fraction(fraction);

        crate::logger::log(&format!(
            "🛡️ Shield type swapped: entity={:?}, {:?} → {:?}",
            entity,
            shield.kind(),
            settings.kind
        ));
        *shield = replacement;
        Ok(())
    }

    /// Тик всех щитов. Возвращает переходы broken ↔ functional.
    pub fn update_all(&mut self, dt: f32) -> Vec<BrokenTransition> {
        let mut transitions = Vec::new();

        for (&entity, shield) in self.shields.iter_mut() {
            let was_broken = shield.is_broken();
            shield.update(dt);
            let broken = shield.is_broken();

            if was_broken != broken {
                transitions.push(BrokenTransition { entity, broken });
            }
        }

        transitions
    }

    /// Сливает impact outbox всех щитов (порядок — по Entity)
    pub fn drain_impacts(&mut self) -> Vec<(Entity, Vec3)> {
        self.shields
            .iter_mut()
            .flat_map(|(&entity, shield)| {
                shield
                    .drain_impacts()
                    .into_iter()
                    .map(move |position| (entity, position))
            })
            .collect()
    }
}
