//! Damage interception — единая точка, через которую проходит каждый хит.
//!
//! Порядок решения:
//! 1. Цель → владелец щита (через [`ShieldHost`]); нет щита → урон проходит
//! 2. Центр щита = позиция владельца (+ offset для персонажей), радиус = range
//! 3. Атакующий внутри сферы (`dist² < r²`) → урон проходит без изменений
//! 4. Атакующий не резолвится → та же проверка по точке попадания цели,
//!    но граница считается «внутри» (снаружи → урон проходит)
//! 5. Щит выключен или полностью сломан → урон проходит
//! 6. Иначе: impact notification → урон в щит → amount обнуляется
//!    (или остаток при `AbsorptionPolicy::Spillover`)

use bevy::prelude::*;

use super::host::ShieldHost;
use crate::config::{AbsorptionPolicy, ShieldTuning};
use crate::registry::ShieldRegistry;

/// Входящий урон; router мутирует `amount`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageInfo {
    pub amount: f32,
    pub attacker: Option<Entity>,
}

impl DamageInfo {
    pub fn new(amount: f32, attacker: Option<Entity>) -> Self {
        Self { amount, attacker }
    }
}

/// Позиция атакующего. Unresolved — атакующего нет или он уже удалён.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackerPosition {
    Resolved(Vec3),
    Unresolved,
}

impl AttackerPosition {
    pub fn resolve(host: &impl ShieldHost, attacker: Option<Entity>) -> Self {
        attacker
            .and_then(|entity| host.world_transform(entity))
            .map_or(Self::Unresolved, |transform| Self::Resolved(transform.translation))
    }
}

/// Чем закончился перехват
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// У цели нет зарегистрированного щита (или цель уже удалена)
    NoShield,
    /// Атакующий строго внутри сферы щита
    AttackerInside,
    /// Атакующий неизвестен, точка попадания вне сферы
    HitOutside,
    /// Атакующий неизвестен и точку попадания вычислить нельзя
    HitUnresolved,
    /// Щит выключен или полностью сломан
    ShieldDown { bearer: Entity },
    Absorbed {
        bearer: Entity,
        /// Точка на поверхности сферы щита (world space)
        impact: Vec3,
        /// HP, реально снятое со щита
        absorbed: f32,
        /// Этот хит сломал щит целиком
        broke_shield: bool,
    },
}

impl DamageOutcome {
    pub fn is_absorbed(&self) -> bool {
        matches!(self, Self::Absorbed { .. })
    }
}

/// Центр щита: позиция владельца, для персонажа — со смещением в local space
pub fn shield_center(owner: &Transform, is_character: bool, tuning: &ShieldTuning) -> Vec3 {
    if is_character {
        owner.translation + owner.rotation * tuning.character_offset()
    } else {
        owner.translation
    }
}

/// Проекция `toward` на поверхность сферы. Совпадение с центром → ось +Y.
pub fn surface_point(center: Vec3, toward: Vec3, radius: f32) -> Vec3 {
    let direction = (toward - center).try_normalize().unwrap_or(Vec3::Y);
    center + direction * radius
}

pub fn intercept_damage(
    registry: &mut ShieldRegistry,
    host: &impl ShieldHost,
    tuning: &ShieldTuning,
    target: Entity,
    damage: &mut DamageInfo,
) -> DamageOutcome {
    let Some(bearer) = host.shield_bearer(target) else {
        return DamageOutcome::NoShield;
    };
    let Some(shield) = registry.get_mut(bearer) else {
        return DamageOutcome::NoShield;
    };
    let Some(owner) = host.world_transform(bearer) else {
        return DamageOutcome::NoShield;
    };

    let center = shield_center(&owner, host.is_character(bearer), tuning);
    let radius_sq = shield.range() * shield.range();

    let probe = match AttackerPosition::resolve(host, damage.attacker) {
        AttackerPosition::Resolved(attacker) => {
            if attacker.distance_squared(center) < radius_sq {
                return DamageOutcome::AttackerInside;
            }
            attacker
        }
        AttackerPosition::Unresolved => {
            let Some(hit) = host.hit_position(target) else {
                return DamageOutcome::HitUnresolved;
            };
            if hit.distance_squared(center) > radius_sq {
                return DamageOutcome::HitOutside;
            }
            hit
        }
    };

    if !shield.is_active() || shield.is_broken() {
        return DamageOutcome::ShieldDown { bearer };
    }

    let impact = surface_point(center, probe, shield.range());
    let frame = Transform {
        translation: center,
        ..owner
    };

    shield.trigger_visual_impact(impact);
    let absorbed = shield.take_damage_at_position(damage.amount, impact, &frame);
    let broke_shield = shield.is_broken();

    damage.amount = match tuning.absorption {
        AbsorptionPolicy::FullNegation => 0.0,
        AbsorptionPolicy::Spillover => (damage.amount - absorbed).max(0.0),
    };

    crate::logger::log(&format!(
        "🛡️ Shield absorbed: bearer={:?}, absorbed={:.1}, remaining={:.1}, shield_hp={:.0}/{:.0}",
        bearer,
        absorbed,
        damage.amount,
        shield.current_hp(),
        shield.max_hp()
    ));
    if broke_shield {
        crate::logger::log_info(&format!("💥 Shield BROKEN: bearer={:?}", bearer));
    }

    DamageOutcome::Absorbed {
        bearer,
        impact,
        absorbed,
        broke_shield,
    }
}
