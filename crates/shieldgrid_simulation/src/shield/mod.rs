//! Energy shield module
//!
//! - zone: ShieldZone state machine (Healthy / Broken, regen + recharge delay)
//! - energy_shield: Shield (Generic — один пул, Modular — зона на грань geodesic mesh)
//! - render: снимок для presentation слоя
//! - systems: lifecycle emitter'ов, тик, слив impact outbox
//!
//! Порядок FixedUpdate (chain):
//! 1. unregister_removed_emitters → sync_shield_emitters — lifecycle
//! 2. route_incoming_damage — перехват урона
//! 3. tick_shields — реген всех зон (dt = fixed timestep)
//! 4. emit_shield_impacts — outbox → ShieldImpact events

use bevy::prelude::*;

pub mod energy_shield;
pub mod render;
pub mod systems;
pub mod zone;

#[cfg(test)]
mod shield_tests;

pub use energy_shield::{hp_budget, zone_parameters, Shield, ShieldBody};
pub use render::{ShieldRenderData, ZoneVisual};
pub use zone::ShieldZone;

use crate::config::{ShieldSettings, ShieldTuning};
use crate::damage::{self, DamageResolved, IncomingDamage};
use crate::geodesic::MeshCache;
use crate::registry::ShieldRegistry;

/// Компонент: entity излучает щит с этими настройками.
///
/// Добавление → регистрация, изменение → recreate/swap, удаление → unregister.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ShieldEmitter {
    pub settings: ShieldSettings,
}

impl ShieldEmitter {
    pub fn new(settings: ShieldSettings) -> Self {
        Self { settings }
    }
}

/// Event: попадание в щит (для ripple VFX на стороне presentation)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShieldImpact {
    pub entity: Entity,
    pub position: Vec3,
}

/// Event: щит сломался целиком / снова заработал
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShieldStateChanged {
    pub entity: Entity,
    pub broken: bool,
}

/// Shield Plugin
///
/// Ресурсы: MeshCache, ShieldRegistry, ShieldTuning (если хост не вставил свой).
/// Все системы в FixedUpdate, последовательно.
pub struct ShieldPlugin;

impl Plugin for ShieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeshCache>()
            .init_resource::<ShieldRegistry>()
            .init_resource::<ShieldTuning>();

        app.add_event::<IncomingDamage>()
            .add_event::<DamageResolved>()
            .add_event::<ShieldImpact>()
            .add_event::<ShieldStateChanged>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Lifecycle (сначала unregister, потом sync)
                systems::unregister_removed_emitters,
                systems::sync_shield_emitters,

                // Фаза 2: Damage interception
                damage::systems::route_incoming_damage,

                // Фаза 3: Regen
                systems::tick_shields,

                // Фаза 4: Visual notifications
                systems::emit_shield_impacts,
            )
                .chain(),
        );
    }
}
