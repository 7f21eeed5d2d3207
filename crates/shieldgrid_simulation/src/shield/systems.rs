//! Shield lifecycle + tick systems.

use bevy::prelude::*;

use super::{Shield, ShieldEmitter, ShieldImpact, ShieldStateChanged};
use crate::config::ShieldTuning;
use crate::geodesic::MeshCache;
use crate::registry::ShieldRegistry;

/// Система: регистрация новых emitter'ов и применение изменённых настроек
///
/// `Changed<ShieldEmitter>` срабатывает и на добавление: незарегистрированный
/// emitter строит щит с нуля, зарегистрированный — recreate / type swap.
pub fn sync_shield_emitters(
    emitters: Query<(Entity, &ShieldEmitter), Changed<ShieldEmitter>>,
    mut registry: ResMut<ShieldRegistry>,
    mut cache: ResMut<MeshCache>,
    tuning: Res<ShieldTuning>,
) {
    for (entity, emitter) in emitters.iter() {
        if registry.is_registered(entity) {
            if let Err(err) = registry.apply_settings(entity, emitter.settings, &tuning, &mut cache) {
                crate::logger::log_error(&format!(
                    "🛡️ Failed to apply shield settings for {:?}: {}",
                    entity, err
                ));
            }
            continue;
        }

        let shield = match Shield::build(emitter.settings, &tuning, &mut cache) {
            Ok(shield) => shield,
            Err(err) => {
                crate::logger::log_error(&format!(
                    "🛡️ Failed to build shield for {:?}: {}",
                    entity, err
                ));
                continue;
            }
        };

        if let Err(err) = registry.register(entity, shield) {
            crate::logger::log_error(&format!("🛡️ {}", err));
        }
    }
}

/// Система: entity закрыта / emitter снят → unregister
///
/// Emitter сняли и поставили заново между тиками → щит остаётся,
/// новые настройки применит `sync_shield_emitters`.
pub fn unregister_removed_emitters(
    mut removed: RemovedComponents<ShieldEmitter>,
    emitters: Query<(), With<ShieldEmitter>>,
    mut registry: ResMut<ShieldRegistry>,
) {
    for entity in removed.read() {
        if emitters.contains(entity) {
            continue;
        }
        registry.unregister(entity);
    }
}

/// Система: тик регена всех щитов
///
/// dt = fixed timestep (60 Hz), не wall clock — детерминизм.
pub fn tick_shields(
    mut registry: ResMut<ShieldRegistry>,
    mut state_changes: EventWriter<ShieldStateChanged>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.timestep().as_secs_f32();

    for transition in registry.update_all(dt) {
        if !transition.broken {
            crate::logger::log_info(&format!(
                "🔋 Shield restored: entity={:?}",
                transition.entity
            ));
        }
        state_changes.write(ShieldStateChanged {
            entity: transition.entity,
            broken: transition.broken,
        });
    }
}

/// Система: impact outbox → ShieldImpact events (раз в тик)
pub fn emit_shield_impacts(
    mut registry: ResMut<ShieldRegistry>,
    mut impacts: EventWriter<ShieldImpact>,
) {
    for (entity, position) in registry.drain_impacts() {
        impacts.write(ShieldImpact { entity, position });
    }
}
