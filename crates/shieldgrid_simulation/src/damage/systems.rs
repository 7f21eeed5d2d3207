//! Damage routing system (FixedUpdate)

use bevy::prelude::*;

use super::host::EcsShieldHost;
use super::router::{intercept_damage, DamageInfo, DamageOutcome};
use super::{DamageResolved, IncomingDamage};
use crate::config::ShieldTuning;
use crate::registry::ShieldRegistry;
use crate::shield::ShieldStateChanged;

/// Система: прогоняет каждый IncomingDamage через router
///
/// Один event → один вызов `intercept_damage` → один `DamageResolved`.
/// Если хит сломал щит — дополнительно `ShieldStateChanged { broken: true }`.
pub fn route_incoming_damage(
    mut incoming: EventReader<IncomingDamage>,
    mut resolved: EventWriter<DamageResolved>,
    mut state_changes: EventWriter<ShieldStateChanged>,
    mut registry: ResMut<ShieldRegistry>,
    tuning: Res<ShieldTuning>,
    host: EcsShieldHost,
) {
    for event in incoming.read() {
        let mut damage = DamageInfo::new(event.amount, event.attacker);
        let outcome = intercept_damage(&mut registry, &host, &tuning, event.target, &mut damage);

        if let DamageOutcome::Absorbed {
            bearer,
            broke_shield: true,
            ..
        } = outcome
        {
            state_changes.write(ShieldStateChanged {
                entity: bearer,
                broken: true,
            });
        }

        resolved.write(DamageResolved {
            target: event.target,
            original: event.amount,
            amount: damage.amount,
            outcome,
        });
    }
}
