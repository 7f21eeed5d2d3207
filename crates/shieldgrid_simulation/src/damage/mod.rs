//! Damage routing (shield interception layer)
//!
//! ECS ответственность:
//! - Каждый [`IncomingDamage`] проходит через [`intercept_damage`] ровно один раз
//! - Результат уходит дальше как [`DamageResolved`] (amount уже с учётом щита)
//!
//! Хост ответственность:
//! - Генерировать `IncomingDamage` из своего damage pipeline
//! - Применять `DamageResolved::amount` к цели

use bevy::prelude::*;

pub mod host;
pub mod router;
pub mod systems;


pub use host::{CharacterBody, EcsShieldHost, ShieldHost, StructureBlock};
pub use router::{
    intercept_damage, shield_center, surface_point, AttackerPosition, DamageInfo, DamageOutcome,
};

/// Event: урон летит в цель (хост → router)
#[derive(Event, Debug, Clone)]
pub struct IncomingDamage {
    pub target: Entity,
    pub amount: f32,
    /// Кто нанёс урон (None — окружение / неизвестно)
    pub attacker: Option<Entity>,
}

/// Event: урон после перехвата (router → хост)
#[derive(Event, Debug, Clone)]
pub struct DamageResolved {
    pub target: Entity,
    /// Исходный урон
    pub original: f32,
    /// Что осталось для цели (0.0 при полном поглощении)
    pub amount: f32,
    pub outcome: DamageOutcome,
}
