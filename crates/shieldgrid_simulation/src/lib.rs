//! SHIELDGRID Simulation Core
//!
//! Энергощиты на Bevy ECS 0.16 (headless, без рендера):
//! - geodesic: dual mesh икосферы → зоны щита (12 пентагонов + гексагоны)
//! - shield: ShieldZone state machine, Generic / Modular щиты
//! - registry: Entity → Shield
//! - damage: перехват урона, eligibility по сфере, роутинг в зону
//!
//! Всё крутится в FixedUpdate 60Hz, dt передаётся явно.
//! Presentation (VFX, UI) и persistence — на стороне хоста.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod config;
pub mod damage;
pub mod error;
pub mod geodesic;
pub mod logger;
pub mod registry;
pub mod shield;

// Re-export основных типов
pub use config::{AbsorptionPolicy, KindTuning, ShieldKind, ShieldSettings, ShieldTuning};
pub use damage::{
    intercept_damage, AttackerPosition, CharacterBody, DamageInfo, DamageOutcome, DamageResolved,
    IncomingDamage, ShieldHost, StructureBlock,
};
pub use error::{ConfigError, MeshError, RegistryError, ShieldError};
pub use geodesic::{GeodesicMesh, MeshCache, PolygonFace};
pub use registry::ShieldRegistry;
pub use shield::{
    Shield, ShieldEmitter, ShieldImpact, ShieldPlugin, ShieldRenderData, ShieldStateChanged,
    ShieldZone,
};

/// Главный plugin симуляции
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(ShieldPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Прогоняет ровно один fixed tick (без wall clock) — для тестов и headless прогонов
///
/// Schedule `First` тут не крутится, поэтому буферы shield events свапаются
/// вручную перед тиком: событие живёт два тика, как при `app.update()`.
/// События, записанные за этот тик, читаются через `iter_current_update_events`.
pub fn run_fixed_tick(app: &mut App) {
    let world = app.world_mut();
    update_events::<IncomingDamage>(world);
    update_events::<DamageResolved>(world);
    update_events::<ShieldImpact>(world);
    update_events::<ShieldStateChanged>(world);

    world.run_schedule(FixedUpdate);
}

/// Swap double buffer (no-op, если event не зарегистрирован)
fn update_events<E: Event>(world: &mut World) {
    if let Some(mut events) = world.get_resource_mut::<Events<E>>() {
        events.update();
    }
}

/// Snapshot всех щитов для сравнения детерминизма
///
/// Порядок — по Entity (registry на BTreeMap), HP в битовом виде.
pub fn registry_snapshot(registry: &ShieldRegistry) -> Vec<u8> {
    let mut snapshot = Vec::new();

    for (entity, shield) in registry.iter() {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", shield.kind()).as_bytes());
        snapshot.extend_from_slice(&shield.range().to_bits().to_le_bytes());
        for zone in shield.zones() {
            snapshot.extend_from_slice(&zone.current_hp().to_bits().to_le_bytes());
            snapshot.extend_from_slice(&zone.time_since_last_damage().to_bits().to_le_bytes());
        }
    }

    snapshot
}
