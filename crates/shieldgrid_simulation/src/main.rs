//! Headless симуляция SHIELDGRID
//!
//! Seeded barrage: несколько стрелков вокруг структуры и персонажа,
//! случайные хиты каждые несколько тиков, 1000 fixed тиков.

use bevy::prelude::*;
use rand::Rng;
use shieldgrid_simulation::logger::{self, LogLevel};
use shieldgrid_simulation::{
    create_headless_app, run_fixed_tick, CharacterBody, DeterministicRng, IncomingDamage,
    ShieldEmitter, ShieldKind, ShieldRegistry, ShieldSettings, SimulationPlugin, StructureBlock,
};

fn main() {
    let seed = 42;
    println!("Starting SHIELDGRID headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);

    // Каждый поглощённый хит логируется на Debug — для barrage это шум
    logger::set_log_level(LogLevel::Info);

    let world = app.world_mut();
    let structure = world
        .spawn((
            Transform::from_translation(Vec3::ZERO),
            ShieldEmitter::new(ShieldSettings::new(20.0, ShieldKind::Modular, true)),
        ))
        .id();
    let block = world
        .spawn((
            Transform::from_translation(Vec3::new(2.0, 0.0, 1.0)),
            StructureBlock { structure },
        ))
        .id();
    let character = world
        .spawn((
            Transform::from_translation(Vec3::new(60.0, 0.0, 0.0)),
            CharacterBody::default(),
            ShieldEmitter::new(ShieldSettings::new(3.0, ShieldKind::Generic, true)),
        ))
        .id();

    let shooters: Vec<Entity> = (0..4)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::FRAC_PI_2;
            let position = Vec3::new(angle.cos(), 0.3, angle.sin()) * 40.0;
            world.spawn(Transform::from_translation(position)).id()
        })
        .collect();

    for tick in 0..1000 {
        if tick % 5 == 0 {
            let world = app.world_mut();
            let (shooter, target, amount) = {
                let mut rng = world.resource_mut::<DeterministicRng>();
                let shooter = shooters[rng.rng.gen_range(0..shooters.len())];
                let target = if rng.rng.gen_bool(0.7) { block } else { character };
                (shooter, target, rng.rng.gen_range(20.0..200.0))
            };
            world.send_event(IncomingDamage {
                target,
                amount,
                attacker: Some(shooter),
            });
        }

        run_fixed_tick(&mut app);

        if tick % 100 == 0 {
            let registry = app.world().resource::<ShieldRegistry>();
            for (entity, shield) in registry.iter() {
                println!(
                    "Tick {}: {:?} {:?} hp {:.0}/{:.0} broken={}",
                    tick,
                    entity,
                    shield.kind(),
                    shield.current_hp(),
                    shield.max_hp(),
                    shield.is_broken()
                );
            }
        }
    }

    println!("Simulation complete!");
}
