//! Tests for Generic / Modular shields.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bevy::prelude::*;

    use crate::config::{ShieldKind, ShieldSettings, ShieldTuning};
    use crate::geodesic::{generate, MeshCache};
    use crate::shield::{hp_budget, Shield};

    fn level_one_mesh() -> Arc<crate::geodesic::GeodesicMesh> {
        Arc::new(generate(1).expect("level 1"))
    }

    fn modular(range: f32) -> Shield {
        Shield::modular(range, &ShieldTuning::default(), level_one_mesh())
    }

    #[test]
    fn test_generic_parameters_from_tuning() {
        let tuning = ShieldTuning::default();
        let shield = Shield::generic(10.0, &tuning);

        // 60 hp/m × 10 m × 1.0
        assert_eq!(shield.kind(), ShieldKind::Generic);
        assert_eq!(shield.max_hp(), 600.0);
        assert_eq!(shield.current_hp(), 600.0);
        assert!((shield.regen_rate_per_second() - 12.0).abs() < 1e-4);
        assert_eq!(shield.recharge_delay_secs(), 15.0);
        assert!(shield.zones().len() == 1 && shield.mesh().is_none());
    }

    #[test]
    fn test_generic_take_damage_exact() {
        let mut shield = Shield::generic(10.0, &ShieldTuning::default());

        let absorbed = shield.take_damage(150.0);

        assert_eq!(absorbed, 150.0);
        assert_eq!(shield.current_hp(), 450.0);
        assert_eq!(shield.zones()[0].time_since_last_damage(), 0.0);
        assert!(!shield.is_broken());
    }

    #[test]
    fn test_generic_ignores_hit_position() {
        let mut shield = Shield::generic(10.0, &ShieldTuning::default());

        shield.take_damage_at_position(100.0, Vec3::new(500.0, 0.0, 0.0), &Transform::IDENTITY);

        assert_eq!(shield.current_hp(), 500.0);
    }

    #[test]
    fn test_modular_level_one_has_42_zones() {
        let shield = modular(10.0);

        assert_eq!(shield.kind(), ShieldKind::Modular);
        assert_eq!(shield.zones().len(), 42);
    }

    #[test]
    fn test_modular_each_zone_gets_full_budget() {
        let tuning = ShieldTuning::default();
        let shield = modular(10.0);
        let budget = hp_budget(tuning.hp_per_meter, 10.0, &tuning.modular);

        for zone in shield.zones() {
            assert_eq!(zone.max_hp(), budget);
        }

        let sum: f32 = shield.zones().iter().map(|z| z.max_hp()).sum();
        assert_eq!(sum, shield.max_hp());
    }

    #[test]
    fn test_modular_spread_damage_evenly() {
        let mut shield = modular(10.0);
        let before = shield.zones()[0].current_hp();

        let absorbed = shield.take_damage(420.0);

        assert!((absorbed - 420.0).abs() < 1e-2);
        for zone in shield.zones() {
            assert!((before - zone.current_hp() - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_modular_broken_only_when_all_zones_broken() {
        let mut shield = modular(10.0);
        let mesh = Arc::clone(shield.mesh().expect("modular mesh"));
        let huge = shield.max_hp();

        // Ломаем все зоны кроме последней
        for face in &mesh.faces[..mesh.faces.len() - 1] {
            shield.take_damage_at_position(huge, face.centroid * 10.0, &Transform::IDENTITY);
        }
        assert!(!shield.is_broken());
        assert_eq!(shield.zones().iter().filter(|z| z.is_broken()).count(), 41);

        let last = mesh.faces.last().expect("non-empty").centroid * 10.0;
        shield.take_damage_at_position(huge, last, &Transform::IDENTITY);
        assert!(shield.is_broken());
        assert_eq!(shield.current_hp(), 0.0);
    }

    #[test]
    fn test_position_hits_nearest_zone_only() {
        let mut shield = modular(10.0);
        let mesh = Arc::clone(shield.mesh().expect("modular mesh"));
        let full = shield.zones()[0].max_hp();

        for target in [0usize, 7, 12, 29, 41] {
            let hit = mesh.faces[target].centroid * 10.5;
            assert_eq!(shield.nearest_zone(hit, &Transform::IDENTITY), Some(target));

            let before: Vec<f32> = shield.zones().iter().map(|z| z.current_hp()).collect();
            shield.take_damage_at_position(5.0, hit, &Transform::IDENTITY);

            for (index, zone) in shield.zones().iter().enumerate() {
                let expected = if index == target { before[index] - 5.0 } else { before[index] };
                assert_eq!(zone.current_hp(), expected, "zone {}", index);
            }
        }

        assert!(shield.zones()[0].current_hp() < full);
    }

    #[test]
    fn test_zone_selection_follows_owner_transform() {
        let shield = modular(8.0);
        let mesh = Arc::clone(shield.mesh().expect("modular mesh"));
        let owner = Transform::from_translation(Vec3::new(100.0, -20.0, 5.0))
            .with_rotation(Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.3));

        for target in [3usize, 18, 33] {
            let hit = owner.transform_point(mesh.faces[target].centroid * 8.0);
            assert_eq!(shield.nearest_zone(hit, &owner), Some(target));
            assert!(shield
                .zone_world_center(target, &owner)
                .expect("zone exists")
                .distance(hit)
                < 1e-3);
        }
    }

    #[test]
    fn test_recreate_round_trip_restores_max_hp() {
        let mut shield = modular(10.0);
        let original_max = shield.max_hp();
        shield.take_damage(shield.max_hp() * 0.25);
        let fraction = shield.health_fraction();

        shield.recreate(25.0);
        assert!(shield.max_hp() > original_max);
        assert!((shield.health_fraction() - fraction).abs() < 1e-4);

        shield.recreate(10.0);
        assert!((shield.max_hp() - original_max).abs() < 1e-2);
        assert!((shield.health_fraction() - fraction).abs() < 1e-4);
        assert_eq!(shield.range(), 10.0);
    }

    #[test]
    fn test_recreate_keeps_broken_zones_at_zero() {
        let mut shield = Shield::generic(10.0, &ShieldTuning::default());
        shield.take_damage(10_000.0);

        shield.recreate(20.0);

        assert!(shield.is_broken());
        assert_eq!(shield.max_hp(), 1200.0);
    }

    #[test]
    fn test_range_clamped_in_constructors_and_recreate() {
        let tuning = ShieldTuning::default();

        let generic = Shield::generic(9_999.0, &tuning);
        assert_eq!(generic.range(), tuning.max_range);
        assert_eq!(generic.max_hp(), hp_budget(tuning.hp_per_meter, tuning.max_range, &tuning.generic));

        let mut shield = Shield::modular(0.5, &tuning, level_one_mesh());
        assert_eq!(shield.range(), tuning.min_range);

        shield.recreate(1_000.0);
        assert_eq!(shield.range(), tuning.max_range);

        shield.recreate(-3.0);
        assert_eq!(shield.range(), tuning.min_range);

        shield.recreate(f32::NAN);
        assert_eq!(shield.range(), tuning.min_range);
        assert!(shield.max_hp() > 0.0);
    }

    #[test]
    fn test_visual_impact_does_not_touch_hp() {
        let mut shield = modular(10.0);
        let hp = shield.current_hp();

        shield.trigger_visual_impact(Vec3::X * 10.0);
        shield.trigger_visual_impact(Vec3::Y * 10.0);

        assert_eq!(shield.current_hp(), hp);
        assert_eq!(shield.pending_impacts().len(), 2);
        assert_eq!(shield.drain_impacts(), vec![Vec3::X * 10.0, Vec3::Y * 10.0]);
        assert!(shield.pending_impacts().is_empty());
    }

    #[test]
    fn test_power_usage_zero_when_inactive() {
        let mut shield = Shield::generic(10.0, &ShieldTuning::default());
        assert_eq!(shield.power_usage_watts(), 500.0);

        shield.set_active(false);
        assert_eq!(shield.power_usage_watts(), 0.0);
    }

    #[test]
    fn test_build_from_settings_uses_cache_and_clamps() {
        let tuning = ShieldTuning::default();
        let mut cache = MeshCache::new();

        let settings = ShieldSettings::new(9_999.0, ShieldKind::Modular, false);
        let shield = Shield::build(settings, &tuning, &mut cache).expect("valid build");

        assert_eq!(shield.range(), tuning.max_range);
        assert!(!shield.is_active());
        assert_eq!(shield.zones().len(), 42);
        assert_eq!(cache.len(), 1);

        let generic = Shield::build(ShieldSettings::default(), &tuning, &mut cache).expect("valid build");
        assert_eq!(generic.kind(), ShieldKind::Generic);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_render_data_modular_and_generic() {
        let mut shield = modular(4.0);
        let mesh = Arc::clone(shield.mesh().expect("modular mesh"));
        shield.take_damage_at_position(shield.zones()[0].max_hp() / 2.0, mesh.faces[0].centroid * 4.0, &Transform::IDENTITY);

        let data = shield.render_data();
        assert_eq!(data.kind, ShieldKind::Modular);
        assert_eq!(data.zones.len(), 42);
        assert_eq!(data.wireframe.len(), 120);
        assert!((data.zones[0].health_fraction - 0.5).abs() < 1e-4);
        assert_eq!(data.zones[1].health_fraction, 1.0);
        for zone in &data.zones {
            assert!(zone.corners.len() == 5 || zone.corners.len() == 6);
            assert!((zone.local_center.length() - 4.0).abs() < 1e-3);
        }

        let generic = Shield::generic(4.0, &ShieldTuning::default()).render_data();
        assert_eq!(generic.zones.len(), 1);
        assert!(generic.zones[0].corners.is_empty() && generic.wireframe.is_empty());
    }

    #[test]
    fn test_hp_invariant_under_mixed_load() {
        let mut shield = modular(6.0);
        let mesh = Arc::clone(shield.mesh().expect("modular mesh"));

        for tick in 0..1200usize {
            match tick % 11 {
                0 => {
                    let face = &mesh.faces[tick % mesh.faces.len()];
                    shield.take_damage_at_position(40.0, face.centroid * 6.0, &Transform::IDENTITY);
                }
                5 => {
                    shield.take_damage(500.0);
                }
                _ => {}
            }
            shield.update(1.0 / 60.0);

            assert!(shield.current_hp() >= 0.0 && shield.current_hp() <= shield.max_hp() + 1e-3);
            for zone in shield.zones() {
                assert!(zone.current_hp() >= 0.0 && zone.current_hp() <= zone.max_hp());
            }
        }
    }
}
