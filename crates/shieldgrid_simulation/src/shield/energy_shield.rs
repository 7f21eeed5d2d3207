//! Shield — tagged variant над {Generic, Modular}.
//!
//! Общие поля (range, active, tuning, impact outbox) лежат в [`Shield`],
//! различие «хранимый пул vs сумма по зонам» — в [`ShieldBody`].

use std::sync::Arc;

use bevy::prelude::*;

use super::zone::ShieldZone;
use crate::config::{KindTuning, ShieldKind, ShieldSettings, ShieldTuning};
use crate::error::MeshError;
use crate::geodesic::{GeodesicMesh, MeshCache};

/// HP бюджет щита радиуса `range`: `hp_per_meter · range · multiplier`
pub fn hp_budget(hp_per_meter: f32, range: f32, tuning: &KindTuning) -> f32 {
    (hp_per_meter * range * tuning.hp_multiplier).max(0.0)
}

/// Параметры одной зоны `(max_hp, regen_rate, recharge_delay)` из бюджета
pub fn zone_parameters(budget: f32, tuning: &KindTuning) -> (f32, f32, f32) {
    (
        budget,
        budget * tuning.regen_fraction,
        tuning.recharge_delay_secs,
    )
}

/// Local-space точка щита → world space
pub fn to_world(owner: &Transform, local: Vec3) -> Vec3 {
    owner.transform_point(local)
}

#[derive(Debug, Clone)]
pub enum ShieldBody {
    /// Один неявный пул, позиция попадания игнорируется
    Generic(ShieldZone),
    /// Зона на каждую грань mesh (индексы совпадают с `mesh.faces`)
    Modular {
        mesh: Arc<GeodesicMesh>,
        zones: Vec<ShieldZone>,
    },
}

/// Энергощит одной entity.
///
/// Инвариант: 0.0 ≤ current_hp() ≤ max_hp()
#[derive(Debug, Clone)]
pub struct Shield {
    range: f32,
    /// `[min, max]` из tuning на момент постройки, держится и при recreate
    range_limits: (f32, f32),
    is_active: bool,
    hp_per_meter: f32,
    tuning: KindTuning,
    body: ShieldBody,
    /// Outbox точек попадания, сливается раз в тик в `ShieldImpact` events
    impacts: Vec<Vec3>,
}

impl Shield {
    /// Generic щит; `range` клампится в `[min_range, max_range]`
    pub fn generic(range: f32, tuning: &ShieldTuning) -> Self {
        let range = tuning.clamp_range(range);
        let kind_tuning = *tuning.kind(ShieldKind::Generic);
        let budget = hp_budget(tuning.hp_per_meter, range, &kind_tuning);
        let (max_hp, regen, delay) = zone_parameters(budget, &kind_tuning);

        Self {
            range,
            range_limits: (tuning.min_range, tuning.max_range),
            is_active: true,
            hp_per_meter: tuning.hp_per_meter,
            tuning: kind_tuning,
            body: ShieldBody::Generic(ShieldZone::new(max_hp, regen, delay)),
            impacts: Vec::new(),
        }
    }

    /// Modular щит: по зоне на каждую грань `mesh`.
    ///
    /// Каждая зона получает полный бюджет щита (не 1/N долю).
    pub fn modular(range: f32, tuning: &ShieldTuning, mesh: Arc<GeodesicMesh>) -> Self {
        let range = tuning.clamp_range(range);
        let kind_tuning = *tuning.kind(ShieldKind::Modular);
        let budget = hp_budget(tuning.hp_per_meter, range, &kind_tuning);
        let (max_hp, regen, delay) = zone_parameters(budget, &kind_tuning);
        let zones = vec![ShieldZone::new(max_hp, regen, delay); mesh.faces.len()];

        Self {
            range,
            range_limits: (tuning.min_range, tuning.max_range),
            is_active: true,
            hp_per_meter: tuning.hp_per_meter,
            tuning: kind_tuning,
            body: ShieldBody::Modular { mesh, zones },
            impacts: Vec::new(),
        }
    }

    /// Собирает щит из настроек emitter'а (clamp range, mesh из кэша)
    pub fn build(
        settings: ShieldSettings,
        tuning: &ShieldTuning,
        cache: &mut MeshCache,
    ) -> Result<Self, MeshError> {
        let settings = settings.clamped(tuning);
        let mut shield = match settings.kind {
            ShieldKind::Generic => Self::generic(settings.range, tuning),
            ShieldKind::Modular => {
                let mesh = cache.get_or_generate(tuning.modular_subdivisions)?;
                Self::modular(settings.range, tuning, mesh)
            }
        };
        shield.set_active(settings.active);
        Ok(shield)
    }

    pub fn kind(&self) -> ShieldKind {
        match self.body {
            ShieldBody::Generic(_) => ShieldKind::Generic,
            ShieldBody::Modular { .. } => ShieldKind::Modular,
        }
    }

    pub fn body(&self) -> &ShieldBody {
        &self.body
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn zones(&self) -> &[ShieldZone] {
        match &self.body {
            ShieldBody::Generic(zone) => std::slice::from_ref(zone),
            ShieldBody::Modular { zones, .. } => zones,
        }
    }

    fn zones_mut(&mut self) -> &mut [ShieldZone] {
        match &mut self.body {
            ShieldBody::Generic(zone) => std::slice::from_mut(zone),
            ShieldBody::Modular { zones, .. } => zones,
        }
    }

    pub fn mesh(&self) -> Option<&Arc<GeodesicMesh>> {
        match &self.body {
            ShieldBody::Generic(_) => None,
            ShieldBody::Modular { mesh, .. } => Some(mesh),
        }
    }

    pub fn max_hp(&self) -> f32 {
        self.zones().iter().map(ShieldZone::max_hp).sum()
    }

    pub fn current_hp(&self) -> f32 {
        self.zones().iter().map(ShieldZone::current_hp).sum()
    }

    pub fn regen_rate_per_second(&self) -> f32 {
        self.zones().iter().map(ShieldZone::regen_rate).sum()
    }

    pub fn recharge_delay_secs(&self) -> f32 {
        self.tuning.recharge_delay_secs
    }

    /// Потребление (Вт); выключенный щит ничего не ест
    pub fn power_usage_watts(&self) -> f32 {
        if self.is_active {
            self.tuning.watts_per_meter * self.range
        } else {
            0.0
        }
    }

    /// Сломан, только если сломаны ВСЕ зоны
    pub fn is_broken(&self) -> bool {
        self.zones().iter().all(ShieldZone::is_broken)
    }

    pub fn health_fraction(&self) -> f32 {
        let max = self.max_hp();
        if max > 0.0 {
            self.current_hp() / max
        } else {
            0.0
        }
    }

    /// Урон без позиции. Modular: `amount / N` в каждую зону.
    ///
    /// Возвращает суммарно поглощённое HP.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        match &mut self.body {
            ShieldBody::Generic(zone) => zone.take_damage(amount),
            ShieldBody::Modular { zones, .. } => {
                if zones.is_empty() {
                    return 0.0;
                }
                let share = amount / zones.len() as f32;
                zones.iter_mut().map(|zone| zone.take_damage(share)).sum()
            }
        }
    }

    /// Урон в точку `hit` (world space). Modular: весь урон в ближайшую зону.
    pub fn take_damage_at_position(&mut self, amount: f32, hit: Vec3, owner: &Transform) -> f32 {
        if let (Some(index), ShieldBody::Modular { zones, .. }) =
            (self.nearest_zone(hit, owner), &mut self.body)
        {
            return zones[index].take_damage(amount);
        }

        self.take_damage(amount)
    }

    /// Индекс зоны с минимальным квадратом расстояния до `hit` (первая при равенстве).
    /// Generic → None.
    pub fn nearest_zone(&self, hit: Vec3, owner: &Transform) -> Option<usize> {
        let ShieldBody::Modular { mesh, .. } = &self.body else {
            return None;
        };

        let mut best: Option<(usize, f32)> = None;
        for (index, face) in mesh.faces.iter().enumerate() {
            let distance_sq = to_world(owner, face.centroid * self.range).distance_squared(hit);
            match best {
                Some((_, best_sq)) if distance_sq >= best_sq => {}
                _ => best = Some((index, distance_sq)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// World-space центр зоны `index`
    pub fn zone_world_center(&self, index: usize, owner: &Transform) -> Option<Vec3> {
        let face = self.mesh()?.faces.get(index)?;
        Some(to_world(owner, face.centroid * self.range))
    }

    /// Impact notification без изменения HP (косметические хиты тоже видны)
    pub fn trigger_visual_impact(&mut self, world_position: Vec3) {
        self.impacts.push(world_position);
    }

    pub fn pending_impacts(&self) -> &[Vec3] {
        &self.impacts
    }

    pub fn drain_impacts(&mut self) -> Vec<Vec3> {
        std::mem::take(&mut self.impacts)
    }

    /// Тик всех зон
    pub fn update(&mut self, dt: f32) {
        for zone in self.zones_mut() {
            zone.update(dt);
        }
    }

    /// Новый радиус (клампится в limits): пересчёт параметров зон с сохранением
    /// доли HP каждой зоны
    pub fn recreate(&mut self, new_range: f32) {
        let (min, max) = self.range_limits;
        self.range = if new_range.is_nan() { min } else { new_range.max(min).min(max) };

        let budget = hp_budget(self.hp_per_meter, self.range, &self.tuning);
        let (max_hp, regen, delay) = zone_parameters(budget, &self.tuning);

        for zone in self.zones_mut() {
            zone.set_new_parameters(max_hp, regen, delay);
        }
    }

    /// Перекладывает долю HP с другого щита (используется при смене типа)
    pub(crate) fn carry_health_fraction(&mut self, fraction: f32) {
        let fraction = fraction.clamp(0.0, 1.0);
        for zone in self.zones_mut() {
            let target = zone.max_hp() * fraction;
            let excess = zone.current_hp() - target;
            if excess > 0.0 {
                zone.take_damage(excess);
            }
        }
    }
}
