//! ShieldZone — один независимый пул HP щита.
//!
//! State machine:
//! - **Healthy** (`current_hp > 0`): реген каждый тик, delay clock держится на 0
//! - **Broken** (`current_hp == 0`): копим `time_since_last_damage`, реген только
//!   после `recharge_delay_secs`
//!
//! Любой урон (не только ломающий) сбрасывает delay clock в 0.

use bevy::prelude::*;

/// Одна зона щита (для Generic — единственный неявный пул)
///
/// Инвариант: 0.0 ≤ current_hp ≤ max_hp
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct ShieldZone {
    max_hp: f32,
    current_hp: f32,
    regen_rate: f32,
    recharge_delay_secs: f32,
    time_since_last_damage: f32,
}

impl ShieldZone {
    /// Новая зона на полном HP
    pub fn new(max_hp: f32, regen_rate: f32, recharge_delay_secs: f32) -> Self {
        let max_hp = max_hp.max(0.0);
        Self {
            max_hp,
            current_hp: max_hp,
            regen_rate: regen_rate.max(0.0),
            recharge_delay_secs: recharge_delay_secs.max(0.0),
            time_since_last_damage: 0.0,
        }
    }

    pub fn max_hp(&self) -> f32 {
        self.max_hp
    }

    pub fn current_hp(&self) -> f32 {
        self.current_hp
    }

    pub fn regen_rate(&self) -> f32 {
        self.regen_rate
    }

    pub fn recharge_delay_secs(&self) -> f32 {
        self.recharge_delay_secs
    }

    pub fn time_since_last_damage(&self) -> f32 {
        self.time_since_last_damage
    }

    pub fn is_broken(&self) -> bool {
        self.current_hp <= 0.0
    }

    /// 0.0..=1.0 (зона с нулевым max считается пустой)
    pub fn health_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            self.current_hp / self.max_hp
        } else {
            0.0
        }
    }

    /// Снимает HP и сбрасывает delay clock. Возвращает реально снятое HP.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = amount.max(0.0);
        let before = self.current_hp;

        self.current_hp = (self.current_hp - amount).max(0.0);
        self.time_since_last_damage = 0.0;

        before - self.current_hp
    }

    /// Тик регенерации (`dt` — fixed timestep хоста)
    pub fn update(&mut self, dt: f32) {
        if self.is_broken() {
            self.time_since_last_damage += dt;
            if self.time_since_last_damage < self.recharge_delay_secs {
                return;
            }
        } else {
            self.time_since_last_damage = 0.0;
        }

        self.current_hp = (self.current_hp + self.regen_rate * dt).min(self.max_hp);
    }

    /// Новые параметры с сохранением доли HP (сломанная зона остаётся на 0)
    pub fn set_new_parameters(&mut self, max_hp: f32, regen_rate: f32, recharge_delay_secs: f32) {
        let max_hp = max_hp.max(0.0);

        self.current_hp = if self.current_hp > 0.0 && self.max_hp > 0.0 {
            (self.current_hp / self.max_hp * max_hp).min(max_hp)
        } else {
            0.0
        };
        self.max_hp = max_hp;
        self.regen_rate = regen_rate.max(0.0);
        self.recharge_delay_secs = recharge_delay_secs.max(0.0);
    }
}
