//! Shield tuning table + per-emitter settings.
//!
//! [`ShieldTuning`] — Bevy [`Resource`] с balancing константами. Дефолты заданы
//! в коде; TOML (`ShieldTuning::from_toml_str`) переопределяет только
//! присутствующие ключи верхнего уровня. Таблицы `[generic]` / `[modular]`
//! задаются целиком.
//!
//! [`ShieldSettings`] — тройка `(range, kind, active)`, которую хост передаёт
//! из своего persistence слоя. Значения вне диапазона молча клампятся.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geodesic::MAX_SUBDIVISIONS;

/// Вариант щита
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum ShieldKind {
    /// Один общий пул HP, позиция попадания игнорируется
    #[default]
    Generic,
    /// N независимых зон поверх geodesic dual mesh
    Modular,
}

/// Что происходит с уроном сверх ёмкости зоны/пула.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AbsorptionPolicy {
    /// Поглощённый хит обнуляется целиком, даже если щит не вытянул весь урон
    #[default]
    FullNegation,
    /// Остаток сверх ёмкости проходит к цели
    Spillover,
}

/// Balancing параметры одного варианта щита
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindTuning {
    /// Множитель к `hp_per_meter · range`
    pub hp_multiplier: f32,
    /// Доля max HP, восстанавливаемая за секунду
    pub regen_fraction: f32,
    /// Секунды после урона до начала регена сломанной зоны
    pub recharge_delay_secs: f32,
    /// Потребление (Вт) на метр радиуса, пока щит активен
    pub watts_per_meter: f32,
}

impl KindTuning {
    pub const GENERIC: Self = Self {
        hp_multiplier: 1.0,
        regen_fraction: 0.02,
        recharge_delay_secs: 15.0,
        watts_per_meter: 50.0,
    };

    pub const MODULAR: Self = Self {
        hp_multiplier: 0.25,
        regen_fraction: 0.02,
        recharge_delay_secs: 10.0,
        watts_per_meter: 80.0,
    };

    /// `names` — полные имена полей для ошибки (`generic.hp_multiplier`, ...)
    fn validate(&self, names: [&'static str; 4]) -> Result<(), ConfigError> {
        let values = [
            self.hp_multiplier,
            self.regen_fraction,
            self.recharge_delay_secs,
            self.watts_per_meter,
        ];
        for (field, value) in names.into_iter().zip(values) {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }
}

/// Runtime-tunable shield balancing.
///
/// Инвариант (после `validate`): `0 < min_range ≤ max_range`, все значения конечны.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldTuning {
    pub hp_per_meter: f32,
    pub min_range: f32,
    pub max_range: f32,
    /// Уровень subdivision для Modular щитов (1 → 42 зоны)
    pub modular_subdivisions: u32,
    /// Локальный offset центра щита для персонажей (от ног к торсу)
    pub character_center_offset: [f32; 3],
    pub absorption: AbsorptionPolicy,
    pub generic: KindTuning,
    pub modular: KindTuning,
}

impl Default for ShieldTuning {
    fn default() -> Self {
        Self {
            hp_per_meter: 60.0,
            min_range: 2.0,
            max_range: 250.0,
            modular_subdivisions: 1,
            character_center_offset: [0.0, 1.0, 0.0],
            absorption: AbsorptionPolicy::FullNegation,
            generic: KindTuning::GENERIC,
            modular: KindTuning::MODULAR,
        }
    }
}

impl ShieldTuning {
    /// Парсит TOML поверх дефолтов и валидирует результат
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let tuning: Self = toml::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hp_per_meter.is_finite() || self.hp_per_meter <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "hp_per_meter",
                value: self.hp_per_meter,
            });
        }
        if !self.min_range.is_finite() || self.min_range <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_range",
                value: self.min_range,
            });
        }
        if !self.max_range.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "max_range",
                value: self.max_range,
            });
        }
        if self.min_range > self.max_range {
            return Err(ConfigError::InvertedRange {
                min: self.min_range,
                max: self.max_range,
            });
        }
        if self.modular_subdivisions > MAX_SUBDIVISIONS {
            return Err(ConfigError::InvalidValue {
                field: "modular_subdivisions",
                value: self.modular_subdivisions as f32,
            });
        }
        if let Some(&bad) = self.character_center_offset.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "character_center_offset",
                value: bad,
            });
        }
        self.generic.validate([
            "generic.hp_multiplier",
            "generic.regen_fraction",
            "generic.recharge_delay_secs",
            "generic.watts_per_meter",
        ])?;
        self.modular.validate([
            "modular.hp_multiplier",
            "modular.regen_fraction",
            "modular.recharge_delay_secs",
            "modular.watts_per_meter",
        ])
    }

    pub fn kind(&self, kind: ShieldKind) -> &KindTuning {
        match kind {
            ShieldKind::Generic => &self.generic,
            ShieldKind::Modular => &self.modular,
        }
    }

    pub fn character_offset(&self) -> Vec3 {
        Vec3::from_array(self.character_center_offset)
    }

    /// Clamp радиуса в `[min_range, max_range]`; NaN → `min_range`
    pub fn clamp_range(&self, range: f32) -> f32 {
        if range.is_nan() {
            return self.min_range;
        }
        range.max(self.min_range).min(self.max_range)
    }
}

/// Настройки одного shield emitter'а (то, что хост хранит у себя)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
pub struct ShieldSettings {
    pub range: f32,
    pub kind: ShieldKind,
    pub active: bool,
}

impl Default for ShieldSettings {
    fn default() -> Self {
        Self {
            range: 10.0,
            kind: ShieldKind::Generic,
            active: true,
        }
    }
}

impl ShieldSettings {
    pub fn new(range: f32, kind: ShieldKind, active: bool) -> Self {
        Self { range, kind, active }
    }

    pub fn clamped(self, tuning: &ShieldTuning) -> Self {
        Self {
            range: tuning.clamp_range(self.range),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(ShieldTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let tuning = ShieldTuning::from_toml_str("hp_per_meter = 100.0\nmax_range = 80.0\n")
            .expect("valid toml");

        assert_eq!(tuning.hp_per_meter, 100.0);
        assert_eq!(tuning.max_range, 80.0);
        assert_eq!(tuning.min_range, ShieldTuning::default().min_range);
        assert_eq!(tuning.generic, KindTuning::GENERIC);
    }

    #[test]
    fn test_toml_kind_table_and_policy() {
        let source = r#"
            absorption = "Spillover"

            [modular]
            hp_multiplier = 2.0
            regen_fraction = 0.05
            recharge_delay_secs = 4.0
            watts_per_meter = 10.0
        "#;
        let tuning = ShieldTuning::from_toml_str(source).expect("valid toml");

        assert_eq!(tuning.absorption, AbsorptionPolicy::Spillover);
        assert_eq!(tuning.modular.hp_multiplier, 2.0);
        assert_eq!(tuning.kind(ShieldKind::Modular).recharge_delay_secs, 4.0);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = ShieldTuning::from_toml_str("min_range = 50.0\nmax_range = 10.0\n");
        assert!(matches!(result, Err(ConfigError::InvertedRange { .. })));
    }

    #[test]
    fn test_negative_kind_value_rejected() {
        let mut tuning = ShieldTuning::default();
        tuning.modular.regen_fraction = -1.0;

        match tuning.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "modular.regen_fraction")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_settings_clamped_silently() {
        let tuning = ShieldTuning::default();

        let too_big = ShieldSettings::new(10_000.0, ShieldKind::Modular, true).clamped(&tuning);
        assert_eq!(too_big.range, tuning.max_range);
        assert_eq!(too_big.kind, ShieldKind::Modular);

        let too_small = ShieldSettings::new(-3.0, ShieldKind::Generic, false).clamped(&tuning);
        assert_eq!(too_small.range, tuning.min_range);
        assert!(!too_small.active);

        let nan = ShieldSettings::new(f32::NAN, ShieldKind::Generic, true).clamped(&tuning);
        assert_eq!(nan.range, tuning.min_range);
    }
}
