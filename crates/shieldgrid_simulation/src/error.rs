//! Ошибки shield-подсистемы.
//!
//! Библиотечный код возвращает `Result` и пробрасывает через `?`.
//! ECS системы логируют ошибку и продолжают тик (никаких panic в FixedUpdate).

use bevy::prelude::Entity;
use thiserror::Error;

/// Top-level error для shieldgrid.
#[derive(Debug, Error)]
pub enum ShieldError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Ошибки генерации geodesic mesh.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    /// Полигон дуала получил меньше 3 углов (невозможно для валидного икосаэдра)
    #[error("degenerate dual face around vertex {vertex}: {corners} corners")]
    DegenerateFace { vertex: usize, corners: usize },

    #[error("subdivision level {requested} exceeds maximum {max}")]
    TooManySubdivisions { requested: u32, max: u32 },
}

/// Ошибки registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("cannot register a shield for the placeholder entity")]
    PlaceholderEntity,

    #[error("entity {0:?} has no registered shield")]
    NotRegistered(Entity),
}

/// Ошибки конфигурации (tuning table).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse shield tuning: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tuning value {field} = {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("min_range {min} is greater than max_range {max}")]
    InvertedRange { min: f32, max: f32 },
}
