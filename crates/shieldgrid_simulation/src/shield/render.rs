//! Render-data boundary.
//!
//! Presentation слой (не входит в crate) читает снимок состояния щита:
//! зоны с углами в local space (уже умноженными на range) и долей HP.
//! Сам crate ничего не рисует.

use bevy::prelude::*;

use super::energy_shield::{Shield, ShieldBody};
use crate::config::ShieldKind;

/// Снимок одной зоны для визуализации
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneVisual {
    /// Центр зоны (local space, масштаб range)
    pub local_center: Vec3,
    /// Углы полигона в циклическом порядке. Пусто для Generic.
    pub corners: Vec<Vec3>,
    pub health_fraction: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShieldRenderData {
    pub kind: ShieldKind,
    pub range: f32,
    pub is_active: bool,
    pub zones: Vec<ZoneVisual>,
    /// Отрезки wireframe (local space)
    pub wireframe: Vec<(Vec3, Vec3)>,
}

impl Shield {
    pub fn render_data(&self) -> ShieldRenderData {
        let range = self.range();

        let (zones, wireframe) = match self.body() {
            ShieldBody::Generic(zone) => (
                vec![ZoneVisual {
                    local_center: Vec3::ZERO,
                    corners: Vec::new(),
                    health_fraction: zone.health_fraction(),
                }],
                Vec::new(),
            ),
            ShieldBody::Modular { mesh, zones } => {
                let visuals = mesh
                    .faces
                    .iter()
                    .zip(zones)
                    .map(|(face, zone)| ZoneVisual {
                        local_center: face.centroid * range,
                        corners: face
                            .vertices
                            .iter()
                            .map(|&v| mesh.vertices[v as usize] * range)
                            .collect(),
                        health_fraction: zone.health_fraction(),
                    })
                    .collect();

                let lines = mesh
                    .edges
                    .iter()
                    .map(|edge| {
                        (
                            mesh.vertices[edge.0 as usize] * range,
                            mesh.vertices[edge.1 as usize] * range,
                        )
                    })
                    .collect();

                (visuals, lines)
            }
        };

        ShieldRenderData {
            kind: self.kind(),
            range,
            is_active: self.is_active(),
            zones,
            wireframe,
        }
    }
}
