//! Lazily-populated mesh cache (один mesh на subdivision level)

use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;

use super::{generate, GeodesicMesh};
use crate::error::MeshError;

/// Владеемый сессией кэш geodesic mesh'ей.
///
/// Заполняется синхронно на первом запросе уровня, дальше только читается.
/// Живёт столько же, сколько App (Resource), никакого process-wide state.
#[derive(Resource, Debug, Default)]
pub struct MeshCache {
    meshes: HashMap<u32, Arc<GeodesicMesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh уровня `subdivisions`, генерируется при первом обращении
    pub fn get_or_generate(&mut self, subdivisions: u32) -> Result<Arc<GeodesicMesh>, MeshError> {
        if let Some(mesh) = self.meshes.get(&subdivisions) {
            return Ok(Arc::clone(mesh));
        }

        let mesh = Arc::new(generate(subdivisions)?);
        crate::logger::log(&format!(
            "🔷 Geodesic mesh generated: level={}, faces={}, edges={}",
            subdivisions,
            mesh.faces.len(),
            mesh.edges.len()
        ));
        self.meshes.insert(subdivisions, Arc::clone(&mesh));
        Ok(mesh)
    }

    pub fn get(&self, subdivisions: u32) -> Option<Arc<GeodesicMesh>> {
        self.meshes.get(&subdivisions).cloned()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
