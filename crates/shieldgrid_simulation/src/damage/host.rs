//! Entity collaborator для router'а.
//!
//! Router не знает, как устроен мир хоста: через [`ShieldHost`] он спрашивает
//! владельца щита, world transform и точку попадания. ECS реализация —
//! [`EcsShieldHost`] поверх `Transform` (world space, иерархией владеет хост),
//! [`StructureBlock`] и [`CharacterBody`].

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Блок структуры: урон по блоку перехватывает щит структуры
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct StructureBlock {
    pub structure: Entity,
}

/// Персонаж: центр щита смещён (`ShieldTuning::character_center_offset`),
/// точка попадания — центр bounding box.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CharacterBody {
    /// Центр bounding box в local space
    pub bounds_center: Vec3,
}

impl Default for CharacterBody {
    fn default() -> Self {
        Self {
            bounds_center: Vec3::new(0.0, 0.9, 0.0),
        }
    }
}

pub trait ShieldHost {
    /// Entity, которая может нести щит: блок → структура, остальное → сама цель.
    /// None — цель не существует (уже закрыта).
    fn shield_bearer(&self, target: Entity) -> Option<Entity>;

    /// World transform entity (None — не существует)
    fn world_transform(&self, entity: Entity) -> Option<Transform>;

    fn is_character(&self, entity: Entity) -> bool;

    /// Приблизительная точка попадания со стороны цели:
    /// центр блока или центр bounding box персонажа.
    fn hit_position(&self, target: Entity) -> Option<Vec3>;
}

#[derive(SystemParam)]
pub struct EcsShieldHost<'w, 's> {
    transforms: Query<'w, 's, &'static Transform>,
    blocks: Query<'w, 's, &'static StructureBlock>,
    characters: Query<'w, 's, &'static CharacterBody>,
}

impl ShieldHost for EcsShieldHost<'_, '_> {
    fn shield_bearer(&self, target: Entity) -> Option<Entity> {
        if let Ok(block) = self.blocks.get(target) {
            return self.transforms.contains(block.structure).then_some(block.structure);
        }
        self.transforms.contains(target).then_some(target)
    }

    fn world_transform(&self, entity: Entity) -> Option<Transform> {
        self.transforms.get(entity).ok().copied()
    }

    fn is_character(&self, entity: Entity) -> bool {
        self.characters.contains(entity)
    }

    fn hit_position(&self, target: Entity) -> Option<Vec3> {
        let transform = self.transforms.get(target).ok()?;
        match self.characters.get(target) {
            Ok(body) => Some(transform.transform_point(body.bounds_center)),
            Err(_) => Some(transform.translation),
        }
    }
}
