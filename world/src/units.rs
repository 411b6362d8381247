//! Moving entities: monsters, projectiles and the hero.

use glam::{Vec2, Vec3};
use plateau_defence_core::{
    GridCoord, HeroRules, HeroSnapshot, MonsterId, MonsterSnapshot, ProjectileId,
    ProjectileSnapshot,
};

#[derive(Clone, Debug)]
pub(crate) struct Monster {
    pub(crate) id: MonsterId,
    pub(crate) position: Vec3,
    pub(crate) waypoint: Vec3,
    pub(crate) path_index: usize,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) speed: f32,
    pub(crate) attack: f32,
    pub(crate) radius: f32,
}

impl Monster {
    pub(crate) fn snapshot(&self) -> MonsterSnapshot {
        MonsterSnapshot {
            id: self.id,
            position: self.position,
            waypoint: self.waypoint,
            path_index: self.path_index,
            health: self.health,
            max_health: self.max_health,
            speed: self.speed,
            attack: self.attack,
            radius: self.radius,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) position: Vec3,
    pub(crate) target: MonsterId,
    pub(crate) damage: f32,
    pub(crate) speed: f32,
}

impl Projectile {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            damage: self.damage,
            speed: self.speed,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Hero {
    pub(crate) position: Vec3,
    pub(crate) tile: GridCoord,
    pub(crate) target: Option<GridCoord>,
    pub(crate) joystick: Vec2,
    speed: f32,
    radius: f32,
}

impl Hero {
    pub(crate) fn new(rules: &HeroRules, tile: GridCoord, position: Vec3) -> Self {
        Self {
            position,
            tile,
            target: None,
            joystick: Vec2::ZERO,
            speed: rules.speed,
            radius: rules.radius,
        }
    }

    /// Stores stick input, clamped to unit length. Any deflection cancels the
    /// click-to-move target.
    pub(crate) fn steer(&mut self, vector: Vec2) {
        let vector = if vector.is_finite() {
            vector.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
        if vector != Vec2::ZERO {
            self.target = None;
        }
        self.joystick = vector;
    }

    pub(crate) fn snapshot(&self) -> HeroSnapshot {
        HeroSnapshot {
            position: self.position,
            tile: self.tile,
            target: self.target,
            joystick: self.joystick,
            speed: self.speed,
            radius: self.radius,
        }
    }
}

/// Hands out sequential identifiers for one entity arena.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Sequence(u32);

impl Sequence {
    pub(crate) fn next(&mut self) -> u32 {
        let value = self.0;
        self.0 = self.0.saturating_add(1);
        value
    }
}
