//! Authoritative tower and wall state management utilities.

use std::collections::BTreeMap;

use glam::Vec3;
use plateau_defence_core::{
    GridCoord, Rules, StructureId, StructureKind, StructureSnapshot, TowerStats,
};

/// Combat state carried by towers only.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TowerState {
    pub(crate) range: f32,
    pub(crate) damage: f32,
    pub(crate) fire_interval: f32,
    pub(crate) cooldown: f32,
    pub(crate) projectile_speed: f32,
    pub(crate) level: u8,
}

impl TowerState {
    fn from_rules(rules: &Rules) -> Self {
        Self {
            range: rules.tower.range,
            damage: rules.tower.damage,
            fire_interval: rules.tower.fire_interval,
            cooldown: 0.0,
            projectile_speed: rules.tower.projectile_speed,
            level: 1,
        }
    }

    /// Counts the cooldown down while it is positive.
    pub(crate) fn cool(&mut self, seconds: f32) {
        if self.cooldown > 0.0 {
            self.cooldown -= seconds;
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Snapshot of a structure stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct StructureState {
    pub(crate) id: StructureId,
    pub(crate) kind: StructureKind,
    pub(crate) tile: GridCoord,
    pub(crate) position: Vec3,
    pub(crate) anchor: Vec3,
    pub(crate) hit_points: f32,
    pub(crate) max_hit_points: f32,
    pub(crate) radius: f32,
    pub(crate) tower: Option<TowerState>,
}

impl StructureState {
    /// Removes hit points, clamping at zero. Returns `true` once depleted.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        self.hit_points = (self.hit_points - amount.max(0.0)).max(0.0);
        self.hit_points <= 0.0
    }

    pub(crate) fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            position: self.position,
            anchor: self.anchor,
            hit_points: self.hit_points,
            max_hit_points: self.max_hit_points,
            radius: self.radius,
            tower: self.tower.map(|tower| TowerStats {
                range: tower.range,
                damage: tower.damage,
                fire_interval: tower.fire_interval,
                cooldown: tower.cooldown,
                projectile_speed: tower.projectile_speed,
                level: tower.level,
            }),
        }
    }
}

/// Registry that stores structures and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct StructureRegistry {
    entries: BTreeMap<StructureId, StructureState>,
    next_structure_id: StructureId,
}

impl StructureRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_structure_id: StructureId::new(0),
        }
    }

    /// Records a freshly built structure standing on the tile surface at `surface`.
    pub(crate) fn insert(
        &mut self,
        rules: &Rules,
        kind: StructureKind,
        tile: GridCoord,
        surface: Vec3,
    ) -> StructureId {
        let id = self.next_structure_id;
        self.next_structure_id = StructureId::new(id.get().saturating_add(1));

        let hit_points = rules.starting_hit_points(kind);
        let position = surface + Vec3::Y * rules.collider_lift(kind);
        let (anchor, tower) = match kind {
            StructureKind::Tower => (
                surface + Vec3::Y * rules.tower.anchor_lift,
                Some(TowerState::from_rules(rules)),
            ),
            StructureKind::Wall => (position, None),
        };
        let _ = self.entries.insert(
            id,
            StructureState {
                id,
                kind,
                tile,
                position,
                anchor,
                hit_points,
                max_hit_points: hit_points,
                radius: rules.collider_radius(kind),
                tower,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: StructureId) -> Option<&StructureState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: StructureId) -> Option<&mut StructureState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: StructureId) -> Option<StructureState> {
        self.entries.remove(&id)
    }

    pub(crate) fn at(&self, tile: GridCoord) -> Option<&StructureState> {
        self.entries.values().find(|entry| entry.tile == tile)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &StructureState> {
        self.entries.values()
    }

    pub(crate) fn towers_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries
            .values_mut()
            .filter_map(|entry| entry.tower.as_mut())
    }
}
