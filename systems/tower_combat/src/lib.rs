#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use plateau_defence_core::{Command, StructureView, TowerTarget};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    ///
    /// Targets naming a wall or a structure that no longer exists are skipped.
    pub fn handle(
        &mut self,
        structures: &StructureView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let ready = structures
                .get(target.tower)
                .and_then(|snapshot| snapshot.tower)
                .is_some_and(|stats| stats.is_ready());
            if ready {
                self.scratch.push(Command::FireProjectile {
                    tower: target.tower,
                    target: target.monster,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use plateau_defence_core::{
        GridCoord, MonsterId, StructureId, StructureKind, StructureSnapshot, TowerStats,
    };

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let structures = StructureView::from_snapshots(vec![
            tower(2, 0.0),
            tower(5, -0.01),
            tower(3, 0.25),
        ]);
        let targets = vec![target(2, 4), target(3, 9), target(5, 1)];
        let mut out = Vec::new();

        system.handle(&structures, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireProjectile {
                    tower: StructureId::new(2),
                    target: MonsterId::new(4),
                },
                Command::FireProjectile {
                    tower: StructureId::new(5),
                    target: MonsterId::new(1),
                },
            ],
        );
    }

    #[test]
    fn walls_and_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let mut wall = tower(8, 0.0);
        wall.kind = StructureKind::Wall;
        wall.tower = None;
        let structures = StructureView::from_snapshots(vec![wall]);
        let targets = vec![target(8, 2), target(42, 3)];
        let mut out = Vec::new();

        system.handle(&structures, &targets, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn existing_commands_are_preserved() {
        let mut system = TowerCombat::new();
        let structures = StructureView::from_snapshots(vec![tower(1, 0.0)]);
        let mut out = vec![Command::SpawnMonster];

        system.handle(&structures, &[target(1, 6)], &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Command::SpawnMonster);
    }

    fn tower(id: u32, cooldown: f32) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind: StructureKind::Tower,
            tile: GridCoord::new(0, 0),
            position: Vec3::ZERO,
            anchor: Vec3::Y * 7.5,
            hit_points: 14.0,
            max_hit_points: 14.0,
            radius: 8.4,
            tower: Some(TowerStats {
                range: 30.0,
                damage: 5.0,
                fire_interval: 0.6,
                cooldown,
                projectile_speed: 42.0,
                level: 1,
            }),
        }
    }

    fn target(tower: u32, monster: u32) -> TowerTarget {
        TowerTarget {
            tower: StructureId::new(tower),
            monster: MonsterId::new(monster),
            distance: 0.0,
        }
    }
}
