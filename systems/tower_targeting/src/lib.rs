#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use glam::Vec3;
use plateau_defence_core::{MonsterId, MonsterView, StructureId, StructureView, TowerTarget};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    monster_workspace: Vec<MonsterCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Each tower picks the monster closest to its anchor within range; equal
    /// distances resolve to the lower monster identifier. The output buffer is
    /// cleared before populating it with the latest assignments.
    pub fn handle(
        &mut self,
        structures: &StructureView,
        monsters: &MonsterView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if structures.towers().next().is_none() || monsters.is_empty() {
            return;
        }

        self.prepare_tower_workspace(structures);
        self.prepare_monster_workspace(monsters);

        for tower in &self.tower_workspace {
            let max_distance_sq = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.monster_workspace {
                let distance_sq = tower.anchor.distance_squared(candidate.position);
                if distance_sq > max_distance_sq {
                    continue;
                }

                let current = BestCandidate {
                    distance_sq,
                    monster: candidate.id,
                };
                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    monster: best_candidate.monster,
                    distance: best_candidate.distance_sq.sqrt(),
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, structures: &StructureView) {
        self.tower_workspace.clear();
        self.tower_workspace
            .extend(structures.towers().filter_map(|(snapshot, stats)| {
                (stats.range > 0.0).then_some(TowerWorkspace {
                    id: snapshot.id,
                    anchor: snapshot.anchor,
                    range: stats.range,
                })
            }));
    }

    fn prepare_monster_workspace(&mut self, monsters: &MonsterView) {
        self.monster_workspace.clear();
        self.monster_workspace
            .extend(monsters.iter().map(|snapshot| MonsterCandidate {
                id: snapshot.id,
                position: snapshot.position,
            }));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: StructureId,
    anchor: Vec3,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct MonsterCandidate {
    id: MonsterId,
    position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_sq: f32,
    monster: MonsterId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.monster < other.monster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plateau_defence_core::{
        GridCoord, MonsterSnapshot, StructureKind, StructureSnapshot, TowerStats,
    };

    fn tower(id: u32, anchor: Vec3) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind: StructureKind::Tower,
            tile: GridCoord::new(0, 0),
            position: anchor - Vec3::Y * 7.5,
            anchor,
            hit_points: 14.0,
            max_hit_points: 14.0,
            radius: 8.4,
            tower: Some(TowerStats {
                range: 30.0,
                damage: 5.0,
                fire_interval: 0.6,
                cooldown: 0.0,
                projectile_speed: 42.0,
                level: 1,
            }),
        }
    }

    fn wall(id: u32, position: Vec3) -> StructureSnapshot {
        StructureSnapshot {
            id: StructureId::new(id),
            kind: StructureKind::Wall,
            tile: GridCoord::new(0, 0),
            position,
            anchor: position,
            hit_points: 10.0,
            max_hit_points: 10.0,
            radius: 7.2,
            tower: None,
        }
    }

    fn monster(id: u32, position: Vec3) -> MonsterSnapshot {
        MonsterSnapshot {
            id: MonsterId::new(id),
            position,
            waypoint: position,
            path_index: 0,
            health: 5.0,
            max_health: 5.0,
            speed: 6.4,
            attack: 1.0,
            radius: 2.4,
        }
    }

    #[test]
    fn targets_nearest_monster_within_range() {
        let mut system = TowerTargeting::new();
        let structures = StructureView::from_snapshots(vec![tower(1, Vec3::ZERO)]);
        let monsters = MonsterView::from_snapshots(vec![
            monster(2, Vec3::new(20.0, 0.0, 0.0)),
            monster(3, Vec3::new(0.0, 0.0, 10.0)),
        ]);

        let mut out = Vec::new();
        system.handle(&structures, &monsters, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: StructureId::new(1),
                monster: MonsterId::new(3),
                distance: 10.0,
            }]
        );
    }

    #[test]
    fn range_is_measured_in_three_dimensions_and_inclusive() {
        let mut system = TowerTargeting::new();
        let structures = StructureView::from_snapshots(vec![tower(1, Vec3::ZERO)]);
        let at_edge = MonsterView::from_snapshots(vec![monster(2, Vec3::new(0.0, 30.0, 0.0))]);
        let beyond = MonsterView::from_snapshots(vec![monster(2, Vec3::new(18.0, 25.0, 0.0))]);

        let mut out = Vec::new();
        system.handle(&structures, &at_edge, &mut out);
        assert_eq!(out.len(), 1);

        system.handle(&structures, &beyond, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn smaller_monster_id_is_preferred_when_distances_match() {
        let mut system = TowerTargeting::new();
        let structures = StructureView::from_snapshots(vec![tower(1, Vec3::ZERO)]);
        let monsters = MonsterView::from_snapshots(vec![
            monster(20, Vec3::new(5.0, 0.0, 0.0)),
            monster(10, Vec3::new(-5.0, 0.0, 0.0)),
        ]);

        let mut out = Vec::new();
        system.handle(&structures, &monsters, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].monster, MonsterId::new(10));
    }

    #[test]
    fn walls_never_target() {
        let mut system = TowerTargeting::new();
        let structures = StructureView::from_snapshots(vec![wall(1, Vec3::ZERO)]);
        let monsters = MonsterView::from_snapshots(vec![monster(2, Vec3::new(1.0, 0.0, 0.0))]);

        let mut out = vec![TowerTarget {
            tower: StructureId::new(99),
            monster: MonsterId::new(99),
            distance: 0.0,
        }];
        system.handle(&structures, &monsters, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn every_tower_gets_its_own_assignment() {
        let mut system = TowerTargeting::new();
        let structures = StructureView::from_snapshots(vec![
            tower(4, Vec3::new(100.0, 0.0, 0.0)),
            tower(1, Vec3::ZERO),
            tower(7, Vec3::new(-200.0, 0.0, 0.0)),
        ]);
        let monsters = MonsterView::from_snapshots(vec![
            monster(1, Vec3::new(2.0, 0.0, 0.0)),
            monster(2, Vec3::new(95.0, 0.0, 0.0)),
        ]);

        let mut out = Vec::new();
        system.handle(&structures, &monsters, &mut out);

        let pairs: Vec<(u32, u32)> = out
            .iter()
            .map(|target| (target.tower.get(), target.monster.get()))
            .collect();
        assert_eq!(pairs, vec![(1, 1), (4, 2)]);
    }
}
