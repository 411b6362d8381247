#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Plateau Defence.
//!
//! The world owns terrain, structures, monsters, projectiles, the hero and the
//! economy ledger. It mutates only through [`apply`] and exposes read-only
//! snapshots through [`query`].

mod economy;
mod structures;
mod terrain;
mod units;

use std::collections::BTreeMap;

use glam::Vec3;
use log::{debug, info, trace};
use plateau_defence_core::{
    Command, DemolishError, Event, GridCoord, MonsterId, MoveError, PlacementError, ProjectileId,
    Rules, StructureId, StructureKind, UpgradeError, WELCOME_BANNER,
};

use economy::Ledger;
use structures::StructureRegistry;
use terrain::Terrain;
use units::{Hero, Monster, Projectile, Sequence};

/// Represents the authoritative Plateau Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    rules: Rules,
    terrain: Terrain,
    structures: StructureRegistry,
    monsters: BTreeMap<MonsterId, Monster>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    hero: Hero,
    ledger: Ledger,
    build_mode: Option<StructureKind>,
    monster_ids: Sequence,
    projectile_ids: Sequence,
}

impl World {
    /// Creates a new world laid out and stocked according to `rules`.
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        let terrain = Terrain::build(&rules.terrain);
        let center = rules.terrain.plateau_center();
        let start = GridCoord::new(center, center + rules.hero.start_row_offset);
        let hero = Hero::new(&rules.hero, start, terrain.grid_to_world(start, 0.0));
        Self {
            banner: WELCOME_BANNER,
            structures: StructureRegistry::new(),
            monsters: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            ledger: Ledger::new(&rules.economy),
            build_mode: None,
            monster_ids: Sequence::default(),
            projectile_ids: Sequence::default(),
            hero,
            terrain,
            rules,
        }
    }

    fn waypoint(&self, index: usize) -> Option<Vec3> {
        self.terrain
            .path()
            .get(index)
            .map(|tile| self.terrain.grid_to_world(*tile, self.rules.monster.waypoint_lift))
    }

    fn place_structure(
        &mut self,
        kind: StructureKind,
        tile: GridCoord,
    ) -> Result<StructureId, PlacementError> {
        let Some(tile_kind) = self.terrain.kind(tile) else {
            return Err(PlacementError::OutOfBounds);
        };
        if tile == self.terrain.home() {
            return Err(PlacementError::HomeTile);
        }
        if self.terrain.occupant(tile).is_some() {
            return Err(PlacementError::Occupied);
        }
        if !tile_kind.is_buildable() || !self.terrain.is_walkable(tile) {
            return Err(PlacementError::Unbuildable);
        }

        self.ledger.spend(self.rules.build_cost(kind))?;
        let surface = self.terrain.grid_to_world(tile, 0.0);
        let id = self.structures.insert(&self.rules, kind, tile, surface);
        self.terrain.set_occupied(tile, Some(kind));
        debug!(
            "placed {kind:?} {} at ({}, {}); gold {}",
            id.get(),
            tile.x(),
            tile.y(),
            self.ledger.gold()
        );
        Ok(id)
    }

    fn upgrade_tower(&mut self, id: StructureId) -> Result<u8, UpgradeError> {
        let upgrade = &self.rules.tower.upgrade;
        let Some(entry) = self.structures.get_mut(id) else {
            return Err(UpgradeError::MissingStructure);
        };
        let Some(tower) = entry.tower.as_mut() else {
            return Err(UpgradeError::NotATower);
        };
        if tower.level >= upgrade.max_level {
            return Err(UpgradeError::MaxLevel);
        }

        self.ledger.spend(upgrade.cost)?;
        tower.level = tower.level.saturating_add(1);
        tower.damage = upgrade.damage;
        tower.fire_interval = upgrade.fire_interval;
        let level = tower.level;
        entry.max_hit_points = upgrade.max_hit_points;
        entry.hit_points = (entry.hit_points + upgrade.heal).min(entry.max_hit_points);
        debug!("upgraded tower {} to level {level}", id.get());
        Ok(level)
    }

    fn demolish(
        &mut self,
        id: StructureId,
    ) -> Result<(StructureKind, GridCoord, u32), DemolishError> {
        let removed = self
            .structures
            .remove(id)
            .ok_or(DemolishError::MissingStructure)?;
        self.terrain.set_occupied(removed.tile, None);
        let refund = self.rules.demolish_refund(removed.kind);
        self.ledger.credit(refund);
        debug!(
            "demolished {:?} {} for {refund} gold",
            removed.kind,
            id.get()
        );
        Ok((removed.kind, removed.tile, refund))
    }

    fn set_hero_target(&mut self, tile: GridCoord) -> Result<(), MoveError> {
        if self.terrain.kind(tile).is_none() {
            return Err(MoveError::OutOfBounds);
        }
        if self.terrain.occupant(tile).is_some() {
            return Err(MoveError::Occupied);
        }
        if !self.terrain.is_walkable(tile) {
            return Err(MoveError::Unwalkable);
        }
        self.hero.target = Some(tile);
        Ok(())
    }

    fn destroy_structure(&mut self, id: StructureId, out_events: &mut Vec<Event>) {
        let Some(removed) = self.structures.remove(id) else {
            return;
        };
        self.terrain.set_occupied(removed.tile, None);
        debug!("{:?} {} destroyed by monsters", removed.kind, id.get());
        out_events.push(Event::StructureDestroyed {
            structure: id,
            kind: removed.kind,
            tile: removed.tile,
        });
    }

    fn resolve_impact(&mut self, id: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(projectile) = self.projectiles.remove(&id) else {
            return;
        };
        let Some(monster) = self.monsters.get_mut(&projectile.target) else {
            out_events.push(Event::ProjectileDiscarded { projectile: id });
            return;
        };

        monster.health -= projectile.damage;
        if monster.health > 0.0 {
            out_events.push(Event::MonsterHit {
                monster: projectile.target,
                health: monster.health,
            });
            return;
        }

        let _ = self.monsters.remove(&projectile.target);
        let reward = self.rules.economy.kill_reward;
        self.ledger.credit(reward);
        debug!("monster {} killed", projectile.target.get());
        out_events.push(Event::MonsterKilled {
            monster: projectile.target,
            reward,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the home has fallen, simulation commands are ignored and player
/// requests are answered with a `GameOver` rejection.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.ledger.is_over() {
        reject_after_game_over(command, out_events);
        return;
    }

    match command {
        Command::Tick { dt } => {
            let seconds = dt.as_secs_f32();
            for tower in world.structures.towers_mut() {
                tower.cool(seconds);
            }
            trace!(
                "tick {:?}: {} monsters, {} projectiles",
                dt,
                world.monsters.len(),
                world.projectiles.len()
            );
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::BeginWave => {
            let wave = world.ledger.wave();
            info!("wave {wave} begins");
            out_events.push(Event::WaveStarted { wave });
        }
        Command::AdvanceWave => {
            let wave = world.ledger.advance_wave(world.rules.wave.wave_bonus);
            info!("wave {wave} begins; gold {}", world.ledger.gold());
            out_events.push(Event::WaveStarted { wave });
        }
        Command::SpawnMonster => {
            let Some(position) = world.terrain.spawn_position(&world.rules.monster) else {
                return;
            };
            let Some(waypoint) = world.waypoint(0) else {
                return;
            };
            let id = MonsterId::new(world.monster_ids.next());
            let rules = &world.rules.monster;
            let monster = Monster {
                id,
                position,
                waypoint,
                path_index: 0,
                health: rules.health,
                max_health: rules.health,
                speed: rules.speed_for_wave(world.ledger.wave()),
                attack: rules.attack,
                radius: rules.radius,
            };
            let _ = world.monsters.insert(id, monster);
            out_events.push(Event::MonsterSpawned {
                monster: id,
                position,
            });
        }
        Command::MoveMonster {
            monster,
            position,
            path_index,
        } => {
            let last = world.terrain.path().len().saturating_sub(1);
            let Some(current) = world.monsters.get(&monster).map(|entry| entry.path_index) else {
                return;
            };
            let path_index = path_index.max(current).min(last);
            let waypoint = world.waypoint(path_index);
            if let Some(entry) = world.monsters.get_mut(&monster) {
                entry.position = position;
                entry.path_index = path_index;
                if let Some(waypoint) = waypoint {
                    entry.waypoint = waypoint;
                }
            }
        }
        Command::LeakMonster { monster } => {
            if world.monsters.remove(&monster).is_none() {
                return;
            }
            debug!("monster {} reached the home", monster.get());
            out_events.push(Event::MonsterLeaked { monster });
            let fallen = world.ledger.damage_base(world.rules.economy.leak_damage);
            out_events.push(Event::BaseDamaged {
                health: world.ledger.health(),
            });
            if fallen {
                let wave = world.ledger.wave();
                info!("the home has fallen during wave {wave}");
                out_events.push(Event::GameOver { wave });
            }
        }
        Command::BlockMonster {
            monster,
            structure,
            damage,
        } => {
            if !world.monsters.contains_key(&monster) {
                return;
            }
            let Some(entry) = world.structures.get_mut(structure) else {
                return;
            };
            if entry.take_damage(damage) {
                world.destroy_structure(structure, out_events);
            } else {
                out_events.push(Event::StructureDamaged {
                    structure,
                    hit_points: entry.hit_points,
                });
            }
        }
        Command::SelectBuildMode { kind } => {
            world.build_mode = if world.build_mode == Some(kind) {
                None
            } else {
                Some(kind)
            };
            out_events.push(Event::BuildModeChanged {
                mode: world.build_mode,
            });
        }
        Command::ClearBuildMode => {
            if world.build_mode.take().is_some() {
                out_events.push(Event::BuildModeChanged { mode: None });
            }
        }
        Command::PlaceStructure { kind, tile } => match world.place_structure(kind, tile) {
            Ok(structure) => out_events.push(Event::StructurePlaced {
                structure,
                kind,
                tile,
            }),
            Err(reason) => out_events.push(Event::PlacementRejected { kind, tile, reason }),
        },
        Command::UpgradeTower { structure } => match world.upgrade_tower(structure) {
            Ok(level) => out_events.push(Event::TowerUpgraded { structure, level }),
            Err(reason) => out_events.push(Event::UpgradeRejected { structure, reason }),
        },
        Command::DemolishStructure { structure } => match world.demolish(structure) {
            Ok((kind, tile, refund)) => out_events.push(Event::StructureDemolished {
                structure,
                kind,
                tile,
                refund,
            }),
            Err(reason) => out_events.push(Event::DemolitionRejected { structure, reason }),
        },
        Command::SetHeroTarget { tile } => match world.set_hero_target(tile) {
            Ok(()) => out_events.push(Event::HeroTargetSet { tile }),
            Err(reason) => out_events.push(Event::HeroMoveRejected { tile, reason }),
        },
        Command::SetJoystick { vector } => world.hero.steer(vector),
        Command::MoveHero { position, arrived } => {
            world.hero.position = position;
            if arrived {
                if let Some(tile) = world.hero.target.take() {
                    world.hero.tile = tile;
                    out_events.push(Event::HeroArrived { tile });
                }
            } else if let Some(tile) = world.terrain.world_to_grid(position) {
                world.hero.tile = tile;
            }
        }
        Command::BlockHero => {
            world.hero.target = None;
            out_events.push(Event::HeroBlocked);
        }
        Command::FireProjectile { tower, target } => {
            if !world.monsters.contains_key(&target) {
                return;
            }
            let muzzle_lift = world.rules.tower.muzzle_lift;
            let Some(entry) = world.structures.get_mut(tower) else {
                return;
            };
            let anchor = entry.anchor;
            let Some(stats) = entry.tower.as_mut() else {
                return;
            };
            if !stats.is_ready() {
                return;
            }
            stats.cooldown = stats.fire_interval;
            let (damage, speed) = (stats.damage, stats.projectile_speed);

            let id = ProjectileId::new(world.projectile_ids.next());
            let _ = world.projectiles.insert(
                id,
                Projectile {
                    id,
                    position: anchor + Vec3::Y * muzzle_lift,
                    target,
                    damage,
                    speed,
                },
            );
            out_events.push(Event::ProjectileFired {
                projectile: id,
                tower,
                target,
            });
        }
        Command::MoveProjectile {
            projectile,
            position,
        } => {
            if let Some(entry) = world.projectiles.get_mut(&projectile) {
                entry.position = position;
            }
        }
        Command::ImpactProjectile { projectile } => world.resolve_impact(projectile, out_events),
        Command::DiscardProjectile { projectile } => {
            if world.projectiles.remove(&projectile).is_some() {
                out_events.push(Event::ProjectileDiscarded { projectile });
            }
        }
    }
}

fn reject_after_game_over(command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceStructure { kind, tile } => out_events.push(Event::PlacementRejected {
            kind,
            tile,
            reason: PlacementError::GameOver,
        }),
        Command::UpgradeTower { structure } => out_events.push(Event::UpgradeRejected {
            structure,
            reason: UpgradeError::GameOver,
        }),
        Command::DemolishStructure { structure } => out_events.push(Event::DemolitionRejected {
            structure,
            reason: DemolishError::GameOver,
        }),
        Command::SetHeroTarget { tile } => out_events.push(Event::HeroMoveRejected {
            tile,
            reason: MoveError::GameOver,
        }),
        _ => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec3;
    use plateau_defence_core::{
        EconomySnapshot, GridCoord, HeroSnapshot, MonsterView, ProjectileView, Rules,
        StructureId, StructureInspection, StructureView, TerrainView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Ruleset the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Captures the terrain grid, including current occupancy.
    #[must_use]
    pub fn terrain_view(world: &World) -> TerrainView {
        world.terrain.view()
    }

    /// Reports whether the tile exists, permits walking and is unoccupied.
    #[must_use]
    pub fn is_walkable(world: &World, tile: GridCoord) -> bool {
        world.terrain.is_walkable(tile)
    }

    /// World position of the tile surface raised by `vertical_offset`.
    #[must_use]
    pub fn grid_to_world(world: &World, tile: GridCoord, vertical_offset: f32) -> Vec3 {
        world.terrain.grid_to_world(tile, vertical_offset)
    }

    /// Tile containing the world position, if it lies inside the grid.
    #[must_use]
    pub fn world_to_grid(world: &World, position: Vec3) -> Option<GridCoord> {
        world.terrain.world_to_grid(position)
    }

    /// World positions monsters walk through, in path order.
    #[must_use]
    pub fn path_waypoints(world: &World) -> Vec<Vec3> {
        (0..world.terrain.path().len())
            .filter_map(|index| world.waypoint(index))
            .collect()
    }

    /// Collider centre of the home structure.
    #[must_use]
    pub fn home_position(world: &World) -> Vec3 {
        world.terrain.grid_to_world(world.terrain.home(), 0.0)
    }

    /// Captures a read-only view of the live monsters.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(world.monsters.values().map(|m| m.snapshot()).collect())
    }

    /// Captures a read-only view of every tower and wall.
    #[must_use]
    pub fn structure_view(world: &World) -> StructureView {
        StructureView::from_snapshots(world.structures.iter().map(|s| s.snapshot()).collect())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(world.projectiles.values().map(|p| p.snapshot()).collect())
    }

    /// Captures the hero's state.
    #[must_use]
    pub fn hero(world: &World) -> HeroSnapshot {
        world.hero.snapshot()
    }

    /// Captures gold, home health, wave and build mode.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.ledger.snapshot(world.build_mode)
    }

    /// Structure standing on the tile, if any.
    #[must_use]
    pub fn structure_at(world: &World, tile: GridCoord) -> Option<StructureId> {
        world.structures.at(tile).map(|entry| entry.id)
    }

    /// Details for the inspection panel of a single structure.
    #[must_use]
    pub fn inspect(world: &World, id: StructureId) -> Option<StructureInspection> {
        let entry = world.structures.get(id)?;
        let upgrade = &world.rules.tower.upgrade;
        let upgrade_cost = entry
            .tower
            .filter(|tower| tower.level < upgrade.max_level)
            .map(|_| upgrade.cost);
        Some(StructureInspection {
            snapshot: entry.snapshot(),
            refund: world.rules.demolish_refund(entry.kind),
            upgrade_cost,
            upgrade_affordable: upgrade_cost.is_some_and(|cost| world.ledger.gold() >= cost),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;
    use plateau_defence_core::{InsufficientGold, PlayState, TileKind};

    use super::*;

    fn run(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    fn place(world: &mut World, kind: StructureKind, x: i32, y: i32) -> StructureId {
        match run(
            world,
            Command::PlaceStructure {
                kind,
                tile: GridCoord::new(x, y),
            },
        )
        .as_slice()
        {
            [Event::StructurePlaced { structure, .. }] => *structure,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn building_a_tower_debits_gold_and_occupies_tile() {
        let mut world = World::default();
        let tile = GridCoord::new(10, 10);
        let id = place(&mut world, StructureKind::Tower, 10, 10);

        assert_eq!(query::economy(&world).gold, 400);
        assert!(!query::is_walkable(&world, tile));
        let view = query::terrain_view(&world);
        assert_eq!(
            view.tile(tile).and_then(|snapshot| snapshot.occupied),
            Some(StructureKind::Tower)
        );
        let structures = query::structure_view(&world);
        assert_eq!(structures.len(), 1);
        assert_eq!(structures.get(id).map(|s| s.hit_points), Some(14.0));
    }

    #[test]
    fn placement_rejections_leave_state_untouched() {
        let mut world = World::default();
        let _ = place(&mut world, StructureKind::Wall, 9, 9);
        let cases = [
            (GridCoord::new(12, 3), PlacementError::Unbuildable),
            (GridCoord::new(12, 7), PlacementError::Unbuildable),
            (GridCoord::new(2, 2), PlacementError::Unbuildable),
            (GridCoord::new(12, 12), PlacementError::HomeTile),
            (GridCoord::new(9, 9), PlacementError::Occupied),
            (GridCoord::new(30, 0), PlacementError::OutOfBounds),
        ];
        for (tile, reason) in cases {
            let events = run(
                &mut world,
                Command::PlaceStructure {
                    kind: StructureKind::Tower,
                    tile,
                },
            );
            assert_eq!(
                events,
                vec![Event::PlacementRejected {
                    kind: StructureKind::Tower,
                    tile,
                    reason
                }]
            );
        }
        assert_eq!(query::economy(&world).gold, 450);
        assert_eq!(query::structure_view(&world).len(), 1);
    }

    #[test]
    fn insufficient_gold_rejects_placement() {
        let mut world = World::new(Rules {
            economy: plateau_defence_core::EconomyRules {
                starting_gold: 60,
                ..Default::default()
            },
            ..Rules::default()
        });
        let events = run(
            &mut world,
            Command::PlaceStructure {
                kind: StructureKind::Tower,
                tile: GridCoord::new(9, 9),
            },
        );
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                kind: StructureKind::Tower,
                tile: GridCoord::new(9, 9),
                reason: PlacementError::InsufficientGold(InsufficientGold {
                    required: 100,
                    available: 60,
                }),
            }]
        );
        assert_eq!(query::economy(&world).gold, 60);
        assert!(query::is_walkable(&world, GridCoord::new(9, 9)));
    }

    #[test]
    fn demolish_refunds_and_second_attempt_is_rejected() {
        let mut world = World::default();
        let id = place(&mut world, StructureKind::Tower, 10, 10);
        let first = run(&mut world, Command::DemolishStructure { structure: id });
        assert_eq!(
            first,
            vec![Event::StructureDemolished {
                structure: id,
                kind: StructureKind::Tower,
                tile: GridCoord::new(10, 10),
                refund: 50,
            }]
        );
        assert_eq!(query::economy(&world).gold, 450);
        assert!(query::is_walkable(&world, GridCoord::new(10, 10)));

        let second = run(&mut world, Command::DemolishStructure { structure: id });
        assert_eq!(
            second,
            vec![Event::DemolitionRejected {
                structure: id,
                reason: DemolishError::MissingStructure,
            }]
        );
        assert_eq!(query::economy(&world).gold, 450);
    }

    #[test]
    fn upgrade_applies_once() {
        let mut world = World::default();
        let id = place(&mut world, StructureKind::Tower, 10, 10);
        let events = run(&mut world, Command::UpgradeTower { structure: id });
        assert_eq!(
            events,
            vec![Event::TowerUpgraded {
                structure: id,
                level: 2
            }]
        );
        let snapshot = query::structure_view(&world).get(id).copied().expect("tower");
        let stats = snapshot.tower.expect("tower stats");
        assert_eq!(stats.damage, 8.0);
        assert_eq!(stats.fire_interval, 0.45);
        assert_eq!(snapshot.max_hit_points, 20.0);
        assert_eq!(snapshot.hit_points, 20.0);
        assert_eq!(query::economy(&world).gold, 250);

        let again = run(&mut world, Command::UpgradeTower { structure: id });
        assert_eq!(
            again,
            vec![Event::UpgradeRejected {
                structure: id,
                reason: UpgradeError::MaxLevel,
            }]
        );
        assert_eq!(query::economy(&world).gold, 250);
    }

    #[test]
    fn walls_cannot_be_upgraded() {
        let mut world = World::default();
        let id = place(&mut world, StructureKind::Wall, 10, 10);
        let events = run(&mut world, Command::UpgradeTower { structure: id });
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                structure: id,
                reason: UpgradeError::NotATower,
            }]
        );
    }

    #[test]
    fn inspection_reports_refund_and_upgrade_cost() {
        let mut world = World::default();
        let tower = place(&mut world, StructureKind::Tower, 10, 10);
        let wall = place(&mut world, StructureKind::Wall, 11, 10);
        let tower_panel = query::inspect(&world, tower).expect("tower");
        assert_eq!(tower_panel.refund, 50);
        assert_eq!(tower_panel.upgrade_cost, Some(150));
        assert!(tower_panel.upgrade_affordable);
        let wall_panel = query::inspect(&world, wall).expect("wall");
        assert_eq!(wall_panel.refund, 25);
        assert_eq!(wall_panel.upgrade_cost, None);
        assert_eq!(query::structure_at(&world, GridCoord::new(11, 10)), Some(wall));
    }

    #[test]
    fn build_mode_toggles_off_on_reselect() {
        let mut world = World::default();
        let _ = run(
            &mut world,
            Command::SelectBuildMode {
                kind: StructureKind::Tower,
            },
        );
        assert_eq!(query::economy(&world).build_mode, Some(StructureKind::Tower));
        let events = run(
            &mut world,
            Command::SelectBuildMode {
                kind: StructureKind::Tower,
            },
        );
        assert_eq!(events, vec![Event::BuildModeChanged { mode: None }]);
        assert!(run(&mut world, Command::ClearBuildMode).is_empty());
    }

    #[test]
    fn spawned_monster_uses_wave_speed_and_first_waypoint() {
        let mut world = World::default();
        let events = run(&mut world, Command::SpawnMonster);
        let [Event::MonsterSpawned { monster, position }] = events.as_slice() else {
            panic!("unexpected events: {events:?}");
        };
        assert_eq!(
            *position,
            query::grid_to_world(&world, GridCoord::new(12, -3), 0.6)
        );
        let view = query::monster_view(&world);
        let snapshot = view.get(*monster).expect("monster");
        assert!((snapshot.speed - 6.4).abs() < 1e-6);
        assert_eq!(snapshot.health, 5.0);
        assert_eq!(snapshot.waypoint, query::path_waypoints(&world)[0]);
    }

    #[test]
    fn move_monster_never_rewinds_path_index() {
        let mut world = World::default();
        let _ = run(&mut world, Command::SpawnMonster);
        let monster = MonsterId::new(0);
        let _ = run(
            &mut world,
            Command::MoveMonster {
                monster,
                position: Vec3::ZERO,
                path_index: 4,
            },
        );
        let _ = run(
            &mut world,
            Command::MoveMonster {
                monster,
                position: Vec3::ONE,
                path_index: 2,
            },
        );
        let view = query::monster_view(&world);
        let snapshot = view.get(monster).expect("monster");
        assert_eq!(snapshot.path_index, 4);
        assert_eq!(snapshot.position, Vec3::ONE);
    }

    #[test]
    fn one_hit_kills_and_rewards_one_gold() {
        let mut world = World::default();
        let tower = place(&mut world, StructureKind::Tower, 12, 8);
        let _ = run(&mut world, Command::SpawnMonster);
        let monster = MonsterId::new(0);
        let fired = run(&mut world, Command::FireProjectile { tower, target: monster });
        let [Event::ProjectileFired { projectile, .. }] = fired.as_slice() else {
            panic!("unexpected events: {fired:?}");
        };
        let projectile = *projectile;
        let gold = query::economy(&world).gold;

        let events = run(&mut world, Command::ImpactProjectile { projectile });
        assert_eq!(events, vec![Event::MonsterKilled { monster, reward: 1 }]);
        assert!(query::monster_view(&world).is_empty());
        assert!(query::projectile_view(&world).is_empty());
        assert_eq!(query::economy(&world).gold, gold + 1);
    }

    #[test]
    fn firing_respects_cooldown() {
        let mut world = World::default();
        let tower = place(&mut world, StructureKind::Tower, 12, 8);
        let _ = run(&mut world, Command::SpawnMonster);
        let target = MonsterId::new(0);
        assert_eq!(run(&mut world, Command::FireProjectile { tower, target }).len(), 1);
        assert!(run(&mut world, Command::FireProjectile { tower, target }).is_empty());
        let _ = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(700),
            },
        );
        assert_eq!(run(&mut world, Command::FireProjectile { tower, target }).len(), 1);
    }

    #[test]
    fn impact_on_vanished_target_is_discarded() {
        let mut world = World::default();
        let tower = place(&mut world, StructureKind::Tower, 12, 8);
        let _ = run(&mut world, Command::SpawnMonster);
        let monster = MonsterId::new(0);
        let _ = run(&mut world, Command::FireProjectile { tower, target: monster });
        let _ = run(&mut world, Command::LeakMonster { monster });
        let events = run(
            &mut world,
            Command::ImpactProjectile {
                projectile: ProjectileId::new(0),
            },
        );
        assert_eq!(
            events,
            vec![Event::ProjectileDiscarded {
                projectile: ProjectileId::new(0)
            }]
        );
    }

    #[test]
    fn last_leak_ends_the_game_and_freezes_the_world() {
        let mut world = World::new(Rules {
            economy: plateau_defence_core::EconomyRules {
                starting_health: 1,
                ..Default::default()
            },
            ..Rules::default()
        });
        let _ = run(&mut world, Command::SpawnMonster);
        let events = run(
            &mut world,
            Command::LeakMonster {
                monster: MonsterId::new(0),
            },
        );
        assert_eq!(
            events,
            vec![
                Event::MonsterLeaked {
                    monster: MonsterId::new(0)
                },
                Event::BaseDamaged { health: 0 },
                Event::GameOver { wave: 1 },
            ]
        );
        assert_eq!(query::economy(&world).play_state, PlayState::GameOver);

        assert!(run(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16)
            }
        )
        .is_empty());
        assert!(run(&mut world, Command::SpawnMonster).is_empty());
        let rejected = run(
            &mut world,
            Command::PlaceStructure {
                kind: StructureKind::Wall,
                tile: GridCoord::new(9, 9),
            },
        );
        assert_eq!(
            rejected,
            vec![Event::PlacementRejected {
                kind: StructureKind::Wall,
                tile: GridCoord::new(9, 9),
                reason: PlacementError::GameOver,
            }]
        );
    }

    #[test]
    fn blocked_monster_wears_down_and_destroys_wall() {
        let mut world = World::default();
        let wall = place(&mut world, StructureKind::Wall, 11, 9);
        let _ = run(&mut world, Command::SpawnMonster);
        let monster = MonsterId::new(0);
        let damaged = run(
            &mut world,
            Command::BlockMonster {
                monster,
                structure: wall,
                damage: 4.0,
            },
        );
        assert_eq!(
            damaged,
            vec![Event::StructureDamaged {
                structure: wall,
                hit_points: 6.0
            }]
        );
        let destroyed = run(
            &mut world,
            Command::BlockMonster {
                monster,
                structure: wall,
                damage: 7.0,
            },
        );
        assert_eq!(
            destroyed,
            vec![Event::StructureDestroyed {
                structure: wall,
                kind: StructureKind::Wall,
                tile: GridCoord::new(11, 9),
            }]
        );
        assert!(query::is_walkable(&world, GridCoord::new(11, 9)));
        assert_eq!(query::economy(&world).gold, 450);
    }

    #[test]
    fn hero_targets_must_be_walkable_and_free() {
        let mut world = World::default();
        let _ = place(&mut world, StructureKind::Wall, 10, 10);
        let cases = [
            (GridCoord::new(0, 0), MoveError::Unwalkable),
            (GridCoord::new(10, 10), MoveError::Occupied),
            (GridCoord::new(-1, 4), MoveError::OutOfBounds),
        ];
        for (tile, reason) in cases {
            assert_eq!(
                run(&mut world, Command::SetHeroTarget { tile }),
                vec![Event::HeroMoveRejected { tile, reason }]
            );
        }
        let tile = GridCoord::new(12, 5);
        assert_eq!(
            query::terrain_view(&world).tile(tile).map(|t| t.kind),
            Some(TileKind::Path)
        );
        assert_eq!(
            run(&mut world, Command::SetHeroTarget { tile }),
            vec![Event::HeroTargetSet { tile }]
        );
        assert_eq!(query::hero(&world).target, Some(tile));

        let _ = run(
            &mut world,
            Command::SetJoystick {
                vector: Vec2::new(0.0, 1.0),
            },
        );
        assert_eq!(query::hero(&world).target, None);
    }

    #[test]
    fn hero_starts_three_rows_below_plateau_centre() {
        let world = World::default();
        let hero = query::hero(&world);
        assert_eq!(hero.tile, GridCoord::new(12, 15));
        assert_eq!(hero.position, query::grid_to_world(&world, hero.tile, 0.0));
        assert_eq!(query::welcome_banner(&world), "Hold the plateau.");
    }
}
