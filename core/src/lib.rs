#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Plateau Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod rules;

pub use rules::{
    EconomyRules, HeroRules, HomeRules, MonsterRules, Rules, TerrainRules, TowerRules,
    TowerUpgradeRules, WallRules, WaveRules,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Hold the plateau.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Announces the current wave without changing the wave counter.
    BeginWave,
    /// Increments the wave counter, grants the wave bonus and announces the wave.
    AdvanceWave,
    /// Emits a new monster at the head of the invasion path.
    SpawnMonster,
    /// Moves a monster to a new position along the path.
    MoveMonster {
        /// Identifier of the monster being moved.
        monster: MonsterId,
        /// Position the monster occupies after the move.
        position: Vec3,
        /// Index of the waypoint the monster heads toward after the move.
        path_index: usize,
    },
    /// Removes a monster that reached the home and damages the base.
    LeakMonster {
        /// Identifier of the monster that reached the home.
        monster: MonsterId,
    },
    /// Keeps a monster in place and lets it attack the structure that blocks it.
    BlockMonster {
        /// Identifier of the blocked monster.
        monster: MonsterId,
        /// Structure that blocked the move.
        structure: StructureId,
        /// Hit points removed from the structure.
        damage: f32,
    },
    /// Toggles the pending build mode; selecting the active kind clears it.
    SelectBuildMode {
        /// Kind of structure the player intends to build.
        kind: StructureKind,
    },
    /// Clears any pending build mode.
    ClearBuildMode,
    /// Requests construction of a structure on the provided tile.
    PlaceStructure {
        /// Kind of structure to construct.
        kind: StructureKind,
        /// Tile that receives the structure.
        tile: GridCoord,
    },
    /// Requests an upgrade of an existing tower.
    UpgradeTower {
        /// Identifier of the tower to upgrade.
        structure: StructureId,
    },
    /// Requests removal of a structure with a partial refund.
    DemolishStructure {
        /// Identifier of the structure to remove.
        structure: StructureId,
    },
    /// Requests that the hero walk toward the provided tile.
    SetHeroTarget {
        /// Destination tile.
        tile: GridCoord,
    },
    /// Replaces the hero's continuous movement input.
    SetJoystick {
        /// Stick deflection; x points right and y points up on screen.
        vector: Vec2,
    },
    /// Moves the hero to a new position.
    MoveHero {
        /// Position the hero occupies after the move.
        position: Vec3,
        /// Indicates that the click-to-move destination was reached.
        arrived: bool,
    },
    /// Cancels the hero's click-to-move target after a blocked step.
    BlockHero,
    /// Spawns a projectile from a tower toward a monster.
    FireProjectile {
        /// Identifier of the firing tower.
        tower: StructureId,
        /// Identifier of the targeted monster.
        target: MonsterId,
    },
    /// Moves a projectile toward its target.
    MoveProjectile {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Position of the projectile after the move.
        position: Vec3,
    },
    /// Resolves a projectile that reached its target.
    ImpactProjectile {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
    /// Removes a projectile whose target vanished.
    DiscardProjectile {
        /// Identifier of the projectile.
        projectile: ProjectileId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a wave begins emitting monsters.
    WaveStarted {
        /// Number of the wave that started.
        wave: u32,
    },
    /// Confirms that a monster entered the world.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Position where the monster appeared.
        position: Vec3,
    },
    /// Reports that a monster was killed by a projectile.
    MonsterKilled {
        /// Identifier of the killed monster.
        monster: MonsterId,
        /// Gold awarded for the kill.
        reward: u32,
    },
    /// Reports that a monster reached the home and damaged the base.
    MonsterLeaked {
        /// Identifier of the leaked monster.
        monster: MonsterId,
    },
    /// Reports that a projectile hit a monster that survived.
    MonsterHit {
        /// Identifier of the monster that was hit.
        monster: MonsterId,
        /// Health remaining after the hit.
        health: f32,
    },
    /// Announces the pending build mode after a selection change.
    BuildModeChanged {
        /// Active build mode, if any.
        mode: Option<StructureKind>,
    },
    /// Confirms that a structure was placed.
    StructurePlaced {
        /// Identifier assigned to the structure.
        structure: StructureId,
        /// Kind of structure that was placed.
        kind: StructureKind,
        /// Tile that holds the structure.
        tile: GridCoord,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Kind of structure requested.
        kind: StructureKind,
        /// Tile provided in the request.
        tile: GridCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was upgraded.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        structure: StructureId,
        /// Level reached by the tower.
        level: u8,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Identifier provided in the request.
        structure: StructureId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a structure was demolished by the player.
    StructureDemolished {
        /// Identifier of the removed structure.
        structure: StructureId,
        /// Kind of the removed structure.
        kind: StructureKind,
        /// Tile freed by the removal.
        tile: GridCoord,
        /// Gold returned to the player.
        refund: u32,
    },
    /// Reports that a demolition request was rejected.
    DemolitionRejected {
        /// Identifier provided in the request.
        structure: StructureId,
        /// Specific reason the demolition failed.
        reason: DemolishError,
    },
    /// Reports that a structure lost hit points to a blocked monster.
    StructureDamaged {
        /// Identifier of the damaged structure.
        structure: StructureId,
        /// Hit points remaining.
        hit_points: f32,
    },
    /// Reports that a structure was destroyed by monsters.
    StructureDestroyed {
        /// Identifier of the destroyed structure.
        structure: StructureId,
        /// Kind of the destroyed structure.
        kind: StructureKind,
        /// Tile freed by the destruction.
        tile: GridCoord,
    },
    /// Confirms a new click-to-move destination for the hero.
    HeroTargetSet {
        /// Destination tile.
        tile: GridCoord,
    },
    /// Reports that a hero move request was rejected.
    HeroMoveRejected {
        /// Tile provided in the request.
        tile: GridCoord,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Reports that the hero reached its click-to-move destination.
    HeroArrived {
        /// Tile the hero now stands on.
        tile: GridCoord,
    },
    /// Reports that the hero bumped into a structure and stopped.
    HeroBlocked,
    /// Confirms that a tower launched a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Identifier of the firing tower.
        tower: StructureId,
        /// Identifier of the targeted monster.
        target: MonsterId,
    },
    /// Reports that a projectile vanished without effect.
    ProjectileDiscarded {
        /// Identifier of the discarded projectile.
        projectile: ProjectileId,
    },
    /// Reports the home health after a leak.
    BaseDamaged {
        /// Home health remaining.
        health: u32,
    },
    /// Announces the terminal state: the home has fallen.
    GameOver {
        /// Wave during which the home fell.
        wave: u32,
    },
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower or wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single terrain tile.
///
/// Coordinates are signed so positions outside the grid, such as the spawn
/// point beyond the map edge, remain expressible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two coordinates share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: GridCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Static classification of a terrain tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Decorative ground that nothing walks on.
    Grass,
    /// Ground-level invasion path.
    Path,
    /// Single tile connecting the path with the plateau.
    Ramp,
    /// Elevated interior holding the home and most build sites.
    Plateau,
}

impl TileKind {
    /// Reports whether units may walk on tiles of this kind.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Grass)
    }

    /// Reports whether structures may be placed on tiles of this kind.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(self, Self::Plateau)
    }
}

/// Kinds of structures the player can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureKind {
    /// Shooting structure that fires homing projectiles.
    Tower,
    /// Passive blocker.
    Wall,
}

/// Terminal status of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayState {
    /// The home stands and the simulation advances.
    Running,
    /// The home has fallen; only a restart recovers.
    GameOver,
}

/// Gold shortfall reported by a rejected spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[error("insufficient gold: {required} required, {available} available")]
pub struct InsufficientGold {
    /// Gold the action costs.
    pub required: u32,
    /// Gold the ledger holds.
    pub available: u32,
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// No build mode is armed.
    #[error("no build mode selected")]
    NoBuildMode,
    /// The tile lies outside the grid.
    #[error("tile lies outside the map")]
    OutOfBounds,
    /// The tile kind does not allow structures.
    #[error("structures cannot be placed on this tile")]
    Unbuildable,
    /// The tile holds the home structure.
    #[error("the home occupies this tile")]
    HomeTile,
    /// The tile already holds a structure.
    #[error("tile is already occupied")]
    Occupied,
    /// The player cannot afford the structure.
    #[error(transparent)]
    InsufficientGold(#[from] InsufficientGold),
    /// The home has fallen.
    #[error("the game is over")]
    GameOver,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No structure with the provided identifier exists.
    #[error("structure does not exist")]
    MissingStructure,
    /// The structure is a wall.
    #[error("only towers can be upgraded")]
    NotATower,
    /// The tower already reached its highest level.
    #[error("tower is already at maximum level")]
    MaxLevel,
    /// The player cannot afford the upgrade.
    #[error(transparent)]
    InsufficientGold(#[from] InsufficientGold),
    /// The home has fallen.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a demolition request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum DemolishError {
    /// No structure with the provided identifier exists.
    #[error("structure does not exist")]
    MissingStructure,
    /// The home has fallen.
    #[error("the game is over")]
    GameOver,
}

/// Reasons a hero move request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MoveError {
    /// The tile lies outside the grid.
    #[error("tile lies outside the map")]
    OutOfBounds,
    /// The tile kind cannot be walked on.
    #[error("tile is not walkable")]
    Unwalkable,
    /// The tile holds a structure.
    #[error("tile is occupied")]
    Occupied,
    /// The home has fallen.
    #[error("the game is over")]
    GameOver,
}

/// Coarse health band used when presenting health bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    /// More than 60% of maximum health remains.
    Healthy,
    /// More than 30% of maximum health remains.
    Wounded,
    /// Some health remains, at most 30%.
    Critical,
    /// No health remains; health bars are hidden.
    Depleted,
}

impl HealthStatus {
    /// Fraction of maximum health remaining, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn ratio(current: f32, maximum: f32) -> f32 {
        if maximum <= 0.0 {
            return 0.0;
        }
        (current / maximum).clamp(0.0, 1.0)
    }

    /// Classifies the provided health values into a presentation band.
    #[must_use]
    pub fn classify(current: f32, maximum: f32) -> Self {
        if current <= 0.0 {
            return Self::Depleted;
        }
        let ratio = Self::ratio(current, maximum);
        if ratio > 0.6 {
            Self::Healthy
        } else if ratio > 0.3 {
            Self::Wounded
        } else {
            Self::Critical
        }
    }
}

/// Planar mapping between grid coordinates and world space.
///
/// The grid is centred on the world origin. Tile `(x, y)` maps to world `x`
/// and `z`; elevation is the terrain's concern and is not handled here.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    size: u32,
    tile_size: f32,
}

impl GridGeometry {
    /// Creates a geometry for a square grid of `size` tiles per edge.
    #[must_use]
    pub const fn new(size: u32, tile_size: f32) -> Self {
        Self { size, tile_size }
    }

    /// Number of tiles along each edge.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Edge length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub fn contains(&self, coord: GridCoord) -> bool {
        let Ok(size) = i32::try_from(self.size) else {
            return false;
        };
        (0..size).contains(&coord.x()) && (0..size).contains(&coord.y())
    }

    /// Row-major index of the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let size = usize::try_from(self.size).ok()?;
        let x = usize::try_from(coord.x()).ok()?;
        let y = usize::try_from(coord.y()).ok()?;
        Some(y * size + x)
    }

    /// World-space centre of the tile on the ground plane as `(x, z)`.
    ///
    /// Defined for every coordinate, including ones outside the grid.
    #[must_use]
    pub fn tile_center(&self, coord: GridCoord) -> Vec2 {
        let offset = self.size as f32 * self.tile_size / 2.0;
        let half = self.tile_size / 2.0;
        Vec2::new(
            coord.x() as f32 * self.tile_size - offset + half,
            coord.y() as f32 * self.tile_size - offset + half,
        )
    }

    /// Tile whose footprint contains the world position, ignoring elevation.
    ///
    /// Positions beyond the grid map to coordinates outside it; callers check
    /// [`GridGeometry::contains`] when they need an existing tile.
    #[must_use]
    pub fn locate(&self, position: Vec3) -> GridCoord {
        if self.tile_size <= f32::EPSILON {
            return GridCoord::new(0, 0);
        }
        let offset = self.size as f32 * self.tile_size / 2.0;
        let x = ((position.x + offset) / self.tile_size).floor() as i32;
        let y = ((position.z + offset) / self.tile_size).floor() as i32;
        GridCoord::new(x, y)
    }
}

/// Moving unit categories recognised by the blocking resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Player-controlled hero; walks through the home.
    Hero,
    /// Invading monster; touching the home counts as a leak.
    Monster,
}

/// Outcome of probing a proposed unit position against every collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contact {
    /// No collider overlaps the position.
    Clear,
    /// A monster touched the home.
    Home,
    /// A structure blocks the position.
    Structure(StructureId),
}

/// Details backing the structure inspection and upgrade panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureInspection {
    /// Current state of the structure.
    pub snapshot: StructureSnapshot,
    /// Gold returned when demolishing the structure.
    pub refund: u32,
    /// Gold required for the next upgrade, absent for walls and maxed towers.
    pub upgrade_cost: Option<u32>,
    /// Whether the player can afford the next upgrade right now.
    pub upgrade_affordable: bool,
}

/// Immutable representation of a single terrain tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Location of the tile.
    pub coord: GridCoord,
    /// Static classification of the tile.
    pub kind: TileKind,
    /// Elevation of the tile surface.
    pub height: f32,
    /// Whether units may currently walk on the tile.
    pub walkable: bool,
    /// Structure occupying the tile, if any.
    pub occupied: Option<StructureKind>,
}

/// Read-only snapshot of the terrain grid and invasion path.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainView {
    geometry: GridGeometry,
    ground_height: f32,
    tiles: Vec<TileSnapshot>,
    path: Vec<GridCoord>,
    home: GridCoord,
}

impl TerrainView {
    /// Creates a terrain view from row-major tile snapshots.
    #[must_use]
    pub fn new(
        geometry: GridGeometry,
        ground_height: f32,
        tiles: Vec<TileSnapshot>,
        path: Vec<GridCoord>,
        home: GridCoord,
    ) -> Self {
        Self {
            geometry,
            ground_height,
            tiles,
            path,
            home,
        }
    }

    /// Planar mapping shared with the world.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    /// Tile snapshot at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, coord: GridCoord) -> Option<&TileSnapshot> {
        self.geometry
            .index(coord)
            .and_then(|index| self.tiles.get(index))
    }

    /// World position of the tile surface raised by `vertical_offset`.
    ///
    /// Tiles outside the grid sit at ground height.
    #[must_use]
    pub fn grid_to_world(&self, coord: GridCoord, vertical_offset: f32) -> Vec3 {
        let planar = self.geometry.tile_center(coord);
        let height = self
            .tile(coord)
            .map_or(self.ground_height, |tile| tile.height);
        Vec3::new(planar.x, height + vertical_offset, planar.y)
    }

    /// Iterator over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.tiles.iter()
    }

    /// Invasion path from the spawn edge to the home.
    #[must_use]
    pub fn path(&self) -> &[GridCoord] {
        &self.path
    }

    /// Tile holding the home structure.
    #[must_use]
    pub const fn home(&self) -> GridCoord {
        self.home
    }
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Current world position.
    pub position: Vec3,
    /// World position of the waypoint the monster walks toward.
    pub waypoint: Vec3,
    /// Index of the waypoint within the path.
    pub path_index: usize,
    /// Remaining health.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Structure damage per second while blocked.
    pub attack: f32,
    /// Collision radius.
    pub radius: f32,
}

/// Read-only snapshot describing all live monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a monster by identifier.
    #[must_use]
    pub fn get(&self, id: MonsterId) -> Option<&MonsterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live monsters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no monsters are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Combat statistics carried by towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting radius measured from the anchor point.
    pub range: f32,
    /// Damage delivered per projectile.
    pub damage: f32,
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Seconds until the tower may fire again; ready at or below zero.
    pub cooldown: f32,
    /// Projectile speed in world units per second.
    pub projectile_speed: f32,
    /// Upgrade level, starting at one.
    pub level: u8,
}

impl TowerStats {
    /// Reports whether the tower may fire this tick.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Immutable representation of a single structure used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureSnapshot {
    /// Identifier allocated to the structure by the world.
    pub id: StructureId,
    /// Kind of structure.
    pub kind: StructureKind,
    /// Tile holding the structure.
    pub tile: GridCoord,
    /// Collider centre: the tile surface for towers, the block centre for walls.
    pub position: Vec3,
    /// Cached targeting anchor.
    pub anchor: Vec3,
    /// Remaining hit points.
    pub hit_points: f32,
    /// Maximum hit points.
    pub max_hit_points: f32,
    /// Collision radius.
    pub radius: f32,
    /// Combat statistics, present for towers only.
    pub tower: Option<TowerStats>,
}

impl StructureSnapshot {
    /// Health band used by the structure's status bar.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus::classify(self.hit_points, self.max_hit_points)
    }
}

/// Read-only snapshot describing all structures.
#[derive(Clone, Debug, Default)]
pub struct StructureView {
    snapshots: Vec<StructureSnapshot>,
}

impl StructureView {
    /// Creates a new structure view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<StructureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured structure snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &StructureSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over towers only.
    pub fn towers(&self) -> impl Iterator<Item = (&StructureSnapshot, &TowerStats)> {
        self.snapshots
            .iter()
            .filter_map(|snapshot| snapshot.tower.as_ref().map(|stats| (snapshot, stats)))
    }

    /// Looks up a structure by identifier.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&StructureSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no structures exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<StructureSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile.
    pub id: ProjectileId,
    /// Current world position.
    pub position: Vec3,
    /// Monster the projectile homes on.
    pub target: MonsterId,
    /// Damage applied on impact.
    pub damage: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectiles are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the hero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeroSnapshot {
    /// Current world position.
    pub position: Vec3,
    /// Tile the hero last settled on.
    pub tile: GridCoord,
    /// Click-to-move destination, if any.
    pub target: Option<GridCoord>,
    /// Continuous movement input.
    pub joystick: Vec2,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
}

/// Process-wide economy and progress state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Gold available for spending.
    pub gold: u32,
    /// Remaining home health.
    pub health: u32,
    /// Home health at the start of the session.
    pub max_health: u32,
    /// Current wave number.
    pub wave: u32,
    /// Pending build mode, if any.
    pub build_mode: Option<StructureKind>,
    /// Whether the session is still running.
    pub play_state: PlayState,
}

/// Target assignment computed by the tower targeting system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Identifier of the tower.
    pub tower: StructureId,
    /// Identifier of the monster selected as target.
    pub monster: MonsterId,
    /// Distance between the tower anchor and the monster.
    pub distance: f32,
}
