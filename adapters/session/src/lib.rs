#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session adapter that owns a world and every system.
//!
//! A [`Session`] is the single integration point for front ends. Player
//! requests are applied immediately and answered with a `Result` carrying the
//! world's typed rejection reason. [`Session::advance`] runs one frame in a
//! fixed order: hero movement, monster movement, tower targeting and firing,
//! projectile flight, then wave scheduling.

use std::time::Duration;

use glam::{Vec2, Vec3};
use log::{debug, trace};
use plateau_defence_core::{
    Command, DemolishError, EconomySnapshot, Event, GridCoord, HeroSnapshot, MonsterView,
    MoveError, PlacementError, PlayState, ProjectileView, Rules, StructureId,
    StructureInspection, StructureKind, StructureView, TerrainView, TowerTarget, UnitKind,
    UpgradeError,
};
use plateau_defence_rendering::{
    CameraRig, FrameInput, PanDirection, Scene, TilePicker, TopDownPicker,
};
use plateau_defence_system_builder::{Builder, BuilderInput, PlacementPreview};
use plateau_defence_system_collision::{BlockingMode, BlockingStrategy, Colliders};
use plateau_defence_system_movement::{self as movement, Movement};
use plateau_defence_system_projectiles::{self as projectiles, Projectiles};
use plateau_defence_system_tower_combat::TowerCombat;
use plateau_defence_system_tower_targeting::TowerTargeting;
use plateau_defence_system_wave_director::{self as wave_director, WaveDirector};
use plateau_defence_world::{self as world, query, World};

/// Configuration parameters required to construct a session.
#[derive(Clone, Debug, Default)]
pub struct Config {
    rules: Rules,
    blocking: BlockingMode,
    camera: CameraRig,
}

impl Config {
    /// Creates a configuration from a ruleset and a blocking strategy.
    #[must_use]
    pub fn new(rules: Rules, blocking: BlockingMode) -> Self {
        Self {
            rules,
            blocking,
            camera: CameraRig::default(),
        }
    }

    /// Replaces the camera the session starts with.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraRig) -> Self {
        self.camera = camera;
        self
    }
}

/// Result of tapping a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// A structure of the armed kind was built.
    Built(StructureId),
    /// The armed build was refused, most often for lack of gold.
    BuildRefused(PlacementError),
    /// The hero now walks toward the tile.
    Walking(GridCoord),
    /// The hero cannot walk to the tile.
    MoveRefused(MoveError),
}

/// One running game: world, systems, camera and the events between frames.
#[derive(Debug)]
pub struct Session {
    world: World,
    blocking_mode: BlockingMode,
    blocking: Box<dyn BlockingStrategy>,
    wave_director: WaveDirector,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    builder: Builder,
    camera: CameraRig,
    picker: TopDownPicker,
    pending: Vec<Event>,
    targets: Vec<TowerTarget>,
}

impl Session {
    /// Creates a session and announces the first wave.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rules = config.rules;
        let wave_director = WaveDirector::new(wave_director::Config::new(rules.wave.clone()));
        let movement = Movement::new(movement::Config::from_rules(&rules.hero));
        let projectiles = Projectiles::new(projectiles::Config::from_rules(&rules.monster));
        let mut session = Self {
            world: World::new(rules),
            blocking_mode: config.blocking,
            blocking: config.blocking.strategy(),
            wave_director,
            movement,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            projectiles,
            builder: Builder::new(),
            camera: config.camera,
            picker: TopDownPicker,
            pending: Vec::new(),
            targets: Vec::new(),
        };
        debug!("session created with {:?} blocking", config.blocking);
        let _ = session.execute(Command::BeginWave);
        session
    }

    /// Advances the simulation by `dt_seconds`.
    ///
    /// Negative or non-finite deltas are treated as zero. Nothing happens once
    /// the home has fallen.
    pub fn advance(&mut self, dt_seconds: f32) {
        if self.is_over() {
            self.pending.clear();
            return;
        }
        let dt = clamp_delta(dt_seconds);
        let tick = self.execute(Command::Tick { dt });

        let mut commands = Vec::new();
        {
            let colliders = Colliders::capture(
                query::home_position(&self.world),
                query::rules(&self.world).home.collider_radius,
                &query::structure_view(&self.world),
            );
            let blocking = self.blocking.as_ref();
            let contact = |unit: UnitKind, position: Vec3, radius: f32| {
                blocking.resolve(&colliders, unit, position, radius)
            };
            self.movement.handle_hero(
                &tick,
                &query::hero(&self.world),
                &query::terrain_view(&self.world),
                contact,
                &mut commands,
            );
            self.movement.handle_monsters(
                &tick,
                &query::monster_view(&self.world),
                query::path_waypoints(&self.world).len(),
                contact,
                &mut commands,
            );
        }
        let _ = self.execute_all(commands.drain(..));

        let structures = query::structure_view(&self.world);
        self.targeting.handle(
            &structures,
            &query::monster_view(&self.world),
            &mut self.targets,
        );
        self.combat.handle(&structures, &self.targets, &mut commands);
        let _ = self.execute_all(commands.drain(..));

        self.projectiles.handle(
            &tick,
            &query::projectile_view(&self.world),
            &query::monster_view(&self.world),
            &mut commands,
        );
        let _ = self.execute_all(commands.drain(..));

        let events = std::mem::take(&mut self.pending);
        let live = query::monster_view(&self.world).len();
        self.wave_director.handle(&events, live, &mut commands);
        let _ = self.execute_all(commands.drain(..));

        trace!(
            "frame {dt:?}: {live} monsters, {} targets, {} events",
            self.targets.len(),
            events.len()
        );
    }

    /// Toggles the pending build mode and returns the resulting mode.
    pub fn request_build(&mut self, kind: StructureKind) -> Option<StructureKind> {
        let _ = self.execute(Command::SelectBuildMode { kind });
        self.builder.mode()
    }

    /// Clears the pending build mode.
    pub fn clear_build_mode(&mut self) {
        let _ = self.execute(Command::ClearBuildMode);
    }

    /// Builds the armed structure kind on `tile`.
    pub fn request_build_at(&mut self, tile: GridCoord) -> Result<StructureId, PlacementError> {
        let Some(kind) = self.builder.mode() else {
            return Err(PlacementError::NoBuildMode);
        };
        let events = self.execute(Command::PlaceStructure { kind, tile });
        let result = events
            .iter()
            .find_map(|event| match event {
                Event::StructurePlaced { structure, .. } => Some(Ok(*structure)),
                Event::PlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::GameOver));
        if let Err(reason) = &result {
            debug!("{kind:?} at ({}, {}) refused: {reason}", tile.x(), tile.y());
        }
        result
    }

    /// Sends the hero toward `tile`.
    pub fn request_move_to(&mut self, tile: GridCoord) -> Result<(), MoveError> {
        let events = self.execute(Command::SetHeroTarget { tile });
        events
            .iter()
            .find_map(|event| match event {
                Event::HeroTargetSet { .. } => Some(Ok(())),
                Event::HeroMoveRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(MoveError::GameOver))
    }

    /// Upgrades a tower and returns its new level.
    pub fn request_upgrade(&mut self, structure: StructureId) -> Result<u8, UpgradeError> {
        let events = self.execute(Command::UpgradeTower { structure });
        let result = events
            .iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { level, .. } => Some(Ok(*level)),
                Event::UpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::GameOver));
        if let Err(reason) = &result {
            debug!("upgrade of {} refused: {reason}", structure.get());
        }
        result
    }

    /// Demolishes a structure and returns the refunded gold.
    pub fn request_demolish(&mut self, structure: StructureId) -> Result<u32, DemolishError> {
        let events = self.execute(Command::DemolishStructure { structure });
        events
            .iter()
            .find_map(|event| match event {
                Event::StructureDemolished { refund, .. } => Some(Ok(*refund)),
                Event::DemolitionRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(DemolishError::GameOver))
    }

    /// Demolishes whatever stands on `tile` while a build mode is armed.
    ///
    /// Returns `None` when no mode is armed or the tile is empty.
    pub fn demolish_at(&mut self, tile: GridCoord) -> Option<Result<u32, DemolishError>> {
        let mut commands = Vec::new();
        let world = &self.world;
        self.builder.handle(
            &[],
            BuilderInput::remove(tile),
            |_| false,
            |coord| query::structure_at(world, coord),
            &mut commands,
        );
        let structure = commands.into_iter().find_map(|command| match command {
            Command::DemolishStructure { structure } => Some(structure),
            _ => None,
        })?;
        Some(self.request_demolish(structure))
    }

    /// Replaces the hero's joystick input; x points right and y points up on screen.
    pub fn set_joystick_vector(&mut self, x: f32, y: f32) {
        let _ = self.execute(Command::SetJoystick {
            vector: Vec2::new(x, y),
        });
    }

    /// Builds on the tile when a mode is armed and the site is open, otherwise
    /// walks the hero there.
    pub fn tap_tile(&mut self, tile: GridCoord) -> Option<TapOutcome> {
        let terrain = query::terrain_view(&self.world);
        let world = &self.world;
        let mut commands = Vec::new();
        self.builder.handle(
            &[],
            BuilderInput::tap(tile),
            |coord| site_open(&terrain, coord),
            |coord| query::structure_at(world, coord),
            &mut commands,
        );

        let events = self.execute_all(commands);
        let outcome = events.iter().find_map(|event| match event {
            Event::StructurePlaced { structure, .. } => Some(TapOutcome::Built(*structure)),
            Event::PlacementRejected { reason, .. } => Some(TapOutcome::BuildRefused(*reason)),
            Event::HeroTargetSet { tile } => Some(TapOutcome::Walking(*tile)),
            Event::HeroMoveRejected { reason, .. } => Some(TapOutcome::MoveRefused(*reason)),
            _ => None,
        });
        debug!("tap on ({}, {}): {outcome:?}", tile.x(), tile.y());
        outcome
    }

    /// Taps whatever tile lies under the screen pixel.
    pub fn tap_screen(&mut self, screen: Vec2) -> Option<TapOutcome> {
        let tile = self.pick_tile(screen)?;
        self.tap_tile(tile)
    }

    /// Applies one frame of backend input: camera first, then joystick and tap.
    pub fn apply_input(&mut self, input: FrameInput) -> Option<TapOutcome> {
        if let Some(direction) = input.pan {
            self.pan_camera(direction);
        }
        for _ in 0..input.zoom_steps.unsigned_abs() {
            if input.zoom_steps > 0 {
                self.zoom_in();
            } else {
                self.zoom_out();
            }
        }
        if input.joystick != self.hero().joystick {
            self.set_joystick_vector(input.joystick.x, input.joystick.y);
        }
        self.tap_screen(input.tap?)
    }

    /// Tile under the screen pixel, if any.
    #[must_use]
    pub fn pick_tile(&self, screen: Vec2) -> Option<GridCoord> {
        self.picker
            .pick(&self.camera, &query::terrain_view(&self.world), screen)
    }

    /// Describes what a tap on `tile` would build.
    #[must_use]
    pub fn preview_at(&self, tile: GridCoord) -> Option<PlacementPreview> {
        let terrain = query::terrain_view(&self.world);
        self.builder
            .preview(tile, |coord| site_open(&terrain, coord))
    }

    /// Pans the camera; has no effect on the simulation.
    pub fn pan_camera(&mut self, direction: PanDirection) {
        self.camera.pan(direction);
    }

    /// Zooms the camera in by one step.
    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
    }

    /// Zooms the camera out by one step.
    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
    }

    /// Current camera.
    #[must_use]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Greeting shown when the session opens.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Ruleset the session runs with.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        query::rules(&self.world)
    }

    /// Blocking strategy chosen at construction.
    #[must_use]
    pub fn blocking_mode(&self) -> BlockingMode {
        self.blocking_mode
    }

    /// Terrain grid including occupancy.
    #[must_use]
    pub fn terrain(&self) -> TerrainView {
        query::terrain_view(&self.world)
    }

    /// Live monsters.
    #[must_use]
    pub fn monsters(&self) -> MonsterView {
        query::monster_view(&self.world)
    }

    /// Towers and walls.
    #[must_use]
    pub fn structures(&self) -> StructureView {
        query::structure_view(&self.world)
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Gold, home health, wave and build mode.
    #[must_use]
    pub fn economy(&self) -> EconomySnapshot {
        query::economy(&self.world)
    }

    /// Hero state.
    #[must_use]
    pub fn hero(&self) -> HeroSnapshot {
        query::hero(&self.world)
    }

    /// Inspection panel data for one structure.
    #[must_use]
    pub fn inspect(&self, structure: StructureId) -> Option<StructureInspection> {
        query::inspect(&self.world, structure)
    }

    /// Tower target assignments computed during the last frame.
    #[must_use]
    pub fn targets(&self) -> &[TowerTarget] {
        &self.targets
    }

    /// Time until the next wave starts, when that countdown is running.
    #[must_use]
    pub fn next_wave_in(&self) -> Option<Duration> {
        self.wave_director.next_wave_in()
    }

    /// Reports whether the home has fallen.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::economy(&self.world).play_state == PlayState::GameOver
    }

    /// Captures the scene backends draw.
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene::capture(
            &self.terrain(),
            &self.structures(),
            &self.monsters(),
            &self.projectiles(),
            &self.hero(),
            self.economy(),
        )
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        let mut ignored = Vec::new();
        self.builder.handle(
            &events,
            BuilderInput::default(),
            |_| false,
            |_| None,
            &mut ignored,
        );
        if !self.is_over() {
            self.pending.extend(events.iter().cloned());
        }
        events
    }

    fn execute_all<I>(&mut self, commands: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Command>,
    {
        let mut events = Vec::new();
        for command in commands {
            events.extend(self.execute(command));
        }
        events
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn site_open(terrain: &TerrainView, tile: GridCoord) -> bool {
    tile != terrain.home()
        && terrain
            .tile(tile)
            .is_some_and(|surface| surface.kind.is_buildable() && surface.walkable)
}

fn clamp_delta(seconds: f32) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
}
