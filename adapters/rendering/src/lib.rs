#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Plateau Defence adapters.
//!
//! Backends receive a [`Scene`] captured from world views and draw it through
//! an isometric [`CameraRig`]. Pointer input travels the other way: a
//! [`TilePicker`] maps screen coordinates back to grid tiles.

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3, Vec3Swizzles};
use plateau_defence_core::{
    EconomySnapshot, GridCoord, HealthStatus, HeroSnapshot, MonsterId, MonsterView, PlayState,
    ProjectileView, StructureId, StructureKind, StructureView, TerrainView, TileKind,
};
use std::{error::Error, f32::consts::FRAC_1_SQRT_2, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from a packed `0xRRGGBB` value.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            red: ((rgb >> 16) & 0xff) as f32 / 255.0,
            green: ((rgb >> 8) & 0xff) as f32 / 255.0,
            blue: (rgb & 0xff) as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Surface color of a terrain tile.
    #[must_use]
    pub const fn for_tile(kind: TileKind) -> Self {
        match kind {
            TileKind::Grass => Self::from_hex(0x4caf50),
            TileKind::Path => Self::from_hex(0x8d6e63),
            TileKind::Ramp => Self::from_hex(0xb3936b),
            TileKind::Plateau => Self::from_hex(0xcbb09e),
        }
    }

    /// Body color of a structure.
    #[must_use]
    pub const fn for_structure(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Tower => Self::from_hex(0xbfa27a),
            StructureKind::Wall => Self::from_hex(0x9ea7ba),
        }
    }

    /// Fill color of a health bar in the provided band.
    #[must_use]
    pub const fn for_health(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Healthy => Self::from_hex(0x4cff4c),
            HealthStatus::Wounded => Self::from_hex(0xffc107),
            HealthStatus::Critical | HealthStatus::Depleted => Self::from_hex(0xff4c4c),
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Health bar floating above a monster or structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// Filled fraction in `0.0..=1.0`.
    pub ratio: f32,
    /// Presentation band derived from the ratio.
    pub status: HealthStatus,
    /// Fill color for the band.
    pub color: Color,
}

impl HealthBar {
    /// Builds the bar for the provided health values; depleted bars are hidden.
    #[must_use]
    pub fn new(current: f32, maximum: f32) -> Option<Self> {
        let status = HealthStatus::classify(current, maximum);
        if status == HealthStatus::Depleted {
            return None;
        }
        Some(Self {
            ratio: HealthStatus::ratio(current, maximum),
            status,
            color: Color::for_health(status),
        })
    }
}

/// Terrain tile as drawn by backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Location of the tile.
    pub coord: GridCoord,
    /// Centre of the tile surface in world space.
    pub center: Vec3,
    /// Surface color.
    pub color: Color,
}

/// Tower or wall as drawn by backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneStructure {
    /// Identifier allocated to the structure by the world.
    pub id: StructureId,
    /// Kind of structure.
    pub kind: StructureKind,
    /// Collider centre of the structure in world space.
    pub position: Vec3,
    /// Tower upgrade level; walls report zero.
    pub level: u8,
    /// Body color.
    pub color: Color,
    /// Hit point bar.
    pub health: Option<HealthBar>,
}

/// Monster as drawn by backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMonster {
    /// Identifier allocated to the monster by the world.
    pub id: MonsterId,
    /// Position in world space.
    pub position: Vec3,
    /// Health bar.
    pub health: Option<HealthBar>,
}

/// Heads-up display values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    /// Gold available.
    pub gold: u32,
    /// Remaining home health.
    pub health: u32,
    /// Current wave number.
    pub wave: u32,
    /// Pending build mode, highlighted on the build buttons.
    pub build_mode: Option<StructureKind>,
    /// Whether the game over overlay is shown.
    pub game_over: bool,
}

impl From<EconomySnapshot> for Hud {
    fn from(economy: EconomySnapshot) -> Self {
        Self {
            gold: economy.gold,
            health: economy.health,
            wave: economy.wave,
            build_mode: economy.build_mode,
            game_over: economy.play_state == PlayState::GameOver,
        }
    }
}

/// Scene description combining terrain, inhabitants and the HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Every terrain tile in row-major order.
    pub tiles: Vec<SceneTile>,
    /// Position of the home structure.
    pub home: Vec3,
    /// Towers and walls.
    pub structures: Vec<SceneStructure>,
    /// Live monsters.
    pub monsters: Vec<SceneMonster>,
    /// Projectiles in flight.
    pub projectiles: Vec<Vec3>,
    /// Hero position.
    pub hero: Vec3,
    /// Heads-up display values.
    pub hud: Hud,
}

impl Scene {
    /// Captures a scene from the world's read-only views.
    #[must_use]
    pub fn capture(
        terrain: &TerrainView,
        structures: &StructureView,
        monsters: &MonsterView,
        projectiles: &ProjectileView,
        hero: &HeroSnapshot,
        economy: EconomySnapshot,
    ) -> Self {
        let tiles = terrain
            .iter()
            .map(|tile| SceneTile {
                coord: tile.coord,
                center: terrain.grid_to_world(tile.coord, 0.0),
                color: Color::for_tile(tile.kind),
            })
            .collect();
        let structures = structures
            .iter()
            .map(|structure| SceneStructure {
                id: structure.id,
                kind: structure.kind,
                position: structure.position,
                level: structure.tower.map_or(0, |tower| tower.level),
                color: Color::for_structure(structure.kind),
                health: HealthBar::new(structure.hit_points, structure.max_hit_points),
            })
            .collect();
        let monsters = monsters
            .iter()
            .map(|monster| SceneMonster {
                id: monster.id,
                position: monster.position,
                health: HealthBar::new(monster.health, monster.max_health),
            })
            .collect();

        Self {
            tiles,
            home: terrain.grid_to_world(terrain.home(), 0.0),
            structures,
            monsters,
            projectiles: projectiles.iter().map(|projectile| projectile.position).collect(),
            hero: hero.position,
            hud: Hud::from(economy),
        }
    }
}

/// Screen direction used when panning the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanDirection {
    /// Toward the top of the screen.
    Up,
    /// Toward the bottom of the screen.
    Down,
    /// Toward the left of the screen.
    Left,
    /// Toward the right of the screen.
    Right,
}

/// Isometric camera focused on a point of the ground plane.
///
/// Screen coordinates are pixels with the origin at the top-left corner of
/// the viewport and y growing downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    focus: Vec2,
    zoom: f32,
    viewport: Vec2,
    pixels_per_unit: f32,
    tile_size: f32,
}

impl CameraRig {
    /// Ground-plane direction of screen "up" as `(x, z)`.
    pub const SCREEN_UP: Vec2 = Vec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2);
    /// Ground-plane direction of screen "right" as `(x, z)`.
    pub const SCREEN_RIGHT: Vec2 = Vec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2);
    /// Distance covered by a single pan, in tiles.
    pub const PAN_TILES: f32 = 2.4;
    /// Zoom change applied by a single zoom step.
    pub const ZOOM_STEP: f32 = 0.08;
    /// Smallest permitted zoom factor.
    pub const MIN_ZOOM: f32 = 0.6;
    /// Largest permitted zoom factor.
    pub const MAX_ZOOM: f32 = 1.6;
    /// Screen pixels per unit of elevation, relative to planar scale.
    pub const ELEVATION_SCALE: f32 = 0.5;

    /// Creates a camera focused on the world origin at zoom 1.
    ///
    /// Returns an error when the viewport has no area or the scale is not
    /// positive.
    pub fn new(
        viewport: Vec2,
        pixels_per_unit: f32,
        tile_size: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(RenderingError::InvalidViewport {
                width: viewport.x,
                height: viewport.y,
            });
        }
        if !(pixels_per_unit > 0.0 && tile_size > 0.0) {
            return Err(RenderingError::InvalidScale {
                pixels_per_unit,
                tile_size,
            });
        }
        Ok(Self {
            focus: Vec2::ZERO,
            zoom: 1.0,
            viewport,
            pixels_per_unit,
            tile_size,
        })
    }

    /// Ground-plane point at the centre of the viewport as `(x, z)`.
    #[must_use]
    pub const fn focus(&self) -> Vec2 {
        self.focus
    }

    /// Current zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves the focus by [`Self::PAN_TILES`] along the isometric axes.
    pub fn pan(&mut self, direction: PanDirection) {
        let step = Self::PAN_TILES * self.tile_size;
        let axis = match direction {
            PanDirection::Up => Self::SCREEN_UP,
            PanDirection::Down => -Self::SCREEN_UP,
            PanDirection::Left => -Self::SCREEN_RIGHT,
            PanDirection::Right => Self::SCREEN_RIGHT,
        };
        self.focus += axis * step;
    }

    /// Zooms in by one step.
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + Self::ZOOM_STEP).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Zooms out by one step.
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - Self::ZOOM_STEP).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    fn scale(&self) -> f32 {
        self.pixels_per_unit * self.zoom
    }

    /// Projects a world position to screen pixels, lifting it by elevation.
    #[must_use]
    pub fn project(&self, position: Vec3) -> Vec2 {
        let relative = position.xz() - self.focus;
        let scale = self.scale();
        Vec2::new(
            self.viewport.x / 2.0 + relative.dot(Self::SCREEN_RIGHT) * scale,
            self.viewport.y / 2.0
                - relative.dot(Self::SCREEN_UP) * scale
                - position.y * scale * Self::ELEVATION_SCALE,
        )
    }

    /// Ground-plane point `(x, z)` under a screen pixel, ignoring elevation.
    #[must_use]
    pub fn unproject(&self, screen: Vec2) -> Vec2 {
        let scale = self.scale();
        let along_right = (screen.x - self.viewport.x / 2.0) / scale;
        let along_up = (self.viewport.y / 2.0 - screen.y) / scale;
        self.focus + Self::SCREEN_RIGHT * along_right + Self::SCREEN_UP * along_up
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            focus: Vec2::ZERO,
            zoom: 1.0,
            viewport: Vec2::new(1280.0, 720.0),
            pixels_per_unit: 4.0,
            tile_size: 6.0,
        }
    }
}

/// Maps pointer positions to terrain tiles.
pub trait TilePicker {
    /// Tile under the screen pixel, if any.
    fn pick(&self, camera: &CameraRig, terrain: &TerrainView, screen: Vec2) -> Option<GridCoord>;
}

/// Picker that treats the terrain as flat when resolving pointer positions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopDownPicker;

impl TilePicker for TopDownPicker {
    fn pick(&self, camera: &CameraRig, terrain: &TerrainView, screen: Vec2) -> Option<GridCoord> {
        let ground = camera.unproject(screen);
        let geometry = terrain.geometry();
        let coord = geometry.locate(Vec3::new(ground.x, 0.0, ground.y));
        geometry.contains(coord).then_some(coord)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Camera pan requested on this frame.
    pub pan: Option<PanDirection>,
    /// Positive to zoom in, negative to zoom out.
    pub zoom_steps: i8,
    /// Screen position of a tap on this frame.
    pub tap: Option<Vec2>,
    /// Joystick deflection; x points right and y points up on screen.
    pub joystick: Vec2,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Background color of the stock game.
    pub const CLEAR_COLOR: Color = Color::from_hex(0x1f2f46);

    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Plateau Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene before
    /// it is rendered. It returns `false` to stop the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The viewport must have a positive area.
    InvalidViewport {
        /// Provided viewport width.
        width: f32,
        /// Provided viewport height.
        height: f32,
    },
    /// Scales must be positive to keep projection invertible.
    InvalidScale {
        /// Provided pixels per world unit.
        pixels_per_unit: f32,
        /// Provided tile edge length.
        tile_size: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(f, "viewport must have positive area (received {width}x{height})")
            }
            Self::InvalidScale {
                pixels_per_unit,
                tile_size,
            } => write!(
                f,
                "scales must be positive (pixels per unit {pixels_per_unit}, tile size {tile_size})"
            ),
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use plateau_defence_core::{GridGeometry, TileSnapshot};

    fn rig() -> CameraRig {
        CameraRig::new(Vec2::new(800.0, 600.0), 4.0, 6.0).expect("valid camera")
    }

    fn terrain() -> TerrainView {
        let geometry = GridGeometry::new(4, 6.0);
        let tiles = (0..4)
            .flat_map(|y| (0..4).map(move |x| GridCoord::new(x, y)))
            .map(|coord| TileSnapshot {
                coord,
                kind: TileKind::Plateau,
                height: 6.5,
                walkable: true,
                occupied: None,
            })
            .collect();
        TerrainView::new(geometry, 1.2, tiles, Vec::new(), GridCoord::new(2, 2))
    }

    #[test]
    fn camera_creation_rejects_degenerate_viewport_without_panicking() {
        let error = CameraRig::new(Vec2::new(0.0, 600.0), 4.0, 6.0)
            .expect_err("zero width must be rejected");
        assert!(matches!(error, RenderingError::InvalidViewport { .. }));
        assert!(CameraRig::new(Vec2::new(800.0, 600.0), 0.0, 6.0).is_err());
    }

    #[test]
    fn zoom_is_clamped_to_range() {
        let mut camera = rig();
        for _ in 0..20 {
            camera.zoom_in();
        }
        assert_eq!(camera.zoom(), CameraRig::MAX_ZOOM);
        for _ in 0..40 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom(), CameraRig::MIN_ZOOM);
    }

    #[test]
    fn panning_moves_along_isometric_axes() {
        let mut camera = rig();
        camera.pan(PanDirection::Right);
        let step = CameraRig::PAN_TILES * 6.0;
        assert!((camera.focus() - CameraRig::SCREEN_RIGHT * step).length() < 1e-4);
        camera.pan(PanDirection::Left);
        assert!(camera.focus().length() < 1e-4);
        camera.pan(PanDirection::Up);
        camera.pan(PanDirection::Down);
        assert!(camera.focus().length() < 1e-4);
    }

    #[test]
    fn unproject_inverts_ground_projection() {
        let mut camera = rig();
        camera.pan(PanDirection::Up);
        camera.zoom_in();
        let point = Vec3::new(-9.0, 0.0, 15.0);
        let screen = camera.project(point);
        let ground = camera.unproject(screen);
        assert!((ground - point.xz()).length() < 1e-3);
    }

    #[test]
    fn picker_maps_viewport_centre_to_focus_tile() {
        let camera = rig();
        let picked = TopDownPicker.pick(&camera, &terrain(), Vec2::new(400.0, 300.0));
        assert_eq!(picked, Some(GridCoord::new(2, 2)));
        let far = TopDownPicker.pick(&camera, &terrain(), Vec2::new(0.0, 0.0));
        assert_eq!(far, None);
    }

    #[test]
    fn health_bars_follow_bands_and_hide_when_depleted() {
        let bar = HealthBar::new(1.0, 5.0).expect("visible bar");
        assert_eq!(bar.status, HealthStatus::Critical);
        assert_eq!(bar.color, Color::from_hex(0xff4c4c));
        assert!((bar.ratio - 0.2).abs() < 1e-6);
        assert_eq!(HealthBar::new(0.0, 5.0), None);
        assert_eq!(
            HealthBar::new(12.0, 5.0).map(|bar| bar.ratio),
            Some(1.0),
            "overheal is clamped"
        );
    }

    #[test]
    fn lighten_moves_channels_toward_white() {
        let color = Color::new(0.0, 0.5, 1.0, 0.7).lighten(0.5);
        assert_eq!(color, Color::new(0.5, 0.75, 1.0, 0.7));
    }
}
