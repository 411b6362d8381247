//! Tunable numbers that govern the simulation.
//!
//! Every constant the world and systems consult lives here so adapters can
//! load an alternative ruleset from disk. [`Rules::default`] reproduces the
//! stock game.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{GridCoord, GridGeometry, StructureKind, TileKind};

/// Complete ruleset consumed by the world and the systems.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Terrain dimensions and elevation.
    pub terrain: TerrainRules,
    /// Starting economy and rewards.
    pub economy: EconomyRules,
    /// Tower statistics, costs and upgrade.
    pub tower: TowerRules,
    /// Wall statistics and costs.
    pub wall: WallRules,
    /// Home structure collider.
    pub home: HomeRules,
    /// Monster statistics.
    pub monster: MonsterRules,
    /// Wave scaling formula.
    pub wave: WaveRules,
    /// Player-controlled hero.
    pub hero: HeroRules,
}

impl Rules {
    /// Gold required to construct a structure of the provided kind.
    #[must_use]
    pub fn build_cost(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Tower => self.tower.cost,
            StructureKind::Wall => self.wall.cost,
        }
    }

    /// Gold returned when demolishing a structure of the provided kind.
    #[must_use]
    pub fn demolish_refund(&self, kind: StructureKind) -> u32 {
        match kind {
            StructureKind::Tower => self.tower.refund,
            StructureKind::Wall => self.wall.refund,
        }
    }

    /// Hit points a freshly built structure starts with.
    #[must_use]
    pub fn starting_hit_points(&self, kind: StructureKind) -> f32 {
        match kind {
            StructureKind::Tower => self.tower.hit_points,
            StructureKind::Wall => self.wall.hit_points,
        }
    }

    /// Collision radius of a structure of the provided kind.
    #[must_use]
    pub fn collider_radius(&self, kind: StructureKind) -> f32 {
        match kind {
            StructureKind::Tower => self.tower.collider_radius,
            StructureKind::Wall => self.wall.collider_radius,
        }
    }

    /// Height of a structure's collider centre above its tile surface.
    #[must_use]
    pub fn collider_lift(&self, kind: StructureKind) -> f32 {
        match kind {
            StructureKind::Tower => 0.0,
            StructureKind::Wall => self.wall.height / 2.0,
        }
    }
}

/// Terrain layout parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainRules {
    /// Number of tiles along each edge of the square map.
    pub map_size: u32,
    /// Number of tiles along each edge of the square plateau.
    pub plateau_size: u32,
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// Elevation of decorative ground, also used outside the grid.
    pub ground_height: f32,
    /// Elevation of path tiles.
    pub path_height: f32,
    /// Elevation of the ramp tile.
    pub ramp_height: f32,
    /// Elevation of plateau tiles.
    pub plateau_height: f32,
}

impl TerrainRules {
    /// Largest map edge, in tiles, a ruleset may ask for.
    pub const MAX_MAP_SIZE: u32 = 4096;

    /// Planar mapping derived from the map size and tile size.
    #[must_use]
    pub const fn geometry(&self) -> GridGeometry {
        GridGeometry::new(self.map_size, self.tile_size)
    }

    /// Index of the plateau's central row and column.
    #[must_use]
    pub const fn plateau_center(&self) -> i32 {
        (self.map_size / 2) as i32
    }

    /// Smallest row and column index inside the plateau.
    #[must_use]
    pub const fn plateau_min(&self) -> i32 {
        self.plateau_center() - (self.plateau_size / 2) as i32
    }

    /// Largest row and column index inside the plateau.
    #[must_use]
    pub const fn plateau_max(&self) -> i32 {
        self.plateau_min() + self.plateau_size as i32 - 1
    }

    /// Single tile that connects ground level with the plateau.
    #[must_use]
    pub const fn ramp_tile(&self) -> GridCoord {
        GridCoord::new(self.plateau_center(), self.plateau_min() - 1)
    }

    /// Tile occupied by the home structure.
    #[must_use]
    pub const fn home_tile(&self) -> GridCoord {
        GridCoord::new(self.plateau_center(), self.plateau_center())
    }

    /// Elevation assigned to tiles of the provided kind.
    #[must_use]
    pub const fn height_of(&self, kind: TileKind) -> f32 {
        match kind {
            TileKind::Grass => self.ground_height,
            TileKind::Path => self.path_height,
            TileKind::Ramp => self.ramp_height,
            TileKind::Plateau => self.plateau_height,
        }
    }
}

impl Default for TerrainRules {
    fn default() -> Self {
        Self {
            map_size: 24,
            plateau_size: 8,
            tile_size: 6.0,
            ground_height: 1.2,
            path_height: 1.6,
            ramp_height: 3.5,
            plateau_height: 6.5,
        }
    }
}

/// Starting resources and flat rewards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRules {
    /// Gold available when a session starts.
    pub starting_gold: u32,
    /// Home health when a session starts.
    pub starting_health: u32,
    /// Wave number of the first wave.
    pub starting_wave: u32,
    /// Gold granted for each killed monster.
    pub kill_reward: u32,
    /// Home health removed by each leaked monster.
    pub leak_damage: u32,
}

impl Default for EconomyRules {
    fn default() -> Self {
        Self {
            starting_gold: 500,
            starting_health: 100,
            starting_wave: 1,
            kill_reward: 1,
            leak_damage: 1,
        }
    }
}

/// Tower statistics for both upgrade levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerRules {
    /// Construction cost.
    pub cost: u32,
    /// Gold returned on demolition.
    pub refund: u32,
    /// Starting and maximum hit points at level one.
    pub hit_points: f32,
    /// Targeting radius measured from the anchor point.
    pub range: f32,
    /// Damage delivered by each projectile at level one.
    pub damage: f32,
    /// Seconds between shots at level one.
    pub fire_interval: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Height of the anchor point above the tile surface.
    pub anchor_lift: f32,
    /// Height above the anchor where projectiles appear.
    pub muzzle_lift: f32,
    /// Collision radius used by the blocking resolver.
    pub collider_radius: f32,
    /// Parameters applied when upgrading to level two.
    pub upgrade: TowerUpgradeRules,
}

impl Default for TowerRules {
    fn default() -> Self {
        Self {
            cost: 100,
            refund: 50,
            hit_points: 14.0,
            range: 30.0,
            damage: 5.0,
            fire_interval: 0.6,
            projectile_speed: 42.0,
            anchor_lift: 7.5,
            muzzle_lift: 0.5,
            collider_radius: 8.4,
            upgrade: TowerUpgradeRules::default(),
        }
    }
}

/// Tower statistics after the single available upgrade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerUpgradeRules {
    /// Gold required to upgrade.
    pub cost: u32,
    /// Highest level a tower can reach.
    pub max_level: u8,
    /// Projectile damage after upgrading.
    pub damage: f32,
    /// Seconds between shots after upgrading.
    pub fire_interval: f32,
    /// Maximum hit points after upgrading.
    pub max_hit_points: f32,
    /// Hit points restored by the upgrade, capped at the new maximum.
    pub heal: f32,
}

impl Default for TowerUpgradeRules {
    fn default() -> Self {
        Self {
            cost: 150,
            max_level: 2,
            damage: 8.0,
            fire_interval: 0.45,
            max_hit_points: 20.0,
            heal: 6.0,
        }
    }
}

/// Wall statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRules {
    /// Construction cost.
    pub cost: u32,
    /// Gold returned on demolition.
    pub refund: u32,
    /// Starting and maximum hit points.
    pub hit_points: f32,
    /// Collision radius used by the blocking resolver.
    pub collider_radius: f32,
    /// Height of the wall block; its collider sits at half this height.
    pub height: f32,
}

impl Default for WallRules {
    fn default() -> Self {
        Self {
            cost: 50,
            refund: 25,
            hit_points: 10.0,
            collider_radius: 7.2,
            height: 4.8,
        }
    }
}

/// Home structure parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeRules {
    /// Collision radius; monsters touching it count as leaked.
    pub collider_radius: f32,
}

impl Default for HomeRules {
    fn default() -> Self {
        Self {
            collider_radius: 8.4,
        }
    }
}

/// Monster statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterRules {
    /// Health of a freshly spawned monster.
    pub health: f32,
    /// Speed at wave zero, in world units per second.
    pub base_speed: f32,
    /// Speed added per wave number.
    pub speed_per_wave: f32,
    /// Structure damage per second while blocked.
    pub attack: f32,
    /// Collision radius.
    pub radius: f32,
    /// Height of waypoints above the tile surface.
    pub waypoint_lift: f32,
    /// Number of tiles before the first path tile where monsters appear.
    pub spawn_backoff: i32,
    /// Lowest row a spawn position may use.
    pub spawn_row_floor: i32,
    /// Height above the monster that projectiles aim for.
    pub aim_lift: f32,
}

impl MonsterRules {
    /// Movement speed for monsters spawned during the provided wave.
    #[must_use]
    pub fn speed_for_wave(&self, wave: u32) -> f32 {
        self.base_speed + wave as f32 * self.speed_per_wave
    }
}

impl Default for MonsterRules {
    fn default() -> Self {
        Self {
            health: 5.0,
            base_speed: 6.0,
            speed_per_wave: 0.4,
            attack: 1.0,
            radius: 2.4,
            waypoint_lift: 0.6,
            spawn_backoff: 3,
            spawn_row_floor: -4,
            aim_lift: 1.8,
        }
    }
}

/// Wave scaling formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveRules {
    /// Monsters in every wave before scaling.
    pub base_quota: u32,
    /// Monsters added per wave number.
    pub quota_per_wave: u32,
    /// Spawn interval before scaling, in milliseconds.
    pub base_interval_ms: u64,
    /// Milliseconds removed from the interval per wave number.
    pub interval_step_ms: u64,
    /// Shortest permitted spawn interval, in milliseconds.
    pub min_interval_ms: u64,
    /// Delay between a cleared wave and the next one, in milliseconds.
    pub next_wave_delay_ms: u64,
    /// Gold granted when a new wave begins.
    pub wave_bonus: u32,
}

impl WaveRules {
    /// Number of monsters emitted during the provided wave.
    #[must_use]
    pub const fn quota(&self, wave: u32) -> u32 {
        self.base_quota + wave * self.quota_per_wave
    }

    /// Time between consecutive spawns during the provided wave.
    #[must_use]
    pub fn spawn_interval(&self, wave: u32) -> Duration {
        let reduction = u64::from(wave).saturating_mul(self.interval_step_ms);
        let millis = self
            .base_interval_ms
            .saturating_sub(reduction)
            .max(self.min_interval_ms);
        Duration::from_millis(millis)
    }

    /// Delay applied before the next wave begins.
    #[must_use]
    pub const fn next_wave_delay(&self) -> Duration {
        Duration::from_millis(self.next_wave_delay_ms)
    }
}

impl Default for WaveRules {
    fn default() -> Self {
        Self {
            base_quota: 8,
            quota_per_wave: 3,
            base_interval_ms: 1700,
            interval_step_ms: 120,
            min_interval_ms: 450,
            next_wave_delay_ms: 4500,
            wave_bonus: 160,
        }
    }
}

/// Player-controlled hero parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroRules {
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Collision radius.
    pub radius: f32,
    /// Offset of the starting tile from the plateau centre, in rows.
    pub start_row_offset: i32,
    /// Distance under which a click-to-move target counts as reached.
    pub arrival_epsilon: f32,
}

impl Default for HeroRules {
    fn default() -> Self {
        Self {
            speed: 12.0,
            radius: 1.4,
            start_row_offset: 3,
            arrival_epsilon: 0.05,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_one_matches_stock_formula() {
        let rules = Rules::default();
        assert_eq!(rules.wave.quota(1), 11);
        assert_eq!(rules.wave.spawn_interval(1), Duration::from_millis(1580));
        assert!((rules.monster.speed_for_wave(1) - 6.4).abs() < 1e-6);
    }

    #[test]
    fn spawn_interval_never_drops_below_floor() {
        let rules = WaveRules::default();
        assert_eq!(rules.spawn_interval(11), Duration::from_millis(450));
        assert_eq!(rules.spawn_interval(400), Duration::from_millis(450));
    }

    #[test]
    fn plateau_geometry_matches_stock_layout() {
        let terrain = TerrainRules::default();
        assert_eq!(terrain.plateau_center(), 12);
        assert_eq!(terrain.plateau_min(), 8);
        assert_eq!(terrain.plateau_max(), 15);
        assert_eq!(terrain.ramp_tile(), GridCoord::new(12, 7));
        assert_eq!(terrain.home_tile(), GridCoord::new(12, 12));
    }

    #[test]
    fn partial_rules_fill_missing_fields_with_defaults() {
        let parsed: Rules = serde_json::from_str(r#"{"tower":{"cost":80}}"#).expect("parse");
        assert_eq!(parsed.tower.cost, 80);
        assert_eq!(parsed.tower.refund, 50);
        assert_eq!(parsed.wall, WallRules::default());
    }
}
