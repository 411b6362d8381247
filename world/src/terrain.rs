//! Static terrain layout and dynamic tile occupancy.

use glam::Vec3;
use plateau_defence_core::{
    GridCoord, GridGeometry, MonsterRules, StructureKind, TerrainRules, TerrainView, TileKind,
    TileSnapshot,
};

#[derive(Clone, Copy, Debug)]
struct Tile {
    kind: TileKind,
    height: f32,
    walkable: bool,
    occupied: Option<StructureKind>,
}

/// Square tile grid with the fixed invasion path.
#[derive(Clone, Debug)]
pub(crate) struct Terrain {
    geometry: GridGeometry,
    ground_height: f32,
    tiles: Vec<Tile>,
    path: Vec<GridCoord>,
    home: GridCoord,
}

impl Terrain {
    /// Partitions the grid into plateau, ramp, path and grass.
    pub(crate) fn build(rules: &TerrainRules) -> Self {
        let geometry = rules.geometry();
        let path = invasion_path(rules);
        let ramp = rules.ramp_tile();
        let size = i32::try_from(rules.map_size).unwrap_or(0);
        let edge = usize::try_from(size).unwrap_or(0);

        let mut tiles = Vec::with_capacity(edge.saturating_mul(edge));
        for y in 0..size {
            for x in 0..size {
                let coord = GridCoord::new(x, y);
                let kind = if coord == ramp {
                    TileKind::Ramp
                } else if inside_plateau(rules, coord) {
                    TileKind::Plateau
                } else if path.contains(&coord) {
                    TileKind::Path
                } else {
                    TileKind::Grass
                };
                tiles.push(Tile {
                    kind,
                    height: rules.height_of(kind),
                    walkable: kind.is_walkable(),
                    occupied: None,
                });
            }
        }

        Self {
            geometry,
            ground_height: rules.ground_height,
            tiles,
            path,
            home: rules.home_tile(),
        }
    }

    pub(crate) fn path(&self) -> &[GridCoord] {
        &self.path
    }

    pub(crate) fn home(&self) -> GridCoord {
        self.home
    }

    fn tile(&self, coord: GridCoord) -> Option<&Tile> {
        self.geometry
            .index(coord)
            .and_then(|index| self.tiles.get(index))
    }

    pub(crate) fn kind(&self, coord: GridCoord) -> Option<TileKind> {
        self.tile(coord).map(|tile| tile.kind)
    }

    pub(crate) fn occupant(&self, coord: GridCoord) -> Option<StructureKind> {
        self.tile(coord).and_then(|tile| tile.occupied)
    }

    /// Tile exists, its kind permits walking and nothing stands on it.
    pub(crate) fn is_walkable(&self, coord: GridCoord) -> bool {
        self.tile(coord).is_some_and(|tile| tile.walkable)
    }

    /// Updates occupancy and walkability together; missing tiles are ignored.
    pub(crate) fn set_occupied(&mut self, coord: GridCoord, occupant: Option<StructureKind>) {
        let Some(index) = self.geometry.index(coord) else {
            return;
        };
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.occupied = occupant;
            tile.walkable = occupant.is_none() && tile.kind.is_walkable();
        }
    }

    /// World position of the tile surface raised by `vertical_offset`.
    pub(crate) fn grid_to_world(&self, coord: GridCoord, vertical_offset: f32) -> Vec3 {
        let planar = self.geometry.tile_center(coord);
        let height = self.tile(coord).map_or(self.ground_height, |tile| tile.height);
        Vec3::new(planar.x, height + vertical_offset, planar.y)
    }

    /// Tile containing the world position, if it lies inside the grid.
    pub(crate) fn world_to_grid(&self, position: Vec3) -> Option<GridCoord> {
        let coord = self.geometry.locate(position);
        self.geometry.contains(coord).then_some(coord)
    }

    /// World position where monsters enter, a few tiles before the path head.
    pub(crate) fn spawn_position(&self, rules: &MonsterRules) -> Option<Vec3> {
        let head = self.path.first()?;
        let row = (head.y() - rules.spawn_backoff).max(rules.spawn_row_floor);
        Some(self.grid_to_world(GridCoord::new(head.x(), row), rules.waypoint_lift))
    }

    pub(crate) fn view(&self) -> TerrainView {
        let size = i32::try_from(self.geometry.size()).unwrap_or(0);
        let snapshots = (0..size)
            .flat_map(|y| (0..size).map(move |x| GridCoord::new(x, y)))
            .zip(self.tiles.iter())
            .map(|(coord, tile)| TileSnapshot {
                coord,
                kind: tile.kind,
                height: tile.height,
                walkable: tile.walkable,
                occupied: tile.occupied,
            })
            .collect();
        TerrainView::new(
            self.geometry,
            self.ground_height,
            snapshots,
            self.path.clone(),
            self.home,
        )
    }
}

fn inside_plateau(rules: &TerrainRules, coord: GridCoord) -> bool {
    let range = rules.plateau_min()..=rules.plateau_max();
    range.contains(&coord.x()) && range.contains(&coord.y())
}

/// Straight column from the map edge, over the ramp, to the home tile.
fn invasion_path(rules: &TerrainRules) -> Vec<GridCoord> {
    let column = rules.plateau_center();
    (0..=rules.home_tile().y())
        .map(|row| GridCoord::new(column, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain() -> Terrain {
        Terrain::build(&TerrainRules::default())
    }

    #[test]
    fn stock_layout_partitions_tiles() {
        let terrain = terrain();
        assert_eq!(terrain.kind(GridCoord::new(12, 0)), Some(TileKind::Path));
        assert_eq!(terrain.kind(GridCoord::new(12, 6)), Some(TileKind::Path));
        assert_eq!(terrain.kind(GridCoord::new(12, 7)), Some(TileKind::Ramp));
        assert_eq!(terrain.kind(GridCoord::new(8, 8)), Some(TileKind::Plateau));
        assert_eq!(terrain.kind(GridCoord::new(15, 15)), Some(TileKind::Plateau));
        assert_eq!(terrain.kind(GridCoord::new(16, 15)), Some(TileKind::Grass));
        assert_eq!(terrain.kind(GridCoord::new(11, 3)), Some(TileKind::Grass));
        assert_eq!(terrain.kind(GridCoord::new(24, 0)), None);
    }

    #[test]
    fn path_runs_from_edge_to_home() {
        let terrain = terrain();
        let path = terrain.path();
        assert_eq!(path.len(), 13);
        assert_eq!(path.first(), Some(&GridCoord::new(12, 0)));
        assert_eq!(path.last(), Some(&terrain.home()));
        assert!(path.windows(2).all(|pair| pair[0].is_adjacent(pair[1])));
    }

    #[test]
    fn grid_to_world_includes_tile_height() {
        let terrain = terrain();
        let plateau = terrain.grid_to_world(GridCoord::new(12, 12), 0.0);
        assert_eq!(plateau, Vec3::new(3.0, 6.5, 3.0));
        let outside = terrain.grid_to_world(GridCoord::new(12, -3), 0.6);
        assert!((outside.y - 1.8).abs() < 1e-6);
        assert_eq!(outside.z, -87.0);
    }

    #[test]
    fn occupancy_and_walkability_change_together() {
        let mut terrain = terrain();
        let tile = GridCoord::new(9, 9);
        assert!(terrain.is_walkable(tile));

        terrain.set_occupied(tile, Some(StructureKind::Wall));
        assert!(!terrain.is_walkable(tile));
        assert_eq!(terrain.occupant(tile), Some(StructureKind::Wall));

        terrain.set_occupied(tile, None);
        assert!(terrain.is_walkable(tile));
        assert_eq!(terrain.occupant(tile), None);
    }

    #[test]
    fn clearing_grass_does_not_make_it_walkable() {
        let mut terrain = terrain();
        let grass = GridCoord::new(0, 0);
        terrain.set_occupied(grass, None);
        assert!(!terrain.is_walkable(grass));
        terrain.set_occupied(GridCoord::new(-1, 5), Some(StructureKind::Tower));
    }

    #[test]
    fn spawn_sits_beyond_the_map_edge() {
        let terrain = terrain();
        let spawn = terrain
            .spawn_position(&MonsterRules::default())
            .expect("path exists");
        assert_eq!(spawn, terrain.grid_to_world(GridCoord::new(12, -3), 0.6));
        assert_eq!(terrain.world_to_grid(spawn), None);
    }
}
