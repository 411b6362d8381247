#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure build-mode system that turns tile taps into placement, demolition or
//! hero movement commands.

use plateau_defence_core::{Command, Event, GridCoord, StructureId, StructureKind};

/// Declarative placement preview describing a potential construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of structure proposed for placement.
    pub kind: StructureKind,
    /// Tile that would receive the structure.
    pub tile: GridCoord,
    /// Indicates whether the tile currently accepts a structure.
    pub placeable: bool,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: StructureKind, tile: GridCoord, placeable: bool) -> Self {
        Self {
            kind,
            tile,
            placeable,
        }
    }
}

/// Input snapshot distilled from adapter-provided pointer data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Tile the player tapped on this frame, if any.
    pub tap: Option<GridCoord>,
    /// Indicates whether the player requested demolition of the tapped tile.
    pub remove_action: bool,
}

impl BuilderInput {
    /// Creates an input describing a plain tap.
    #[must_use]
    pub const fn tap(tile: GridCoord) -> Self {
        Self {
            tap: Some(tile),
            remove_action: false,
        }
    }

    /// Creates an input describing a demolition request.
    #[must_use]
    pub const fn remove(tile: GridCoord) -> Self {
        Self {
            tap: Some(tile),
            remove_action: true,
        }
    }
}

/// Build-mode system that mirrors the world's pending build selection.
#[derive(Debug, Default, Clone)]
pub struct Builder {
    mode: Option<StructureKind>,
}

impl Builder {
    /// Creates a new builder system with no build mode armed.
    #[must_use]
    pub const fn new() -> Self {
        Self { mode: None }
    }

    /// Build mode most recently announced by the world.
    #[must_use]
    pub const fn mode(&self) -> Option<StructureKind> {
        self.mode
    }

    /// Describes what a tap on `tile` would build, if a mode is armed.
    ///
    /// `site_open` should mirror the world's placement checks other than gold.
    #[must_use]
    pub fn preview<F>(&self, tile: GridCoord, mut site_open: F) -> Option<PlacementPreview>
    where
        F: FnMut(GridCoord) -> bool,
    {
        self.mode
            .map(|kind| PlacementPreview::new(kind, tile, site_open(tile)))
    }

    /// Consumes world events and pointer input to emit commands.
    ///
    /// A tap on an open site while a mode is armed requests construction; the
    /// world still rejects it when gold is short. Any other tap walks the hero
    /// to the tile. A remove action in build mode demolishes the structure
    /// returned by `structure_at`.
    pub fn handle<F, G>(
        &mut self,
        events: &[Event],
        input: BuilderInput,
        site_open: F,
        mut structure_at: G,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(GridCoord) -> bool,
        G: FnMut(GridCoord) -> Option<StructureId>,
    {
        for event in events {
            if let Event::BuildModeChanged { mode } = event {
                self.mode = *mode;
            }
        }

        let Some(tile) = input.tap else {
            return;
        };

        if input.remove_action {
            if self.mode.is_some() {
                if let Some(structure) = structure_at(tile) {
                    out.push(Command::DemolishStructure { structure });
                }
            }
            return;
        }

        match self.preview(tile, site_open) {
            Some(preview) if preview.placeable => out.push(Command::PlaceStructure {
                kind: preview.kind,
                tile,
            }),
            _ => out.push(Command::SetHeroTarget { tile }),
        }
    }
}
