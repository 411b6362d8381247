use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use plateau_defence_core::{GridCoord, PlacementError, StructureKind, UpgradeError};
use plateau_defence_session::Session;
use serde::{Deserialize, Serialize};

const LAYOUT_DOMAIN: &str = "plateau";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "plateau:v1";
/// Delimiter used to separate the prefix, map size and payload.
const FIELD_DELIMITER: char = ':';

/// Structures standing on the plateau, in a form that can be pasted into `--layout`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct PlateauLayout {
    /// Number of tiles along each edge of the map the layout was captured on.
    pub(crate) map_size: u32,
    /// Structures in identifier order.
    pub(crate) structures: Vec<LayoutStructure>,
}

/// One structure captured within a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutStructure {
    /// Tower or wall.
    pub(crate) kind: StructureKind,
    /// Tile holding the structure.
    pub(crate) tile: GridCoord,
    /// Upgrade level; walls always report 1.
    pub(crate) level: u8,
}

impl PlateauLayout {
    /// Captures the structures of a running session.
    #[must_use]
    pub(crate) fn capture(session: &Session) -> Self {
        let structures = session
            .structures()
            .iter()
            .map(|structure| LayoutStructure {
                kind: structure.kind,
                tile: structure.tile,
                level: structure.tower.map_or(1, |tower| tower.level),
            })
            .collect();
        Self {
            map_size: session.rules().terrain.map_size,
            structures,
        }
    }

    /// Encodes the layout into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, LayoutError> {
        let json = serde_json::to_vec(&self.structures).map_err(LayoutError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{LAYOUT_HEADER}:{}:{encoded}", self.map_size))
    }

    /// Decodes a layout from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutError::MissingVersion)?;
        let map_size = parts.next().ok_or(LayoutError::MissingMapSize)?;
        let payload = parts.next().ok_or(LayoutError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let map_size = map_size
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| LayoutError::InvalidMapSize(map_size.to_owned()))?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutError::InvalidEncoding)?;
        let structures = serde_json::from_slice(&bytes).map_err(LayoutError::InvalidPayload)?;

        Ok(Self {
            map_size,
            structures,
        })
    }

    /// Rebuilds the layout in `session`, paying for every structure and upgrade.
    ///
    /// Leaves the session without an armed build mode.
    pub(crate) fn restore(&self, session: &mut Session) -> Result<usize, LayoutError> {
        let map_size = session.rules().terrain.map_size;
        if self.map_size != map_size {
            return Err(LayoutError::MapSizeMismatch {
                layout: self.map_size,
                session: map_size,
            });
        }

        for structure in &self.structures {
            if session.economy().build_mode != Some(structure.kind) {
                let _ = session.request_build(structure.kind);
            }
            let id = session
                .request_build_at(structure.tile)
                .map_err(|reason| LayoutError::Placement(structure.tile, reason))?;
            for _ in 1..structure.level {
                let _ = session
                    .request_upgrade(id)
                    .map_err(|reason| LayoutError::Upgrade(structure.tile, reason))?;
            }
        }
        session.clear_build_mode();
        Ok(self.structures.len())
    }
}

/// Errors that can occur while decoding or restoring layouts.
#[derive(Debug)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The map size segment was missing.
    MissingMapSize,
    /// The payload segment was missing.
    MissingPayload,
    /// The prefix segment named another game.
    InvalidPrefix(String),
    /// The version identifier is not supported.
    UnsupportedVersion(String),
    /// The map size could not be parsed.
    InvalidMapSize(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
    /// The layout was captured on a map of another size.
    MapSizeMismatch {
        /// Map size stored in the layout.
        layout: u32,
        /// Map size of the receiving session.
        session: u32,
    },
    /// The session refused to build a structure.
    Placement(GridCoord, PlacementError),
    /// The session refused to upgrade a tower.
    Upgrade(GridCoord, UpgradeError),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingMapSize => write!(f, "layout string is missing the map size"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidMapSize(size) => write!(f, "could not parse map size '{size}'"),
            Self::InvalidEncoding(error) => write!(f, "could not decode layout payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not parse layout payload: {error}"),
            Self::MapSizeMismatch { layout, session } => write!(
                f,
                "layout was captured on a {layout}x{layout} map but the session uses {session}x{session}"
            ),
            Self::Placement(tile, reason) => {
                write!(f, "could not rebuild ({}, {}): {reason}", tile.x(), tile.y())
            }
            Self::Upgrade(tile, reason) => {
                write!(f, "could not upgrade ({}, {}): {reason}", tile.x(), tile.y())
            }
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            Self::Placement(_, reason) => Some(reason),
            Self::Upgrade(_, reason) => Some(reason),
            _ => None,
        }
    }
}
