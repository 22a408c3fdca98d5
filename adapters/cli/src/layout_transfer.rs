//! Clipboard-friendly encoding of a tower layout.
//!
//! The code is a single line of the form `track:v1:<cols>x<rows>:<payload>`
//! where the payload is base64-encoded JSON. It restores the grid
//! configuration and every placed tower, so a layout can be shared and
//! replayed on another machine.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use track_defence_core::{CellCoord, UpgradeLevel};
use track_defence_world::{query, World};

const LAYOUT_DOMAIN: &str = "track";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "track:v1";

/// Snapshot of the grid configuration and the towers placed on it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LayoutSnapshot {
    /// Number of cell columns in the grid.
    pub(crate) columns: u32,
    /// Number of cell rows in the grid.
    pub(crate) rows: u32,
    /// Track segment count used to generate the level.
    pub(crate) segments: u32,
    /// Towers composing the layout.
    pub(crate) towers: Vec<LayoutTower>,
}

/// Tower description captured within a layout snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutTower {
    /// Cell anchoring the tower.
    pub(crate) origin: CellCoord,
    /// Upgrade level the tower reached.
    pub(crate) level: UpgradeLevel,
    /// Targeting range including any purchased boosts.
    pub(crate) range: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableLayout {
    segments: u32,
    towers: Vec<LayoutTower>,
}

impl LayoutSnapshot {
    /// Captures the current world state into a layout snapshot.
    pub(crate) fn from_world(world: &World, segments: u32) -> Self {
        let grid = query::grid(world);
        let towers = query::tower_view(world)
            .iter()
            .map(|snapshot| LayoutTower {
                origin: snapshot.origin,
                level: snapshot.level,
                range: snapshot.range,
            })
            .collect();
        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            segments,
            towers,
        }
    }

    /// Encodes the snapshot into a single-line shareable string.
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableLayout {
            segments: self.segments,
            towers: self.towers.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("layout snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{LAYOUT_HEADER}:{}x{}:{encoded}", self.columns, self.rows)
    }

    /// Decodes a snapshot from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(4, ':');
        let domain = parts.next().ok_or(LayoutError::MissingSegment("prefix"))?;
        let version = parts.next().ok_or(LayoutError::MissingSegment("version"))?;
        let dimensions = parts
            .next()
            .ok_or(LayoutError::MissingSegment("dimensions"))?;
        let payload = parts.next().ok_or(LayoutError::MissingSegment("payload"))?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutError::UnsupportedVersion(version.to_owned()));
        }

        let (columns, rows) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
        let decoded: SerializableLayout = serde_json::from_slice(&bytes)?;

        Ok(Self {
            columns,
            rows,
            segments: decoded.segments,
            towers: decoded.towers,
        })
    }
}

/// Errors that can occur while decoding layout codes.
#[derive(Debug, Error)]
pub(crate) enum LayoutError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout code was empty")]
    EmptyPayload,
    /// A mandatory segment was missing from the encoded layout.
    #[error("layout code is missing the {0} segment")]
    MissingSegment(&'static str),
    /// The encoded layout used an unexpected prefix.
    #[error("layout prefix `{0}` is not supported")]
    InvalidPrefix(String),
    /// The encoded layout used an unsupported version identifier.
    #[error("layout version `{0}` is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions `{0}`")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload")]
    InvalidPayload(#[from] serde_json::Error),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutError> {
    let (columns, rows) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    let columns = columns
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;
    let rows = rows
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutError::InvalidDimensions(dimensions.to_owned()))?;

    if columns == 0 || rows == 0 {
        return Err(LayoutError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((columns, rows))
}
