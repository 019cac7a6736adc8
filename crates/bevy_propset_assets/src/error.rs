use std::path::PathBuf;

use bevy::math::UVec2;
use thiserror::Error;

use crate::tileset::AxisAlignedRect;

/// Errors produced while loading or saving a tileset.
#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML (truncated, bad nesting, etc.).
    #[error("Malformed tileset XML in {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: xml::reader::Error,
    },

    /// The document is well-formed but is not a `.tsx` tileset.
    #[error("Unexpected tileset layout in {path:?}: {reason}")]
    Layout { path: PathBuf, reason: String },

    #[error("Failed to load tileset: {0}")]
    Tiled(#[from] tiled::Error),

    #[error("Failed to write tileset: {0}")]
    Write(#[from] xml::writer::Error),

    #[error("Tileset {path:?} failed validation: {}", format_issues(.issues))]
    Invalid {
        path: PathBuf,
        issues: Vec<ValidationIssue>,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl TilesetError {
    /// Whether the failure came from reading the document itself rather than
    /// from I/O or validation.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TilesetError::Malformed { .. } | TilesetError::Layout { .. } | TilesetError::Tiled(_)
        )
    }
}

/// A single broken rule found by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("tile id {0} is declared more than once")]
    DuplicateTileId(u32),

    #[error("tile id {id} is outside the tileset (tilecount = {tile_count})")]
    TileIdOutOfRange { id: u32, tile_count: u32 },

    /// A gap in the ids, `first..=last`.
    #[error("tile ids {first}..={last} are missing; ids must be contiguous")]
    MissingTileIds { first: u32, last: u32 },

    #[error("tile {0} has no image in an image-collection tileset")]
    MissingTileImage(u32),

    #[error("tile {tile_id}: collision box {rect:?} exceeds image bounds {bounds}")]
    CollisionOutOfBounds {
        tile_id: u32,
        rect: AxisAlignedRect,
        bounds: UVec2,
    },

    #[error("tile {tile_id}: image {path:?} could not be opened: {reason}")]
    UnreadableImage {
        tile_id: u32,
        path: PathBuf,
        reason: String,
    },

    #[error("tile {tile_id}: image {path:?} is {actual}, declared {declared}")]
    ImageSizeMismatch {
        tile_id: u32,
        path: PathBuf,
        declared: UVec2,
        actual: UVec2,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors produced while loading a prop map (`.tmx`).
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to load map: {0}")]
    Tiled(#[from] tiled::Error),

    #[error("Tileset {index} of the map is unusable: {source}")]
    Tileset {
        index: usize,
        #[source]
        source: TilesetError,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
