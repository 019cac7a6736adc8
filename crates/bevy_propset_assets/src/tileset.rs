//! In-memory tileset definitions.
//!
//! A [`TilesetDefinition`] is built once from a `.tsx` file and treated as
//! immutable afterwards. Coordinates follow Tiled: origin at the top-left of
//! the tile image, y pointing down.

use std::path::{Path, PathBuf};

use bevy::math::{IVec2, UVec2};
use normalize_path::NormalizePath;

use crate::properties::Properties;

/// Axis-aligned rectangle in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisAlignedRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl AxisAlignedRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Exclusive bottom-right corner.
    pub fn max(&self) -> IVec2 {
        IVec2::new(
            self.x.saturating_add_unsigned(self.width),
            self.y.saturating_add_unsigned(self.height),
        )
    }

    /// Whether the rectangle lies within `[0, bounds.x] x [0, bounds.y]`.
    pub fn fits_within(&self, bounds: UVec2) -> bool {
        let max = self.max();
        self.x >= 0
            && self.y >= 0
            && i64::from(max.x) <= i64::from(bounds.x)
            && i64::from(max.y) <= i64::from(bounds.y)
    }

    /// The same rectangle moved by `offset`.
    pub fn translated(&self, offset: IVec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }
}

/// Image reference with its declared size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    /// Path as authored in the `.tsx`, relative to the tileset file.
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl TileImage {
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }
}

/// One tile of a tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDefinition {
    /// Local tile id (0-based, not a GID).
    pub id: u32,
    pub image: Option<TileImage>,
    /// Solid regions, in authored order. May be empty.
    pub collision_boxes: Vec<AxisAlignedRect>,
    pub properties: Properties,
}

impl TileDefinition {
    pub fn has_collision(&self) -> bool {
        !self.collision_boxes.is_empty()
    }
}

/// How tile graphics are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TilesetKind {
    /// Every tile names its own image file.
    Collection,
    /// All tiles are cut from one sprite sheet.
    Atlas(TileImage),
}

/// The `<grid>` element of a tileset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub orientation: String,
    pub width: u32,
    pub height: u32,
}

/// A fully loaded `.tsx` tileset.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetDefinition {
    /// Path of the `.tsx` this was loaded from. Image sources resolve against
    /// its parent directory.
    pub source: PathBuf,
    pub name: String,
    /// Format version (`version` attribute).
    pub format_version: Option<String>,
    /// Editor version (`tiledversion` attribute).
    pub tiled_version: Option<String>,
    pub tile_size: UVec2,
    pub tile_count: u32,
    /// `0` for image-collection tilesets.
    pub columns: u32,
    pub spacing: u32,
    pub margin: u32,
    pub grid: Option<TileGrid>,
    pub kind: TilesetKind,
    pub properties: Properties,
    /// Sorted by id.
    pub tiles: Vec<TileDefinition>,
}

impl TilesetDefinition {
    #[inline]
    pub fn is_image_collection(&self) -> bool {
        matches!(self.kind, TilesetKind::Collection)
    }

    /// Look up a tile by local id.
    pub fn tile(&self, id: u32) -> Option<&TileDefinition> {
        self.tiles
            .binary_search_by_key(&id, |tile| tile.id)
            .ok()
            .map(|index| &self.tiles[index])
    }

    /// The image a tile is drawn from: its own image for collections, the
    /// sheet for atlases.
    pub fn tile_image(&self, id: u32) -> Option<&TileImage> {
        match &self.kind {
            TilesetKind::Atlas(sheet) => Some(sheet),
            TilesetKind::Collection => self.tile(id)?.image.as_ref(),
        }
    }

    /// Pixel bounds collision boxes of a tile must stay within.
    ///
    /// For collections this is the tile's own image, for atlases the tile size.
    pub fn tile_bounds(&self, id: u32) -> Option<UVec2> {
        match &self.kind {
            TilesetKind::Atlas(_) => Some(self.tile_size),
            TilesetKind::Collection => self.tile(id)?.image.as_ref().map(TileImage::size),
        }
    }

    /// Directory image sources are relative to.
    pub fn base_dir(&self) -> &Path {
        self.source.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Filesystem path of an authored image source, with `..` resolved.
    pub fn resolve_image_path(&self, image: &TileImage) -> PathBuf {
        self.base_dir().join(&image.source).normalize()
    }

    /// Grid dimensions (columns, rows) of an atlas; zero for collections.
    pub fn grid_size(&self) -> UVec2 {
        if self.columns > 0 {
            UVec2::new(self.columns, self.tile_count.div_ceil(self.columns))
        } else {
            UVec2::ZERO
        }
    }

    pub fn collision_tiles(&self) -> impl Iterator<Item = &TileDefinition> {
        self.tiles.iter().filter(|tile| tile.has_collision())
    }
}
