//! Prop maps: `.tmx` maps whose object layers place tileset tiles as props.

use std::path::PathBuf;

use bevy::math::{Rect, UVec2, Vec2};

use crate::properties::{Properties, PropertyValue};
use crate::tileset::{TileDefinition, TilesetDefinition};

/// A tileset as referenced from a map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapTileset {
    /// First GID of this tileset in the map, derived the way Tiled assigns
    /// them when tilesets are added in order: each starts after the previous
    /// one's tile count, or after its highest id for collections with gaps.
    pub first_gid: u32,
    pub definition: TilesetDefinition,
}

/// One tile object placed on an object layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PropPlacement {
    pub object_id: u32,
    pub name: String,
    /// Slash-separated layer path, group names first (e.g. `Sprite/Props`).
    pub layer: String,
    /// Index into [`PropMap::tilesets`].
    pub tileset_index: usize,
    /// Local tile id within that tileset.
    pub tile_id: u32,
    /// Top-left corner in map pixels, y down.
    pub position: Vec2,
    /// Object size as placed in the editor.
    pub size: Vec2,
    /// Clockwise rotation in degrees around the object's anchor.
    pub rotation: f32,
    /// The object's class (`type` in older Tiled versions), empty if unset.
    pub class: String,
    /// Custom properties of the object, including those inherited from its
    /// template.
    pub properties: Properties,
}

impl PropPlacement {
    /// The `script` file property, as authored.
    pub fn script(&self) -> Option<&str> {
        match self.properties.get("script")? {
            PropertyValue::File(path) => Some(path),
            _ => None,
        }
    }
}

/// All props of a loaded map.
#[derive(Debug, Clone, PartialEq)]
pub struct PropMap {
    pub source: PathBuf,
    /// Map size in tiles.
    pub size: UVec2,
    pub tile_size: UVec2,
    pub tilesets: Vec<MapTileset>,
    /// In layer order, then object order.
    pub placements: Vec<PropPlacement>,
}

impl PropMap {
    /// Tile definition a placement refers to.
    pub fn tile(&self, placement: &PropPlacement) -> Option<&TileDefinition> {
        self.tilesets
            .get(placement.tileset_index)?
            .definition
            .tile(placement.tile_id)
    }

    /// Collision boxes of a placement, moved into map pixels.
    ///
    /// Boxes are not scaled when the object was resized in the editor, and
    /// rotation is ignored, matching how colliders are attached at runtime.
    pub fn collision_boxes(&self, placement: &PropPlacement) -> Vec<Rect> {
        let Some(tile) = self.tile(placement) else {
            return Vec::new();
        };

        tile.collision_boxes
            .iter()
            .map(|rect| {
                let min = placement.position + rect.min().as_vec2();
                let max = placement.position + rect.max().as_vec2();
                Rect::from_corners(min, max)
            })
            .collect()
    }

    /// Placements on a given layer path.
    pub fn placements_on<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a PropPlacement> {
        self.placements.iter().filter(move |p| p.layer == layer)
    }

    /// Map size in pixels.
    pub fn pixel_size(&self) -> UVec2 {
        self.size * self.tile_size
    }
}
