use bevy::{platform::collections::HashMap, prelude::*};

use crate::tileset::{TileDefinition, TilesetDefinition};

/// Bevy asset wrapper for prop tilesets (.tsx files)
///
/// Supports both texture atlas tilesets (single spritesheet) and image collection
/// tilesets (individual images per tile).
#[derive(TypePath, Asset, Debug)]
pub struct PropTilesetAsset {
    /// Parsed (and, unless disabled in the loader settings, validated) tileset
    pub definition: TilesetDefinition,

    /// For texture atlas tilesets: single spritesheet image
    pub atlas_image: Option<Handle<Image>>,

    /// For image collection tilesets: individual tile images
    ///
    /// Key: Local tile ID (0-based, NOT GID)
    pub tile_images: HashMap<u32, Handle<Image>>,
}

impl PropTilesetAsset {
    #[inline]
    pub fn is_image_collection(&self) -> bool {
        self.atlas_image.is_none()
    }

    /// Get the image handle for a specific tile
    ///
    /// For texture atlas tilesets, this returns the atlas image (same for all tiles).
    /// For image collection tilesets, this returns the specific tile's image.
    pub fn get_tile_image(&self, local_tile_id: u32) -> Option<&Handle<Image>> {
        if let Some(ref atlas) = self.atlas_image {
            Some(atlas)
        } else {
            self.tile_images.get(&local_tile_id)
        }
    }

    pub fn tile(&self, local_tile_id: u32) -> Option<&TileDefinition> {
        self.definition.tile(local_tile_id)
    }
}
