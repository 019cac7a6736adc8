use bevy::prelude::*;

use crate::assets::tileset::PropTilesetAsset;
use crate::map::PropMap;

#[derive(TypePath, Asset, Debug)]
pub struct PropMapAsset {
    /// Resolved props and their tileset definitions
    pub map: PropMap,

    /// Tileset handles, index-aligned with `map.tilesets`
    ///
    /// `None` for tilesets embedded in the map file.
    pub tilesets: Vec<Option<Handle<PropTilesetAsset>>>,
}

impl PropMapAsset {
    pub fn tileset_handle(&self, tileset_index: usize) -> Option<&Handle<PropTilesetAsset>> {
        self.tilesets.get(tileset_index)?.as_ref()
    }

    /// Whether every external tileset of the map has finished loading.
    ///
    /// Tileset assets are loaded as dependencies of the map and may arrive
    /// after it. Spawn props only once this holds, or their tile images are
    /// not available yet.
    pub fn tilesets_ready(&self, tilesets: &Assets<PropTilesetAsset>) -> bool {
        self.tilesets
            .iter()
            .flatten()
            .all(|handle| tilesets.contains(handle))
    }
}
