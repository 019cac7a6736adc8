use std::path::Path;

use normalize_path::NormalizePath;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
    tasks::ConditionalSendFuture,
};

use crate::assets::{map::PropMapAsset, tileset::PropTilesetAsset};
use crate::error::MapError;
use crate::loaders::asset_path_string;
use crate::loaders::tileset::{convert_tileset, load_tileset};
use crate::map::{MapTileset, PropMap, PropPlacement};
use crate::properties::convert_properties;
use crate::tileset::TilesetDefinition;

/// Load a `.tmx` map and resolve every tile object on its object layers.
pub fn load_prop_map(path: impl AsRef<Path>) -> Result<PropMap, MapError> {
    let path = path.as_ref();
    let mut loader = tiled::Loader::new();
    let map = loader.load_tmx_map(path)?;
    build_prop_map(&map, path)
}

/// Convert an already parsed `tiled` map.
pub fn build_prop_map(map: &tiled::Map, source: &Path) -> Result<PropMap, MapError> {
    let mut tilesets = Vec::with_capacity(map.tilesets().len());
    let mut current_gid = 1u32; // GIDs start at 1

    for (index, tileset) in map.tilesets().iter().enumerate() {
        // External tilesets are re-read so version and grid data survive;
        // embedded ones only exist inside the map
        let definition = if is_external(&tileset.source) {
            load_tileset(&tileset.source)
        } else {
            convert_tileset(tileset, source)
        }
        .map_err(|source| MapError::Tileset { index, source })?;

        let span = gid_span(&definition);
        tilesets.push(MapTileset {
            first_gid: current_gid,
            definition,
        });
        current_gid += span;
    }

    let mut prop_map = PropMap {
        source: source.to_path_buf(),
        size: UVec2::new(map.width, map.height),
        tile_size: UVec2::new(map.tile_width, map.tile_height),
        tilesets,
        placements: Vec::new(),
    };

    for layer in map.layers() {
        collect_placements(layer, "", &mut prop_map);
    }

    debug!(
        "Resolved {} prop placement(s) in {:?}",
        prop_map.placements.len(),
        source
    );

    Ok(prop_map)
}

/// GIDs Tiled reserves for a tileset: its tile count, or one past the highest
/// id when an image collection has gaps.
fn gid_span(definition: &TilesetDefinition) -> u32 {
    let past_last = definition.tiles.last().map_or(0, |tile| tile.id + 1);
    if definition.is_image_collection() {
        definition.tile_count.max(past_last)
    } else {
        definition.tile_count
    }
}

fn is_external(source: &Path) -> bool {
    source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsx"))
}

/// Walk a layer (recursing into groups) and record its tile objects.
///
/// Objects without a tile reference (spawn points, trigger areas) are not
/// props and are skipped.
fn collect_placements(layer: tiled::Layer, parent: &str, prop_map: &mut PropMap) {
    let path = if parent.is_empty() {
        layer.name.clone()
    } else {
        format!("{parent}/{}", layer.name)
    };

    match layer.layer_type() {
        tiled::LayerType::Objects(object_layer) => {
            for object in object_layer.objects() {
                let Some(tile) = object.tile_data() else {
                    continue;
                };
                let tileset_index = match tile.tileset_location() {
                    tiled::TilesetLocation::Map(index) => *index,
                    tiled::TilesetLocation::Template(tileset) => {
                        let Some(index) = find_tileset(&prop_map.tilesets, &tileset.source)
                        else {
                            warn!(
                                "Object {} on layer '{}' uses template tileset {:?} which the map does not reference, skipping",
                                object.id(),
                                path,
                                tileset.source
                            );
                            continue;
                        };
                        index
                    }
                };
                let tile_id = tile.id();

                let (width, height) = match object.shape {
                    tiled::ObjectShape::Rect { width, height } => (width, height),
                    _ => (0.0, 0.0),
                };

                // Tile objects are anchored at their bottom-left corner
                let image_height = prop_map
                    .tilesets
                    .get(tileset_index)
                    .and_then(|t| t.definition.tile_bounds(tile_id))
                    .map_or(height, |bounds| bounds.y as f32);

                prop_map.placements.push(PropPlacement {
                    object_id: object.id(),
                    name: object.name.clone(),
                    layer: path.clone(),
                    tileset_index,
                    tile_id,
                    position: Vec2::new(object.x, object.y - image_height),
                    size: Vec2::new(width, height),
                    rotation: object.rotation,
                    class: object.user_type.clone(),
                    properties: convert_properties(&object.properties),
                });
            }
        }
        tiled::LayerType::Group(group) => {
            for child in group.layers() {
                collect_placements(child, &path, prop_map);
            }
        }
        _ => {}
    }
}

/// Index of the map tileset loaded from `source`.
///
/// Templates reference tilesets relative to the template file, so both sides
/// are normalized before comparing.
fn find_tileset(tilesets: &[MapTileset], source: &Path) -> Option<usize> {
    let source = source.normalize();
    tilesets
        .iter()
        .position(|tileset| tileset.definition.source.normalize() == source)
}

/// Asset loader for prop maps (.tmx files)
///
/// Referenced `.tsx` tilesets are loaded as [`PropTilesetAsset`] dependencies
/// so their images are available to whoever spawns the props.
#[derive(Default)]
pub struct PropMapAssetLoader;

impl AssetLoader for PropMapAssetLoader {
    type Asset = PropMapAsset;
    type Settings = ();
    type Error = MapError;

    fn load(
        &self,
        _reader: &mut dyn Reader,
        _settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            // The tiled loader reads the map and its tilesets directly from
            // the filesystem, so construct the full path
            let full_path = Path::new("assets").join(load_context.asset_path().path());

            let mut loader = tiled::Loader::new();
            let map = loader.load_tmx_map(&full_path)?;
            let prop_map = build_prop_map(&map, &full_path)?;

            let mut tilesets: Vec<Option<Handle<PropTilesetAsset>>> = Vec::new();
            for (index, tileset) in prop_map.tilesets.iter().enumerate() {
                let source = &tileset.definition.source;
                if !is_external(source) {
                    tilesets.push(None);
                    continue;
                }
                let asset_path = asset_path_string(source)
                    .map_err(|source| MapError::Tileset { index, source })?;
                tilesets.push(Some(load_context.load(asset_path)));
            }

            info!(
                "Loaded prop map {:?} ({} props)",
                full_path,
                prop_map.placements.len()
            );

            Ok(PropMapAsset {
                map: prop_map,
                tilesets,
            })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tmx"]
    }
}
