use std::path::Path;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    platform::collections::HashMap,
    prelude::*,
    tasks::ConditionalSendFuture,
};
use serde::{Deserialize, Serialize};

use crate::assets::tileset::PropTilesetAsset;
use crate::error::{TilesetError, ValidationIssue};
use crate::loaders::{MemoryReader, TsxOutline, resolve_relative_path, scan_tsx_outline};
use crate::properties::convert_properties;
use crate::tileset::{AxisAlignedRect, TileDefinition, TileImage, TilesetDefinition, TilesetKind};
use crate::validate::{ValidationOptions, validate};

/// Read and parse a `.tsx` file from disk.
///
/// Structural problems are not checked here; see [`load_and_validate`].
pub fn load_tileset(path: impl AsRef<Path>) -> Result<TilesetDefinition, TilesetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TilesetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tileset(path, &bytes)
}

/// Load a tileset and reject it if any validation rule fails.
pub fn load_and_validate(
    path: impl AsRef<Path>,
    options: &ValidationOptions,
) -> Result<TilesetDefinition, TilesetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TilesetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let outline = scan_tsx_outline(path, &bytes)?;
    let definition = parse_with_outline(path, &bytes, &outline)?;

    let issues = validate(&definition, &outline.tile_ids, options);
    if issues.is_empty() {
        Ok(definition)
    } else {
        Err(TilesetError::Invalid {
            path: path.to_path_buf(),
            issues,
        })
    }
}

/// Parse `.tsx` bytes. `path` names the document; image sources are taken
/// relative to its parent directory.
///
/// Either the whole tileset is returned or an error; a truncated document
/// never yields a partial definition.
pub fn parse_tileset(path: &Path, bytes: &[u8]) -> Result<TilesetDefinition, TilesetError> {
    let outline = scan_tsx_outline(path, bytes)?;
    parse_with_outline(path, bytes, &outline)
}

pub(crate) fn parse_with_outline(
    path: &Path,
    bytes: &[u8],
    outline: &TsxOutline,
) -> Result<TilesetDefinition, TilesetError> {
    let mut loader = tiled::Loader::with_reader(MemoryReader::new(path, bytes));
    let tileset = loader.load_tsx_tileset(path)?;

    let mut definition = convert_tileset(&tileset, path)?;
    definition.format_version = outline.format_version.clone();
    definition.tiled_version = outline.tiled_version.clone();
    definition.grid = outline.grid.clone();

    debug!(
        "Parsed tileset '{}' from {:?}: {} tiles, {} with collision",
        definition.name,
        path,
        definition.tiles.len(),
        definition.collision_tiles().count()
    );

    Ok(definition)
}

/// Convert a `tiled` tileset into a [`TilesetDefinition`].
///
/// `source` is the file the tileset came from (the `.tmx` for embedded
/// tilesets). Version and grid information is not available from `tiled`
/// and is left empty.
pub fn convert_tileset(
    tileset: &tiled::Tileset,
    source: &Path,
) -> Result<TilesetDefinition, TilesetError> {
    let base_dir = source.parent().unwrap_or_else(|| Path::new(""));

    let kind = match &tileset.image {
        Some(sheet) => TilesetKind::Atlas(convert_image(sheet, base_dir, source)?),
        None => TilesetKind::Collection,
    };

    let mut tiles = Vec::new();
    for (id, tile) in tileset.tiles() {
        let image = tile
            .image
            .as_ref()
            .map(|image| convert_image(image, base_dir, source))
            .transpose()?;

        let collision_boxes = tile
            .collision
            .as_ref()
            .map(|group| collision_boxes(id, group.object_data()))
            .unwrap_or_default();

        let properties = convert_properties(&tile.properties);

        // `tiled` fills every atlas slot; Tiled only writes tiles with data
        if image.is_none() && collision_boxes.is_empty() && properties.is_empty() {
            continue;
        }

        tiles.push(TileDefinition {
            id,
            image,
            collision_boxes,
            properties,
        });
    }
    tiles.sort_by_key(|tile| tile.id);

    Ok(TilesetDefinition {
        source: source.to_path_buf(),
        name: tileset.name.clone(),
        format_version: None,
        tiled_version: None,
        tile_size: UVec2::new(tileset.tile_width, tileset.tile_height),
        tile_count: tileset.tilecount,
        columns: tileset.columns,
        spacing: tileset.spacing,
        margin: tileset.margin,
        grid: None,
        kind,
        properties: convert_properties(&tileset.properties),
        tiles,
    })
}

fn convert_image(
    image: &tiled::Image,
    base_dir: &Path,
    source: &Path,
) -> Result<TileImage, TilesetError> {
    let dimension = |value: i32, what: &str| {
        u32::try_from(value).map_err(|_| TilesetError::Layout {
            path: source.to_path_buf(),
            reason: format!("image {:?} has negative {what} {value}", image.source),
        })
    };

    // `tiled` joins sources onto the tileset directory; keep them as authored
    let authored = image
        .source
        .strip_prefix(base_dir)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| image.source.clone());

    Ok(TileImage {
        source: authored,
        width: dimension(image.width, "width")?,
        height: dimension(image.height, "height")?,
    })
}

/// Rectangles of a tile's collision group.
///
/// Coordinates are whole pixels; fractional values are truncated toward zero.
/// Shapes that are not axis-aligned rectangles are skipped.
fn collision_boxes(tile_id: u32, objects: &[tiled::ObjectData]) -> Vec<AxisAlignedRect> {
    let mut boxes = Vec::with_capacity(objects.len());

    for object in objects {
        let tiled::ObjectShape::Rect { width, height } = object.shape else {
            warn!(
                "Tile {}: collision object {} is not a rectangle, skipping",
                tile_id,
                object.id()
            );
            continue;
        };

        if object.rotation != 0.0 {
            warn!(
                "Tile {}: collision object {} is rotated by {} degrees, skipping",
                tile_id,
                object.id(),
                object.rotation
            );
            continue;
        }

        if [object.x, object.y, width, height]
            .iter()
            .any(|v| v.fract() != 0.0)
        {
            warn!(
                "Tile {}: collision object {} has fractional coordinates, truncating",
                tile_id,
                object.id()
            );
        }

        boxes.push(AxisAlignedRect::new(
            object.x as i32,
            object.y as i32,
            width.max(0.0) as u32,
            height.max(0.0) as u32,
        ));
    }

    boxes
}

/// What the asset loader does with validation problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Fail the load.
    #[default]
    Strict,
    /// Log each issue and keep the tileset.
    Warn,
    /// Skip validation entirely.
    Off,
}

/// Per-asset settings for [`PropTilesetAssetLoader`] (`.tsx.meta` files).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilesetLoaderSettings {
    pub mode: ValidationMode,
    /// Compare declared image sizes against the files under `assets/`.
    ///
    /// Off by default since Bevy may serve assets from non-filesystem sources.
    pub check_images: bool,
}

/// Validate a parsed tileset as the loader settings ask.
///
/// Returns the issues to report as warnings; in [`ValidationMode::Strict`]
/// any issue fails instead.
pub(crate) fn apply_settings(
    path: &Path,
    definition: &TilesetDefinition,
    outline: &TsxOutline,
    settings: &TilesetLoaderSettings,
) -> Result<Vec<ValidationIssue>, TilesetError> {
    if settings.mode == ValidationMode::Off {
        return Ok(Vec::new());
    }

    let options = ValidationOptions {
        check_images: settings.check_images,
    };
    let issues = validate(definition, &outline.tile_ids, &options);
    if settings.mode == ValidationMode::Strict && !issues.is_empty() {
        return Err(TilesetError::Invalid {
            path: path.to_path_buf(),
            issues,
        });
    }

    Ok(issues)
}

/// Asset loader for prop tilesets (.tsx files)
///
/// Supports both texture atlas tilesets (single spritesheet) and image collection
/// tilesets (individual images per tile).
#[derive(Default)]
pub struct PropTilesetAssetLoader;

impl AssetLoader for PropTilesetAssetLoader {
    type Asset = PropTilesetAsset;
    type Settings = TilesetLoaderSettings;
    type Error = TilesetError;

    fn load(
        &self,
        reader: &mut dyn Reader,
        settings: &Self::Settings,
        load_context: &mut LoadContext,
    ) -> impl ConditionalSendFuture<Output = Result<Self::Asset, Self::Error>> {
        async move {
            // Bevy loads assets from the "assets" directory by default
            let full_path = Path::new("assets").join(load_context.asset_path().path());

            let mut bytes = Vec::new();
            reader
                .read_to_end(&mut bytes)
                .await
                .map_err(|source| TilesetError::Io {
                    path: full_path.clone(),
                    source,
                })?;

            let outline = scan_tsx_outline(&full_path, &bytes)?;
            let definition = parse_with_outline(&full_path, &bytes, &outline)?;

            for issue in apply_settings(&full_path, &definition, &outline, settings)? {
                warn!("Tileset {:?}: {}", full_path, issue);
            }

            // Determine if texture atlas or image collection
            let (atlas_image, tile_images) = match &definition.kind {
                TilesetKind::Atlas(sheet) => {
                    let image_path = resolve_relative_path(load_context, &sheet.source)?;
                    (Some(load_context.load(image_path)), HashMap::default())
                }
                TilesetKind::Collection => {
                    let mut tile_images = HashMap::new();
                    for tile in &definition.tiles {
                        if let Some(image) = &tile.image {
                            let image_path = resolve_relative_path(load_context, &image.source)?;
                            tile_images.insert(tile.id, load_context.load(image_path));
                        }
                    }
                    (None, tile_images)
                }
            };

            info!(
                "Loaded tileset '{}' ({} tiles)",
                definition.name,
                definition.tiles.len()
            );

            Ok(PropTilesetAsset {
                definition,
                atlas_image,
                tile_images,
            })
        }
    }

    fn extensions(&self) -> &[&str] {
        &["tsx"]
    }
}

/// Path of the fixture tileset shipped with the workspace.
#[cfg(test)]
pub(crate) fn fixture_path() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets/tilesets/TX Prop Objects.tsx")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_fixture_has_six_contiguous_tiles() {
        let tileset = load_tileset(fixture_path()).unwrap();

        assert_eq!(tileset.name, "TX Prop Objects");
        assert_eq!(tileset.tile_count, 6);
        assert!(tileset.is_image_collection());
        let ids: Vec<u32> = tileset.tiles.iter().map(|tile| tile.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fixture_tile_details() {
        let tileset = load_tileset(fixture_path()).unwrap();

        let statue = tileset.tile(0).unwrap();
        let image = statue.image.as_ref().unwrap();
        assert_eq!(image.source, PathBuf::from("../graphics/sprites/statue.png"));
        assert_eq!((image.width, image.height), (37, 72));
        assert_eq!(
            statue.collision_boxes,
            vec![AxisAlignedRect::new(0, 47, 37, 25)]
        );

        let player = tileset.tile(5).unwrap();
        assert_eq!(
            player.collision_boxes,
            vec![AxisAlignedRect::new(6, 43, 21, 15)]
        );
    }

    #[test]
    fn test_fixture_keeps_outline_metadata() {
        let tileset = load_tileset(fixture_path()).unwrap();

        assert_eq!(tileset.format_version.as_deref(), Some("1.8"));
        assert_eq!(tileset.tiled_version.as_deref(), Some("1.8.5"));
        assert_eq!(tileset.tile_size, UVec2::new(56, 72));
        assert_eq!(tileset.columns, 0);
        assert_eq!(tileset.grid.as_ref().map(|g| (g.width, g.height)), Some((1, 1)));
    }

    #[test]
    fn test_fixture_collision_boxes_within_images() {
        let tileset = load_tileset(fixture_path()).unwrap();

        for tile in &tileset.tiles {
            let bounds = tileset.tile_bounds(tile.id).unwrap();
            for rect in &tile.collision_boxes {
                assert!(rect.fits_within(bounds), "tile {}: {:?}", tile.id, rect);
            }
        }
    }

    #[test]
    fn test_fixture_passes_validation_with_images() {
        let options = ValidationOptions { check_images: true };
        assert!(load_and_validate(fixture_path(), &options).is_ok());
    }

    #[test]
    fn test_truncated_tileset_is_parse_error() {
        let bytes = std::fs::read(fixture_path()).unwrap();
        let cut = &bytes[..bytes.len() * 2 / 3];

        let err = parse_tileset(Path::new("cut.tsx"), cut).unwrap_err();
        assert!(err.is_parse_error(), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_tileset("assets/does/not/exist.tsx").unwrap_err();
        assert!(matches!(err, TilesetError::Io { .. }));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_duplicate_ids_fail_validation() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="dup" tilewidth="8" tileheight="8" tilecount="2" columns="0">
 <tile id="0"><image width="8" height="8" source="a.png"/></tile>
 <tile id="0"><image width="8" height="8" source="b.png"/></tile>
</tileset>"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.tsx");
        std::fs::write(&path, doc).unwrap();

        let err = load_and_validate(&path, &ValidationOptions { check_images: false })
            .unwrap_err();
        let TilesetError::Invalid { issues, .. } = err else {
            panic!("expected validation failure, got {err}");
        };
        assert!(issues.contains(&crate::error::ValidationIssue::DuplicateTileId(0)));
        assert!(issues.contains(&crate::error::ValidationIssue::MissingTileIds {
            first: 1,
            last: 1
        }));
    }

    #[test]
    fn test_non_rect_collision_is_skipped() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="shapes" tilewidth="16" tileheight="16" tilecount="1" columns="0">
 <tile id="0">
  <image width="16" height="16" source="a.png"/>
  <objectgroup draworder="index" id="2">
   <object id="1" x="2" y="2" width="4" height="4"><ellipse/></object>
   <object id="2" x="0" y="8" width="16" height="8"/>
  </objectgroup>
 </tile>
</tileset>"#;
        let tileset = parse_tileset(Path::new("shapes.tsx"), doc.as_bytes()).unwrap();
        assert_eq!(
            tileset.tile(0).unwrap().collision_boxes,
            vec![AxisAlignedRect::new(0, 8, 16, 8)]
        );
    }

    #[test]
    fn test_huge_tile_count_is_rejected_before_parsing() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="huge" tilewidth="8" tileheight="8" tilecount="50000000" columns="0">
 <tile id="0"><image width="8" height="8" source="a.png"/></tile>
</tileset>"#;
        let err = parse_tileset(Path::new("huge.tsx"), doc.as_bytes()).unwrap_err();
        assert!(matches!(err, TilesetError::Layout { .. }), "{err}");
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_fractional_collision_is_truncated() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="fractions" tilewidth="16" tileheight="16" tilecount="1" columns="0">
 <tile id="0">
  <image width="16" height="16" source="a.png"/>
  <objectgroup draworder="index" id="2">
   <object id="1" x="2.7" y="3.2" width="10.9" height="4.5"/>
  </objectgroup>
 </tile>
</tileset>"#;
        let tileset = parse_tileset(Path::new("fractions.tsx"), doc.as_bytes()).unwrap();
        assert_eq!(
            tileset.tile(0).unwrap().collision_boxes,
            vec![AxisAlignedRect::new(2, 3, 10, 4)]
        );
    }

    #[test]
    fn test_rotated_collision_is_skipped() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="rotated" tilewidth="16" tileheight="16" tilecount="1" columns="0">
 <tile id="0">
  <image width="16" height="16" source="a.png"/>
  <objectgroup draworder="index" id="2">
   <object id="1" x="4" y="4" width="6" height="6" rotation="45"/>
   <object id="2" x="0" y="12" width="16" height="4"/>
  </objectgroup>
 </tile>
</tileset>"#;
        let tileset = parse_tileset(Path::new("rotated.tsx"), doc.as_bytes()).unwrap();
        assert_eq!(
            tileset.tile(0).unwrap().collision_boxes,
            vec![AxisAlignedRect::new(0, 12, 16, 4)]
        );
    }

    #[test]
    fn test_atlas_keeps_only_tiles_with_data() {
        let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="sheet" tilewidth="16" tileheight="16" tilecount="4" columns="2">
 <image width="32" height="32" source="sheet.png"/>
 <tile id="3">
  <objectgroup draworder="index" id="2">
   <object id="1" x="0" y="8" width="16" height="8"/>
  </objectgroup>
 </tile>
</tileset>"#;
        let tileset = parse_tileset(Path::new("sheet.tsx"), doc.as_bytes()).unwrap();
        let ids: Vec<u32> = tileset.tiles.iter().map(|tile| tile.id).collect();
        assert_eq!(ids, vec![3]);
        assert_eq!(tileset.tile_bounds(0), Some(UVec2::new(16, 16)));

        let text = crate::writer::to_tsx_string(&tileset).unwrap();
        assert!(!text.contains("<tile id=\"0\""), "{text}");
        assert_eq!(parse_tileset(Path::new("sheet.tsx"), text.as_bytes()).unwrap(), tileset);
    }

    const GAPPED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset name="gapped" tilewidth="8" tileheight="8" tilecount="2" columns="0">
 <tile id="0"><image width="8" height="8" source="a.png"/></tile>
</tileset>"#;

    fn gapped() -> (TsxOutline, TilesetDefinition) {
        let path = Path::new("gapped.tsx");
        let outline = scan_tsx_outline(path, GAPPED.as_bytes()).unwrap();
        let definition = parse_with_outline(path, GAPPED.as_bytes(), &outline).unwrap();
        (outline, definition)
    }

    fn settings(mode: ValidationMode) -> TilesetLoaderSettings {
        TilesetLoaderSettings {
            mode,
            check_images: false,
        }
    }

    #[test]
    fn test_strict_mode_fails_on_issues() {
        let (outline, definition) = gapped();
        let result = apply_settings(
            Path::new("gapped.tsx"),
            &definition,
            &outline,
            &settings(ValidationMode::Strict),
        );
        assert!(matches!(result, Err(TilesetError::Invalid { .. })));
    }

    #[test]
    fn test_warn_mode_keeps_tileset() {
        let (outline, definition) = gapped();
        let warnings = apply_settings(
            Path::new("gapped.tsx"),
            &definition,
            &outline,
            &settings(ValidationMode::Warn),
        )
        .unwrap();
        assert_eq!(
            warnings,
            vec![ValidationIssue::MissingTileIds { first: 1, last: 1 }]
        );
    }

    #[test]
    fn test_off_mode_skips_validation() {
        let (outline, definition) = gapped();
        let warnings = apply_settings(
            Path::new("gapped.tsx"),
            &definition,
            &outline,
            &settings(ValidationMode::Off),
        )
        .unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_default_settings_are_strict_without_image_checks() {
        let defaults = TilesetLoaderSettings::default();
        assert_eq!(defaults.mode, ValidationMode::Strict);
        assert!(!defaults.check_images);
    }
}
