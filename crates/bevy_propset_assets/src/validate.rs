//! Structural and on-disk checks for tileset definitions.

use std::collections::BTreeSet;

use bevy::prelude::*;

use crate::error::ValidationIssue;
use crate::tileset::TilesetDefinition;

/// Which optional checks [`validate`] runs.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Open every referenced image and compare its real size with the
    /// declared one.
    pub check_images: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { check_images: true }
    }
}

/// Run every enabled check and collect all issues.
///
/// `authored_ids` are the `<tile id>` values in document order (see
/// [`crate::loaders::TsxOutline`]); pass the definition's own ids when the
/// raw document is not available.
pub fn validate(
    definition: &TilesetDefinition,
    authored_ids: &[u32],
    options: &ValidationOptions,
) -> Vec<ValidationIssue> {
    let mut issues = validate_structure(definition, authored_ids);
    if options.check_images {
        issues.extend(verify_images(definition));
    }
    issues
}

/// Id, image-presence and collision-bounds rules. Touches no files.
pub fn validate_structure(
    definition: &TilesetDefinition,
    authored_ids: &[u32],
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut seen = BTreeSet::new();
    for &id in authored_ids {
        if !seen.insert(id) {
            issues.push(ValidationIssue::DuplicateTileId(id));
        }
        if id >= definition.tile_count {
            issues.push(ValidationIssue::TileIdOutOfRange {
                id,
                tile_count: definition.tile_count,
            });
        }
    }

    // Atlases may omit <tile> entries for tiles without extra data
    if definition.is_image_collection() {
        issues.extend(missing_ranges(&seen, definition.tile_count));
    }

    for tile in &definition.tiles {
        if definition.is_image_collection() && tile.image.is_none() {
            issues.push(ValidationIssue::MissingTileImage(tile.id));
        }

        let Some(bounds) = definition.tile_bounds(tile.id) else {
            continue;
        };
        for rect in &tile.collision_boxes {
            if !rect.fits_within(bounds) {
                issues.push(ValidationIssue::CollisionOutOfBounds {
                    tile_id: tile.id,
                    rect: *rect,
                    bounds,
                });
            }
        }
    }

    issues
}

/// Gaps in `0..tile_count` not covered by `seen`, one issue per gap.
fn missing_ranges(seen: &BTreeSet<u32>, tile_count: u32) -> Vec<ValidationIssue> {
    let mut gaps = Vec::new();
    let mut next = 0u32;

    for &id in seen.range(..tile_count) {
        if id > next {
            gaps.push(ValidationIssue::MissingTileIds {
                first: next,
                last: id - 1,
            });
        }
        next = id + 1;
    }
    if next < tile_count {
        gaps.push(ValidationIssue::MissingTileIds {
            first: next,
            last: tile_count - 1,
        });
    }

    gaps
}

/// Check that every referenced image exists and has its declared size.
///
/// Only the image header is decoded.
pub fn verify_images(definition: &TilesetDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for tile in &definition.tiles {
        let Some(image) = definition.tile_image(tile.id) else {
            continue;
        };
        let path = definition.resolve_image_path(image);

        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                let actual = UVec2::new(width, height);
                if actual != image.size() {
                    issues.push(ValidationIssue::ImageSizeMismatch {
                        tile_id: tile.id,
                        path,
                        declared: image.size(),
                        actual,
                    });
                }
            }
            Err(err) => issues.push(ValidationIssue::UnreadableImage {
                tile_id: tile.id,
                path,
                reason: err.to_string(),
            }),
        }

        // One sheet serves every tile of an atlas
        if !definition.is_image_collection() {
            break;
        }
    }

    debug!(
        "Verified images of tileset '{}': {} issue(s)",
        definition.name,
        issues.len()
    );

    issues
}
