//! Collision box conversion to `Avian2D` colliders.
//!
//! Tile collision boxes are authored in image pixels with the origin at the
//! image's top-left and y pointing down. Colliders are placed relative to the
//! image centre with y pointing up, which is where a centred Bevy sprite has
//! its origin.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_propset_assets::{AxisAlignedRect, TileDefinition};

use crate::config::ColliderConfig;

/// Centre/half-extent form of a collision box, still in image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }
}

/// Convert a collision box to an [`Aabb`].
///
/// The half extents are `0.5 * (size - epsilon)` and the centre sits at
/// `origin + half_extents`, so the shrunk box keeps its top-left corner.
pub fn collision_box_to_aabb(rect: &AxisAlignedRect, epsilon: f32) -> Aabb {
    let half_extents = Vec2::new(
        0.5 * (rect.width as f32 - epsilon).max(0.0),
        0.5 * (rect.height as f32 - epsilon).max(0.0),
    );
    Aabb {
        center: rect.min().as_vec2() + half_extents,
        half_extents,
    }
}

/// Offset of a box centre from the image centre, y flipped for Bevy.
fn offset_from_image_center(aabb: &Aabb, image_size: UVec2) -> Vec2 {
    let image_center = image_size.as_vec2() / 2.0;
    let offset = aabb.center - image_center;
    Vec2::new(offset.x, -offset.y)
}

/// Get tile collision shapes as individual colliders with offsets.
///
/// Unlike [`tile_collider`] which may return a compound collider, this returns
/// the individual shapes so they can be added to another compound.
///
/// Returns `(position, rotation, collider)` for each collision box.
pub fn tile_collider_shapes(
    tile: &TileDefinition,
    image_size: UVec2,
    config: &ColliderConfig,
) -> Vec<(Vec2, f32, Collider)> {
    tile.collision_boxes
        .iter()
        .map(|rect| {
            let aabb = collision_box_to_aabb(rect, config.epsilon);
            let size = aabb.half_extents * 2.0;
            (
                offset_from_image_center(&aabb, image_size),
                0.0,
                Collider::rectangle(size.x, size.y),
            )
        })
        .collect()
}

/// Build the collider for one tile.
///
/// # Returns
///
/// - `None` if the tile has no collision boxes
/// - A plain rectangle if the only box is centred on the image
/// - A compound collider otherwise
pub fn tile_collider(
    tile: &TileDefinition,
    image_size: UVec2,
    config: &ColliderConfig,
) -> Option<Collider> {
    let mut shapes = tile_collider_shapes(tile, image_size, config);

    match shapes.len() {
        0 => None,
        1 if shapes[0].0.length_squared() < 0.01 => shapes.pop().map(|(_, _, collider)| collider),
        _ => Some(Collider::compound(shapes)),
    }
}

/// Collision boxes of a tile as [`Aabb`]s in Bevy's y-up space, relative to
/// the image centre.
pub fn tile_aabbs(tile: &TileDefinition, image_size: UVec2, epsilon: f32) -> Vec<Aabb> {
    tile.collision_boxes
        .iter()
        .map(|rect| {
            let aabb = collision_box_to_aabb(rect, epsilon);
            Aabb {
                center: offset_from_image_center(&aabb, image_size),
                half_extents: aabb.half_extents,
            }
        })
        .collect()
}
