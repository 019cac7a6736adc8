//! Prop entities and collider attachment.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_propset_assets::prelude::{PropMap, PropMapAsset, PropPlacement, PropTilesetAsset};

use crate::config::ColliderConfig;
use crate::shapes;

/// A spawned prop showing one tile of a prop tileset.
///
/// The entity's transform is taken to be the centre of the tile image, which
/// is where a default-anchored [`Sprite`] draws it.
#[derive(Component, Debug, Clone)]
pub struct PropTile {
    pub tileset: Handle<PropTilesetAsset>,
    /// Local tile id within the tileset.
    pub tile_id: u32,
}

impl PropTile {
    /// Prop for a placement of a loaded map asset.
    ///
    /// Returns `None` when the placement's tileset is embedded in the map and
    /// therefore has no asset handle.
    pub fn from_placement(map: &PropMapAsset, placement: &PropPlacement) -> Option<Self> {
        Some(Self {
            tileset: map.tileset_handle(placement.tileset_index)?.clone(),
            tile_id: placement.tile_id,
        })
    }
}

/// Marks a [`PropTile`] whose colliders have been resolved, whether or not it
/// had any collision boxes.
#[derive(Component, Debug, Default)]
pub struct PropCollidersResolved;

/// World transform for a placement: the image centre, with map y flipped so
/// the map's top-left corner sits at `(0, map_height)`.
///
/// Object rotation is not applied.
pub fn prop_transform(map: &PropMap, placement: &PropPlacement, z: f32) -> Option<Transform> {
    let tileset = &map.tilesets.get(placement.tileset_index)?.definition;
    let image_size = tileset.tile_bounds(placement.tile_id)?.as_vec2();
    let map_height = map.pixel_size().y as f32;

    let center = placement.position + image_size / 2.0;
    Some(Transform::from_xyz(center.x, map_height - center.y, z))
}

/// Insert a body and collider on every [`PropTile`] whose tileset has loaded.
///
/// Entities stay pending until their tileset asset is available, then get
/// [`PropCollidersResolved`] so they are visited once.
pub fn attach_prop_colliders(
    props: Query<(Entity, &PropTile), Without<PropCollidersResolved>>,
    tileset_assets: Res<Assets<PropTilesetAsset>>,
    config: Res<ColliderConfig>,
    mut commands: Commands,
) {
    for (entity, prop) in &props {
        let Some(tileset) = tileset_assets.get(&prop.tileset) else {
            continue;
        };

        let mut entity_cmds = commands.entity(entity);
        entity_cmds.insert(PropCollidersResolved);

        // Atlas tiles without collision data have no entry
        let Some(tile) = tileset.tile(prop.tile_id) else {
            if prop.tile_id >= tileset.definition.tile_count {
                warn!(
                    "Prop tile {} not found in tileset '{}'",
                    prop.tile_id, tileset.definition.name
                );
            }
            continue;
        };
        let Some(image_size) = tileset.definition.tile_bounds(tile.id) else {
            continue;
        };
        let Some(collider) = shapes::tile_collider(tile, image_size, &config) else {
            continue;
        };

        entity_cmds.insert((config.body, collider));
        if config.sensor {
            entity_cmds.insert(Sensor);
        }

        debug!(
            "Attached {} collision box(es) to prop tile {}",
            tile.collision_boxes.len(),
            tile.id
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use bevy::ecs::system::RunSystemOnce;
    use bevy::platform::collections::HashMap;
    use bevy_propset_assets::loaders::{map::load_prop_map, tileset::load_tileset};

    use super::*;

    fn assets_dir() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets"))
    }

    fn world_with_fixture(config: ColliderConfig) -> (World, Handle<PropTilesetAsset>) {
        let definition = load_tileset(assets_dir().join("tilesets/TX Prop Objects.tsx")).unwrap();
        let mut assets = Assets::<PropTilesetAsset>::default();
        let handle = assets.add(PropTilesetAsset {
            definition,
            atlas_image: None,
            tile_images: HashMap::default(),
        });

        let mut world = World::new();
        world.insert_resource(assets);
        world.insert_resource(config);
        (world, handle)
    }

    #[test]
    fn test_collider_attached_when_loaded() {
        let (mut world, handle) = world_with_fixture(ColliderConfig::default());
        let statue = world
            .spawn(PropTile {
                tileset: handle,
                tile_id: 0,
            })
            .id();

        world.run_system_once(attach_prop_colliders).unwrap();

        assert!(world.get::<Collider>(statue).is_some());
        assert_eq!(world.get::<RigidBody>(statue), Some(&RigidBody::Static));
        assert!(world.get::<PropCollidersResolved>(statue).is_some());
        assert!(world.get::<Sensor>(statue).is_none());
    }

    #[test]
    fn test_pending_until_tileset_loaded() {
        let (mut world, _) = world_with_fixture(ColliderConfig::default());
        let prop = world
            .spawn(PropTile {
                tileset: Handle::default(),
                tile_id: 0,
            })
            .id();

        world.run_system_once(attach_prop_colliders).unwrap();

        assert!(world.get::<Collider>(prop).is_none());
        assert!(world.get::<PropCollidersResolved>(prop).is_none());
    }

    #[test]
    fn test_unknown_tile_resolved_without_collider() {
        let (mut world, handle) = world_with_fixture(ColliderConfig::default());
        let prop = world
            .spawn(PropTile {
                tileset: handle,
                tile_id: 42,
            })
            .id();

        world.run_system_once(attach_prop_colliders).unwrap();

        assert!(world.get::<Collider>(prop).is_none());
        assert!(world.get::<PropCollidersResolved>(prop).is_some());
    }

    #[test]
    fn test_sensor_and_body_from_config() {
        let (mut world, handle) = world_with_fixture(ColliderConfig {
            body: RigidBody::Kinematic,
            sensor: true,
            ..default()
        });
        let barrel = world
            .spawn(PropTile {
                tileset: handle,
                tile_id: 3,
            })
            .id();

        world.run_system_once(attach_prop_colliders).unwrap();

        assert_eq!(world.get::<RigidBody>(barrel), Some(&RigidBody::Kinematic));
        assert!(world.get::<Sensor>(barrel).is_some());
    }

    #[test]
    fn test_prop_transform_flips_y() {
        let map = load_prop_map(assets_dir().join("maps/courtyard.tmx")).unwrap();
        let statue = map
            .placements
            .iter()
            .find(|placement| placement.name == "statue")
            .unwrap();

        // 10x8 map of 16px tiles: 128px tall. Statue image 37x72 at (16, 24).
        let transform = prop_transform(&map, statue, 1.0).unwrap();
        assert_eq!(transform.translation, Vec3::new(34.5, 68.0, 1.0));
    }
}
