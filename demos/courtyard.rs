//! Spawns the props of `maps/courtyard.tmx` as sprites with `Avian2D`
//! colliders.
//!
//! Run with `cargo run --example courtyard`.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_propset::prelude::*;

#[derive(Resource)]
struct Courtyard(Handle<PropMapAsset>);

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(ImagePlugin::default_nearest()))
        .add_plugins(PhysicsPlugins::default())
        .add_plugins(PhysicsDebugPlugin::default())
        .add_plugins(BevyPropsetPlugin::default())
        .add_systems(Startup, setup)
        .add_systems(Update, spawn_props)
        .run();
}

fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((Camera2d, Transform::from_xyz(80.0, 64.0, 0.0)));
    commands.insert_resource(Courtyard(asset_server.load("maps/courtyard.tmx")));
}

fn spawn_props(
    mut commands: Commands,
    courtyard: Option<Res<Courtyard>>,
    maps: Res<Assets<PropMapAsset>>,
    tilesets: Res<Assets<PropTilesetAsset>>,
) {
    let Some(courtyard) = courtyard else {
        return;
    };
    let Some(map_asset) = maps.get(&courtyard.0) else {
        return;
    };
    // Sprites need the tile images listed in the map's .tsx dependencies
    if !map_asset.tilesets_ready(&tilesets) {
        return;
    }

    for (z, placement) in map_asset.map.placements.iter().enumerate() {
        let Some(prop) = PropTile::from_placement(map_asset, placement) else {
            continue;
        };
        let Some(transform) = prop_transform(&map_asset.map, placement, 1.0 + z as f32 * 0.01)
        else {
            continue;
        };
        let sprite = tilesets
            .get(&prop.tileset)
            .and_then(|tileset| tileset.get_tile_image(prop.tile_id))
            .map(|image| Sprite::from_image(image.clone()))
            .unwrap_or_default();

        commands.spawn((Name::new(placement.name.clone()), prop, sprite, transform));
    }

    info!("Spawned {} props", map_asset.map.placements.len());
    commands.remove_resource::<Courtyard>();
}
