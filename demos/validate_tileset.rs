//! Loads a prop tileset, validates it against its images and prints a summary.
//!
//! Run with `cargo run --example validate_tileset -- [path/to/tileset.tsx]`.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_propset::prelude::*;

fn main() {
    App::new()
        .add_plugins((MinimalPlugins, LogPlugin::default()))
        .add_systems(Startup, report)
        .run();
}

fn report(mut exit: MessageWriter<AppExit>) {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/tilesets/TX Prop Objects.tsx".to_string());

    match load_and_validate(&path, &ValidationOptions::default()) {
        Ok(tileset) => {
            info!(
                "{}: {} tiles, {}x{} grid",
                tileset.name, tileset.tile_count, tileset.tile_size.x, tileset.tile_size.y
            );
            for tile in &tileset.tiles {
                let image = tile
                    .image
                    .as_ref()
                    .map(|image| format!("{} ({}x{})", image.source.display(), image.width, image.height))
                    .unwrap_or_default();
                info!("  tile {}: {} boxes {:?}", tile.id, image, tile.collision_boxes);
            }
            exit.write(AppExit::Success);
        }
        Err(TilesetError::Invalid { issues, .. }) => {
            for issue in &issues {
                error!("{issue}");
            }
            exit.write(AppExit::error());
        }
        Err(err) => {
            error!("{err}");
            exit.write(AppExit::error());
        }
    }
}
