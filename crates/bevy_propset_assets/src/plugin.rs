use bevy::prelude::*;

use crate::assets::{map::PropMapAsset, tileset::PropTilesetAsset};
use crate::loaders::{map::PropMapAssetLoader, tileset::PropTilesetAssetLoader};

/// Plugin that registers the prop tileset and prop map asset types and loaders
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_propset_assets::PropsetAssetsPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(PropsetAssetsPlugin)
///     .run();
/// ```
///
/// # What this plugin does
///
/// - Registers 2 asset types: `PropTilesetAsset`, `PropMapAsset`
/// - Registers asset loaders for `.tsx` and `.tmx` files
///
/// Entity spawning and rendering are left to the application.
pub struct PropsetAssetsPlugin;

impl Plugin for PropsetAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_asset::<PropTilesetAsset>()
            .init_asset::<PropMapAsset>();

        app.register_asset_loader(PropTilesetAssetLoader)
            .register_asset_loader(PropMapAssetLoader);
    }
}
