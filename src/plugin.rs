//! Unified plugin for bevy_propset.

use bevy::prelude::*;

use bevy_propset_assets::PropsetAssetsPlugin;

#[cfg(feature = "avian")]
use bevy_propset_avian::{ColliderConfig, PropsetAvianPlugin};

/// Unified plugin that adds all enabled bevy_propset functionality.
///
/// This plugin automatically includes:
/// - Asset loading ([`PropsetAssetsPlugin`])
/// - Collider attachment when the `avian` feature is enabled
///
/// # With Custom Configuration
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_propset::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(BevyPropsetPlugin::default().with_avian(ColliderConfig {
///         sensor: true,
///         ..default()
///     }))
///     .run();
/// ```
#[derive(Default)]
pub struct BevyPropsetPlugin {
    /// Collider configuration (if feature enabled)
    #[cfg(feature = "avian")]
    pub avian: ColliderConfig,
}

impl BevyPropsetPlugin {
    /// Create with custom collider configuration
    #[cfg(feature = "avian")]
    pub fn with_avian(mut self, config: ColliderConfig) -> Self {
        self.avian = config;
        self
    }
}

impl Plugin for BevyPropsetPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(PropsetAssetsPlugin);

        #[cfg(feature = "avian")]
        app.add_plugins(PropsetAvianPlugin::new(self.avian.clone()));

        info!("BevyPropsetPlugin initialized");
    }
}
