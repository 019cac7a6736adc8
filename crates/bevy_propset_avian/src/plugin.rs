//! Plugin for `Avian2D` prop colliders.

use bevy::prelude::*;

use crate::config::ColliderConfig;
use crate::props;

/// Plugin that attaches `Avian2D` colliders to [`crate::PropTile`] entities.
///
/// This plugin:
/// - Inserts the [`ColliderConfig`] resource
/// - Adds the collider attachment system (if enabled)
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_propset_avian::PropsetAvianPlugin;
/// use avian2d::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(PhysicsPlugins::default())
///     .add_plugins(PropsetAvianPlugin::default())
///     .run();
/// ```
#[derive(Default)]
pub struct PropsetAvianPlugin {
    pub config: ColliderConfig,
}

impl PropsetAvianPlugin {
    /// Create a new plugin with custom configuration.
    pub fn new(config: ColliderConfig) -> Self {
        Self { config }
    }
}

impl Plugin for PropsetAvianPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        if self.config.enabled {
            app.add_systems(Update, props::attach_prop_colliders);
        }

        info!("PropsetAvianPlugin initialized");
    }
}
