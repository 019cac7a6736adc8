//! Global collider configuration.

use avian2d::prelude::*;
use bevy::prelude::*;

/// Collider generation settings.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_propset_avian::{ColliderConfig, PropsetAvianPlugin};
///
/// App::new().add_plugins(PropsetAvianPlugin::new(ColliderConfig {
///     sensor: true,
///     ..default()
/// }));
/// ```
#[derive(Resource, Clone, Debug)]
pub struct ColliderConfig {
    /// Attach colliders to [`crate::PropTile`] entities at all.
    ///
    /// Default: `true`
    pub enabled: bool,

    /// Body type inserted next to each generated collider.
    ///
    /// Default: [`RigidBody::Static`]
    pub body: RigidBody,

    /// Generated colliders only detect overlaps.
    ///
    /// Default: `false`
    pub sensor: bool,

    /// Amount shaved off each box's width and height so that boxes sharing an
    /// edge do not report contact.
    ///
    /// Default: `1e-4`
    pub epsilon: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            body: RigidBody::Static,
            sensor: false,
            epsilon: 1e-4,
        }
    }
}
