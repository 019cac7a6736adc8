//! `Avian2D` colliders for prop tiles.
//!
//! Each collision box of a prop tile becomes a rectangle collider, positioned
//! relative to the centre of the tile image. Spawn an entity with a
//! [`PropTile`] and the plugin inserts a [`avian2d::prelude::RigidBody`] and
//! [`avian2d::prelude::Collider`] once the tileset asset has loaded.
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_propset_assets::prelude::*;
//! use bevy_propset_avian::{PropTile, PropsetAvianPlugin};
//! use avian2d::prelude::*;
//!
//! fn spawn_barrel(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn((
//!         PropTile {
//!             tileset: asset_server.load("tilesets/TX Prop Objects.tsx"),
//!             tile_id: 3,
//!         },
//!         Transform::from_xyz(0.0, 0.0, 1.0),
//!     ));
//! }
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .add_plugins(PhysicsPlugins::default())
//!     .add_plugins((PropsetAssetsPlugin, PropsetAvianPlugin::default()))
//!     .add_systems(Startup, spawn_barrel)
//!     .run();
//! ```

pub mod config;
pub mod plugin;
pub mod props;
pub mod shapes;

pub mod prelude {
    //! Common imports for `bevy_propset_avian`.

    pub use crate::config::ColliderConfig;
    pub use crate::plugin::PropsetAvianPlugin;
    pub use crate::props::{PropCollidersResolved, PropTile, attach_prop_colliders, prop_transform};
    pub use crate::shapes::{Aabb, collision_box_to_aabb, tile_collider};
}

// Re-export at crate root for convenience
pub use config::ColliderConfig;
pub use plugin::PropsetAvianPlugin;
pub use props::{PropCollidersResolved, PropTile};
