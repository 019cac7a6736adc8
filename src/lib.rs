//! # bevy_propset
//!
//! Tiled prop tilesets for Bevy: loading, validation and collider generation.
//!
//! This is a meta-crate that combines the `bevy_propset_*` sub-crates behind
//! feature flags.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_propset::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(BevyPropsetPlugin::default())
//!         .add_systems(Startup, spawn_statue)
//!         .run();
//! }
//!
//! fn spawn_statue(mut commands: Commands, asset_server: Res<AssetServer>) {
//!     commands.spawn(PropTile {
//!         tileset: asset_server.load("tilesets/TX Prop Objects.tsx"),
//!         tile_id: 0,
//!     });
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: Includes `avian`
//! - **avian**: Collider generation from tile collision boxes using `avian2d`
//!
//! ## Architecture
//!
//! - [`assets`]: Parsing, validation and writing of `.tsx` prop tilesets, prop
//!   maps (`.tmx`), and the Bevy asset loaders for both
//! - [`avian`] (optional): Colliders for spawned prop tiles

pub mod plugin;

// Re-export sub-crates for advanced usage
pub use bevy_propset_assets as assets;

#[cfg(feature = "avian")]
pub use bevy_propset_avian as avian;

/// Unified prelude for bevy_propset
pub mod prelude {
    pub use crate::assets::prelude::*;

    #[cfg(feature = "avian")]
    pub use crate::avian::prelude::*;

    pub use crate::plugin::BevyPropsetPlugin;
}
