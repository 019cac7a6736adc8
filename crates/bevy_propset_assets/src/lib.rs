//! Loading, validation and serialization of Tiled prop tilesets.
//!
//! A prop tileset (`.tsx`) is an image collection: every tile names its own
//! sprite and may carry axis-aligned collision boxes. This crate turns such
//! files into immutable [`TilesetDefinition`]s, checks them against the
//! images on disk, writes them back, and resolves the props placed on `.tmx`
//! object layers.
//!
//! Everything outside [`assets`] and [`plugin`] works without a Bevy `App`:
//!
//! ```no_run
//! use bevy_propset_assets::prelude::*;
//!
//! let tileset = load_and_validate(
//!     "assets/tilesets/TX Prop Objects.tsx",
//!     &ValidationOptions::default(),
//! )?;
//! for tile in tileset.collision_tiles() {
//!     println!("{}: {:?}", tile.id, tile.collision_boxes);
//! }
//! # Ok::<(), bevy_propset_assets::TilesetError>(())
//! ```

pub mod assets;
pub mod error;
pub mod loaders;
pub mod map;
pub mod plugin;
pub mod properties;
pub mod tileset;
pub mod validate;
pub mod writer;

pub use error::{MapError, TilesetError, ValidationIssue};
pub use plugin::PropsetAssetsPlugin;
pub use tileset::{AxisAlignedRect, TileDefinition, TileImage, TilesetDefinition, TilesetKind};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::assets::{map::PropMapAsset, tileset::PropTilesetAsset};
    pub use crate::error::{MapError, TilesetError, ValidationIssue};
    pub use crate::loaders::map::load_prop_map;
    pub use crate::loaders::tileset::{
        TilesetLoaderSettings, ValidationMode, load_and_validate, load_tileset, parse_tileset,
    };
    pub use crate::map::{PropMap, PropPlacement};
    pub use crate::plugin::PropsetAssetsPlugin;
    pub use crate::properties::{Properties, PropertyValue};
    pub use crate::tileset::{
        AxisAlignedRect, TileDefinition, TileImage, TilesetDefinition, TilesetKind,
    };
    pub use crate::validate::ValidationOptions;
    pub use crate::writer::{save_tileset, to_tsx_string};
}
