//! tilecombine - Flatten trees of external tilesets
//!
//! A tileset document may reference further tileset documents through the
//! `content.url` of its tiles. This library loads such a tree, splices every
//! referenced tileset into the tile that referenced it, rewrites the remaining
//! asset urls so they are relative to a single root directory, and writes the
//! result as one self-contained `tileset.json` next to a copy of all the
//! non-document assets.
//!
//! # Example
//!
//! ```ignore
//! use tilecombine::{combine_tileset, CombineConfig};
//!
//! let config = CombineConfig::new("data/TilesetOfTilesets");
//! let report = combine_tileset(&config).await?;
//! println!("wrote {}", report.output_path.display());
//! ```

pub mod codec;
pub mod combine;
pub mod config;
pub mod copier;
pub mod error;
pub mod limiter;
pub mod logging;
pub mod path;
pub mod tileset;

pub use codec::Compression;
pub use combine::{combine_tileset, CombineReport};
pub use config::CombineConfig;
pub use error::{CombineError, CombineResult};

/// Library version, as published in the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
