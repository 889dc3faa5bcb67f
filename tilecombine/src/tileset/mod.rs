//! Tileset documents and the resolver that flattens them.
//!
//! - [`model`] - serde model of a tileset document and its tile tree
//! - [`resolver`] - recursive inlining of external tileset references

pub mod model;
pub mod resolver;

pub use model::{Tile, TileContent, Tileset};
pub use resolver::{load_document, resolve, ResolveStats, Resolved};
