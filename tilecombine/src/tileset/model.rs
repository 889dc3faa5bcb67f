//! Tileset document model.
//!
//! Only the fields the combiner needs are typed. Every other field is kept in
//! a flattened map so it survives a read/write cycle untouched, in its
//! original relative order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed tileset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    /// Root tile. A document without one has nothing to merge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<Tile>,

    /// Fields passed through untouched (`asset`, `geometricError`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A node of the tile tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TileContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Tile>>,

    /// Bounding volume, geometric error, refinement and anything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The content of a tile: either an asset or an external tileset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tile {
    /// The `content.url` of this tile, if any.
    pub fn content_url(&self) -> Option<&str> {
        self.content.as_ref().and_then(|c| c.url.as_deref())
    }

    /// Replace the url of this tile's content. No-op without content.
    pub fn set_content_url(&mut self, url: String) {
        if let Some(content) = self.content.as_mut() {
            content.url = Some(url);
        }
    }

    /// Take over the content and children of the root of a resolved tileset.
    ///
    /// The tile keeps its own remaining fields and its position in its parent.
    pub fn splice(&mut self, resolved_root: Tile) {
        self.content = resolved_root.content;
        self.children = resolved_root.children;
    }

    /// Mutable access to a descendant addressed by child indices.
    pub fn descendant_mut(&mut self, address: &[usize]) -> Option<&mut Tile> {
        let mut tile = self;
        for &index in address {
            tile = tile.children.as_mut()?.get_mut(index)?;
        }
        Some(tile)
    }
}
