//! Recursive resolution of external tileset references.
//!
//! A document is loaded, its tile tree is walked with an explicit stack, and
//! every tile is classified by its `content.url`:
//!
//! - **Document references** (`*.json`) are resolved in their own task. Once
//!   every task has been joined, the resolved root is spliced into the tile
//!   that held the reference.
//! - **Asset references** are rewritten in place so they are relative to the
//!   root directory of the whole run.
//!
//! ```text
//! tileset.json                        resolved
//! └── root                            └── root
//!     ├── content: tileset2.json  ──►     ├── content: tileset2's root content
//!     │                                   │   └── tileset2's root children
//!     └── content: parent.b3dm    ──►     └── content: parent.b3dm
//! ```
//!
//! Tiles are addressed by their child-index path from the document root, so
//! the walk never aliases a tile that a task will later splice into.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace};

use super::model::{Tile, Tileset};
use crate::codec::{self, Compression};
use crate::error::{CombineError, CombineResult};
use crate::path::{is_document_url, normalize, rewrite};

/// Boxed future type for recursive async resolution.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Child-index path from a document's root tile to a descendant.
type TileAddress = Vec<usize>;

/// Counters accumulated over a resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Tileset documents loaded, including the root document.
    pub documents: usize,
    /// Asset urls rewritten relative to the root directory.
    pub assets_rewritten: usize,
}

impl ResolveStats {
    fn merge(&mut self, other: ResolveStats) {
        self.documents += other.documents;
        self.assets_rewritten += other.assets_rewritten;
    }
}

/// A tileset with every external reference inlined.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// The merged document.
    pub tileset: Tileset,
    /// Compression state of the document this resolution started from.
    pub compression: Compression,
    /// Counters over the whole subtree.
    pub stats: ResolveStats,
}

/// Resolve the tileset at `document_path`, inlining every referenced tileset.
///
/// Asset urls in the result are relative to `root_dir`. Returns only after
/// every nested reference has been resolved. The first failure anywhere in
/// the tree aborts the outstanding work and is returned.
pub async fn resolve(document_path: &Path, root_dir: &Path) -> CombineResult<Resolved> {
    resolve_document(
        normalize(document_path),
        Arc::new(normalize(root_dir)),
        Arc::new(Vec::new()),
    )
    .await
}

/// Read and parse a tileset document, undoing gzip if present.
pub async fn load_document(path: &Path) -> CombineResult<(Tileset, Compression)> {
    let data = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CombineError::NotFound(path.to_path_buf()),
        _ => CombineError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let compression = Compression::detect(&data);
    let json = codec::decode(&data).map_err(|e| CombineError::Decompress {
        path: path.to_path_buf(),
        source: e,
    })?;

    let tileset = serde_json::from_slice(&json).map_err(|e| CombineError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok((tileset, compression))
}

/// Resolve one document. `ancestors` holds every document on the reference
/// chain above this one.
fn resolve_document(
    path: PathBuf,
    root_dir: Arc<PathBuf>,
    ancestors: Arc<Vec<PathBuf>>,
) -> BoxFuture<'static, CombineResult<Resolved>> {
    Box::pin(async move {
        if ancestors.contains(&path) {
            return Err(CombineError::Cycle { path });
        }

        let (mut tileset, compression) = load_document(&path).await?;
        let mut stats = ResolveStats {
            documents: 1,
            assets_rewritten: 0,
        };

        if tileset.root.is_none() {
            debug!(path = %path.display(), "Tileset has no root, nothing to merge");
            return Ok(Resolved {
                tileset,
                compression,
                stats,
            });
        }

        let origin_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let chain: Vec<PathBuf> = ancestors
            .iter()
            .cloned()
            .chain(std::iter::once(path.clone()))
            .collect();

        let walk = Walk {
            root_dir: &root_dir,
            origin_dir: &origin_dir,
            chain: Arc::new(chain),
        };
        let mut pending = JoinSet::new();
        if let Some(root) = tileset.root.as_mut() {
            stats.assets_rewritten += walk.run(root, &mut pending);
        }

        // Dropping `pending` on early return aborts the remaining siblings.
        let mut splices = Vec::with_capacity(pending.len());
        while let Some(joined) = pending.join_next().await {
            let (address, resolved) = joined??;
            stats.merge(resolved.stats);
            splices.push((address, resolved.tileset.root));
        }

        // Deepest first, so a tile that is itself replaced by an ancestor's
        // splice cannot invalidate the address of a later splice.
        splices.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        for (address, resolved_root) in splices {
            // A rootless document is an empty subtree.
            let resolved_root = resolved_root.unwrap_or_default();
            if let Some(tile) = tileset
                .root
                .as_mut()
                .and_then(|root| root.descendant_mut(&address))
            {
                tile.splice(resolved_root);
            }
        }

        debug!(
            path = %path.display(),
            documents = stats.documents,
            assets = stats.assets_rewritten,
            "Resolved tileset"
        );

        Ok(Resolved {
            tileset,
            compression,
            stats,
        })
    })
}

/// Per-document traversal state.
struct Walk<'a> {
    root_dir: &'a Arc<PathBuf>,
    origin_dir: &'a Path,
    chain: Arc<Vec<PathBuf>>,
}

impl Walk<'_> {
    /// Walk the tree under `root`, rewriting asset urls in place and spawning
    /// a resolution task for every document reference. Returns the number of
    /// asset urls rewritten.
    fn run(
        &self,
        root: &mut Tile,
        pending: &mut JoinSet<CombineResult<(TileAddress, Resolved)>>,
    ) -> usize {
        let mut rewritten = 0;
        let mut stack: Vec<(TileAddress, &mut Tile)> = vec![(Vec::new(), root)];

        while let Some((address, tile)) = stack.pop() {
            if let Some(url) = tile.content_url().map(str::to_owned) {
                if is_document_url(&url) {
                    let child_path = normalize(&self.origin_dir.join(url.replace('\\', "/")));
                    debug!(
                        url = %url,
                        path = %child_path.display(),
                        "Found external tileset"
                    );

                    let task = resolve_document(
                        child_path,
                        Arc::clone(self.root_dir),
                        Arc::clone(&self.chain),
                    );
                    let task_address = address.clone();
                    pending.spawn(async move { task.await.map(|r| (task_address, r)) });
                } else {
                    let relative = rewrite(self.root_dir, self.origin_dir, &url);
                    trace!(from = %url, to = %relative, "Rewrote asset url");
                    tile.set_content_url(relative);
                    rewritten += 1;
                }
            }

            if let Some(children) = tile.children.as_mut() {
                for (index, child) in children.iter_mut().enumerate() {
                    let mut child_address = address.clone();
                    child_address.push(index);
                    stack.push((child_address, child));
                }
            }
        }

        rewritten
    }
}
