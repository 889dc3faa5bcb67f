//! Bulk copy of non-document assets.
//!
//! Every file under the input directory that is not a tileset document is
//! copied to the same relative path under the output directory. Copies run as
//! separate tasks, bounded by a [`ConcurrencyLimiter`].

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use crate::error::{CombineError, CombineResult};
use crate::limiter::ConcurrencyLimiter;
use crate::path::{is_document_path, normalize, relative_to};

/// Outcome of an asset copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Files copied.
    pub files: usize,
    /// Bytes copied.
    pub bytes: u64,
    /// Highest number of copies that were in flight at once.
    pub peak_concurrency: usize,
}

/// Copy every non-document file under `input_dir` into `output_dir`.
///
/// Byte content and relative layout are preserved. If `output_dir` lies inside
/// `input_dir` it is not descended into. The first failed copy aborts the
/// remaining ones.
pub async fn copy_assets(
    input_dir: &Path,
    output_dir: &Path,
    max_concurrent: usize,
) -> CombineResult<CopyStats> {
    let input_dir = normalize(input_dir);
    let output_dir = normalize(output_dir);

    let files = collect_assets(&input_dir, &output_dir).await?;
    debug!(
        count = files.len(),
        input = %input_dir.display(),
        "Collected asset files"
    );

    let limiter = Arc::new(ConcurrencyLimiter::new(max_concurrent, "asset_copy"));
    debug!(
        limiter = limiter.label(),
        max_concurrent = limiter.max_concurrent(),
        "Starting asset copy"
    );
    let mut pending = JoinSet::new();
    let mut stats = CopyStats::default();

    for from in files {
        let to = output_dir.join(relative_to(&from, &input_dir));
        if limiter.available_permits() == 0 {
            trace!(
                limiter = limiter.label(),
                in_flight = limiter.in_flight(),
                "Waiting for a copy slot"
            );
        }
        let permit = limiter.acquire().await?;
        pending.spawn(async move {
            let _permit = permit;
            copy_file(from, to).await
        });

        while let Some(done) = pending.try_join_next() {
            stats.bytes += done??;
            stats.files += 1;
        }
    }

    while let Some(done) = pending.join_next().await {
        stats.bytes += done??;
        stats.files += 1;
    }

    stats.peak_concurrency = limiter.peak_in_flight();
    info!(
        files = stats.files,
        bytes = stats.bytes,
        peak = stats.peak_concurrency,
        "Copied assets"
    );

    Ok(stats)
}

/// Recursively list asset files under `input_dir`, skipping documents and the
/// output directory.
async fn collect_assets(input_dir: &Path, output_dir: &Path) -> CombineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut visited = HashSet::new();
    let mut dirs = vec![input_dir.to_path_buf()];

    while let Some(dir) = dirs.pop() {
        // Symlinked directories are followed once; a link back to an
        // ancestor is skipped.
        let real = tokio::fs::canonicalize(&dir)
            .await
            .map_err(|e| walk_error(&dir, e))?;
        if !visited.insert(real) {
            debug!(path = %dir.display(), "Skipping already visited directory");
            continue;
        }

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| walk_error(&dir, e))?;

        while let Some(entry) = entries.next_entry().await.map_err(|e| walk_error(&dir, e))? {
            let path = entry.path();
            // Follows symlinks, like a plain directory listing would.
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| walk_error(&path, e))?;

            if metadata.is_dir() {
                if path == output_dir {
                    warn!(path = %path.display(), "Skipping output directory nested in input");
                    continue;
                }
                dirs.push(path);
            } else if !is_document_path(&path) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

async fn copy_file(from: PathBuf, to: PathBuf) -> CombineResult<u64> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CombineError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::copy(&from, &to)
        .await
        .map_err(|e| CombineError::Copy { from, to, source: e })
}

fn walk_error(path: &Path, source: io::Error) -> CombineError {
    CombineError::Walk {
        path: path.to_path_buf(),
        source,
    }
}
