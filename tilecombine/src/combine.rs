//! Combine a tree of tilesets into one tileset plus its assets.
//!
//! # Flow
//!
//! ```text
//! input ──► OutputLayout ──► resolve(root document)
//!                                   │
//!                    ┌──────────────┴──────────────┐
//!                    ▼                             ▼
//!         write merged document           copy non-document assets
//!         (gzip if root was gzip)         (bounded concurrency)
//!                    └──────────────┬──────────────┘
//!                                   ▼
//!                             CombineReport
//! ```
//!
//! The write and the copy touch disjoint files and run concurrently. Output
//! written before a failure is left in place.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::codec::Compression;
use crate::config::{CombineConfig, DEFAULT_ENTRY_DOCUMENT, DEFAULT_OUTPUT_SUFFIX};
use crate::copier::{copy_assets, CopyStats};
use crate::error::{CombineError, CombineResult};
use crate::path::{is_document_path, normalize};
use crate::tileset::{resolve, ResolveStats, Tileset};

/// Where a combine run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Root tileset document.
    pub document_path: PathBuf,
    /// Directory of the root document; asset urls become relative to it.
    pub tileset_dir: PathBuf,
    /// Directory receiving the merged document and the assets.
    pub output_dir: PathBuf,
    /// Path of the merged document.
    pub output_path: PathBuf,
}

impl OutputLayout {
    /// Work out the layout for an input path and optional output directory.
    ///
    /// An input ending in `.json` is the root document, anything else is a
    /// directory containing `tileset.json`. Without an explicit output the
    /// result goes to `<input-dir>-combined` next to the input directory.
    pub fn new(input: &Path, output: Option<&Path>) -> CombineResult<Self> {
        let input = absolute(input)?;
        let document_path = if is_document_path(&input) {
            input
        } else {
            input.join(DEFAULT_ENTRY_DOCUMENT)
        };

        let tileset_dir = document_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                CombineError::InvalidPath(format!(
                    "{} has no parent directory",
                    document_path.display()
                ))
            })?;

        let output_dir = match output {
            Some(dir) => absolute(dir)?,
            None => default_output_dir(&tileset_dir)?,
        };

        if output_dir == tileset_dir {
            return Err(CombineError::InvalidPath(format!(
                "output directory {} is the input directory",
                output_dir.display()
            )));
        }

        let file_name = document_path.file_name().ok_or_else(|| {
            CombineError::InvalidPath(format!("{} has no file name", document_path.display()))
        })?;
        let output_path = output_dir.join(file_name);

        Ok(Self {
            document_path,
            tileset_dir,
            output_dir,
            output_path,
        })
    }
}

/// Summary of a finished combine run.
#[derive(Debug, Clone)]
pub struct CombineReport {
    /// Root document that was combined.
    pub document_path: PathBuf,
    /// Directory the result was written to.
    pub output_dir: PathBuf,
    /// Path of the merged document.
    pub output_path: PathBuf,
    /// Compression of the merged document, taken from the root document.
    pub compression: Compression,
    pub resolve: ResolveStats,
    pub copy: CopyStats,
}

/// Combine the tileset tree described by `config` into a single document.
///
/// Fails with [`CombineError::MissingInput`] before touching the filesystem
/// when no input is configured.
pub async fn combine_tileset(config: &CombineConfig) -> CombineResult<CombineReport> {
    let input = config.input_path().ok_or(CombineError::MissingInput)?;
    let layout = OutputLayout::new(input, config.output.as_deref())?;

    info!(
        input = %layout.document_path.display(),
        output = %layout.output_dir.display(),
        "Combining tileset"
    );

    let resolved = resolve(&layout.document_path, &layout.tileset_dir).await?;
    let compression = resolved.compression;

    let (_, copy) = tokio::try_join!(
        write_document(
            &layout.output_path,
            &resolved.tileset,
            compression,
            config.pretty
        ),
        copy_assets(
            &layout.tileset_dir,
            &layout.output_dir,
            config.copy_concurrency
        ),
    )?;

    info!(
        path = %layout.output_path.display(),
        documents = resolved.stats.documents,
        assets = resolved.stats.assets_rewritten,
        gzip = compression == Compression::Gzip,
        "Wrote combined tileset"
    );

    Ok(CombineReport {
        document_path: layout.document_path,
        output_dir: layout.output_dir,
        output_path: layout.output_path,
        compression,
        resolve: resolved.stats,
        copy,
    })
}

/// Serialize a tileset and write it, gzip-wrapped when `compression` says so.
pub async fn write_document(
    path: &Path,
    tileset: &Tileset,
    compression: Compression,
    pretty: bool,
) -> CombineResult<()> {
    let json = if pretty {
        serde_json::to_vec_pretty(tileset)
    } else {
        serde_json::to_vec(tileset)
    }
    .map_err(CombineError::Serialize)?;

    let data = compression
        .apply(json)
        .map_err(|e| CombineError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CombineError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    tokio::fs::write(path, data)
        .await
        .map_err(|e| CombineError::Write {
            path: path.to_path_buf(),
            source: e,
        })
}

/// `<parent>/<name>-combined` for a tileset directory `<parent>/<name>`.
fn default_output_dir(tileset_dir: &Path) -> CombineResult<PathBuf> {
    let name = tileset_dir.file_name().ok_or_else(|| {
        CombineError::InvalidPath(format!(
            "cannot derive an output directory from {}",
            tileset_dir.display()
        ))
    })?;

    let mut combined = name.to_os_string();
    combined.push(DEFAULT_OUTPUT_SUFFIX);
    Ok(tileset_dir.with_file_name(combined))
}

fn absolute(path: &Path) -> CombineResult<PathBuf> {
    std::path::absolute(path)
        .map(|p| normalize(&p))
        .map_err(|e| CombineError::InvalidPath(format!("{}: {}", path.display(), e)))
}
