//! Error types for combining tilesets.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for combine operations.
pub type CombineResult<T> = Result<T, CombineError>;

/// Errors that can occur while resolving, writing or copying a tileset tree.
///
/// Any error aborts the whole operation. Output already written to disk is
/// left in place.
#[derive(Debug, Error)]
pub enum CombineError {
    /// No input path was supplied.
    #[error("an input tileset directory or tileset.json path is required")]
    MissingInput,

    /// The input tileset (or a referenced tileset) does not exist.
    #[error("tileset not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read a tileset document.
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The document looked compressed but could not be decompressed.
    #[error("failed to decompress {}: {source}", path.display())]
    Decompress { path: PathBuf, source: io::Error },

    /// The document is not valid tileset JSON.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A tileset references itself through a chain of external tilesets.
    #[error("cycle detected: {} is referenced by one of its own descendants", path.display())]
    Cycle { path: PathBuf },

    /// A path could not be interpreted.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Failed to create an output directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to write the combined tileset.
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    /// Failed to serialize the combined tileset.
    #[error("failed to serialize combined tileset: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Failed to list the input directory.
    #[error("failed to scan {}: {source}", path.display())]
    Walk { path: PathBuf, source: io::Error },

    /// Failed to copy an asset file.
    #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// A background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for CombineError {
    fn from(e: tokio::task::JoinError) -> Self {
        CombineError::Task(e.to_string())
    }
}
