//! Configuration for a combine run.

use std::path::{Path, PathBuf};

/// Default ceiling on concurrent asset copies.
pub const DEFAULT_COPY_CONCURRENCY: usize = 1024;

/// File looked up inside the input when it is a directory.
pub const DEFAULT_ENTRY_DOCUMENT: &str = "tileset.json";

/// Suffix appended to the input directory name for the default output.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-combined";

/// Settings for [`crate::combine_tileset`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombineConfig {
    /// Tileset directory or tileset document. Required.
    pub input: Option<PathBuf>,

    /// Output directory. Defaults to `<input-dir>-combined` next to the input.
    pub output: Option<PathBuf>,

    /// Maximum number of asset copies in flight.
    pub copy_concurrency: usize,

    /// Write the combined document with indentation.
    pub pretty: bool,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            copy_concurrency: DEFAULT_COPY_CONCURRENCY,
            pretty: false,
        }
    }
}

impl CombineConfig {
    /// Config for the given input with everything else defaulted.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: Some(input.into()),
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_copy_concurrency(mut self, concurrency: usize) -> Self {
        self.copy_concurrency = concurrency.max(1);
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The input path, treating an empty path as absent.
    pub fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
