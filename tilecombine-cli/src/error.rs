//! CLI error handling with user-friendly messages.
//!
//! Centralizes error reporting for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;

use tilecombine::CombineError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Failed to create the async runtime
    Runtime(std::io::Error),
    /// Combining the tileset failed
    Combine(CombineError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Combine(CombineError::NotFound(_)) => {
                eprintln!();
                eprintln!("--input must be a tileset directory containing tileset.json,");
                eprintln!("or the path of a tileset .json file.");
            }
            CliError::Combine(CombineError::Cycle { .. }) => {
                eprintln!();
                eprintln!("An external tileset references itself, directly or through");
                eprintln!("other tilesets. Such a tree cannot be flattened.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Combine(e) => write!(f, "Failed to combine tileset: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Combine(e) => Some(e),
        }
    }
}

impl From<CombineError> for CliError {
    fn from(e: CombineError) -> Self {
        CliError::Combine(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_combine_error_display() {
        let err: CliError = CombineError::NotFound(PathBuf::from("ts/tileset.json")).into();
        let msg = err.to_string();
        assert!(msg.contains("Failed to combine tileset"));
        assert!(msg.contains("ts/tileset.json"));
    }

    #[test]
    fn test_logging_error_has_source() {
        use std::error::Error;
        let err = CliError::LoggingInit(std::io::Error::other("already set"));
        assert!(err.source().is_some());
    }
}
