//! Logging setup for the command-line tool.
//!
//! - Human-readable output on stderr, so stdout stays free for results
//! - Optional plain-text log file, cleared at the start of each run
//! - Level controlled by RUST_LOG, defaulting to `info` (`debug` when verbose)

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping it flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Build the level filter.
///
/// `verbose` forces debug output for this crate regardless of RUST_LOG.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("info,tilecombine=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Fails if the log file cannot be created, or if a global subscriber is
/// already installed.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> io::Result<LoggingGuard> {
    let (file_layer, file_guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn file_writer(
    path: &Path,
) -> io::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        )
    })?;

    fs::create_dir_all(dir)?;
    fs::write(dir.join(file_name), "")?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_filter_enables_debug() {
        let filter = build_filter(true);
        assert!(filter.to_string().contains("tilecombine=debug"));
    }

    #[test]
    fn test_file_writer_clears_existing_file() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("logs/combine.log");
        fs::create_dir_all(log_path.parent().unwrap()).unwrap();
        fs::write(&log_path, "old log data").unwrap();

        let (_writer, _guard) = file_writer(&log_path).unwrap();

        assert_eq!(fs::read_to_string(&log_path).unwrap(), "");
    }

    #[test]
    fn test_file_writer_creates_nested_directory() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("deep/nested/combine.log");

        let (_writer, _guard) = file_writer(&log_path).unwrap();

        assert!(log_path.exists());
    }

    #[test]
    fn test_file_writer_rejects_directory_path() {
        assert!(file_writer(Path::new("/")).is_err());
    }
}
