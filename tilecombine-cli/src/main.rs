//! combine-tileset - Command-line interface
//!
//! Combines a tileset and all of its external tilesets into a single
//! tileset.json, copying every other asset alongside it.

mod error;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use tilecombine::config::DEFAULT_COPY_CONCURRENCY;
use tilecombine::logging::init_logging;
use tilecombine::{combine_tileset, CombineConfig, Compression};

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "combine-tileset")]
#[command(version, about = "Combine all external tilesets into a single tileset.json", long_about = None)]
struct Args {
    /// Input directory or tileset.json path
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory (default: <input-directory>-combined)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of assets copied at once
    #[arg(short = 'j', long, default_value_t = DEFAULT_COPY_CONCURRENCY)]
    concurrency: usize,

    /// Indent the combined tileset.json
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> CombineConfig {
        let mut config = CombineConfig::new(&self.input)
            .with_copy_concurrency(self.concurrency)
            .with_pretty(self.pretty);
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }
        config
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let _logging_guard =
        init_logging(args.verbose, args.log_file.as_deref()).map_err(CliError::LoggingInit)?;
    info!("combine-tileset v{}", tilecombine::VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let report = runtime.block_on(combine_tileset(&args.to_config()))?;

    println!(
        "Combined {} tilesets into {}{}",
        report.resolve.documents,
        report.output_path.display(),
        if report.compression == Compression::Gzip {
            " (gzip)"
        } else {
            ""
        }
    );
    println!(
        "  Assets: {} urls rewritten, {} files copied",
        report.resolve.assets_rewritten, report.copy.files
    );
    println!("Done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_input_is_required() {
        assert!(Args::try_parse_from(["combine-tileset"]).is_err());
    }

    #[test]
    fn test_short_flags_map_to_config() {
        let args =
            Args::try_parse_from(["combine-tileset", "-i", "data/ts", "-o", "out", "-j", "8"])
                .unwrap();
        let config = args.to_config();

        assert_eq!(config.input, Some(PathBuf::from("data/ts")));
        assert_eq!(config.output, Some(PathBuf::from("out")));
        assert_eq!(config.copy_concurrency, 8);
        assert!(!config.pretty);
    }

    #[test]
    fn test_output_defaults_to_none() {
        let args = Args::try_parse_from(["combine-tileset", "--input", "ts"]).unwrap();
        let config = args.to_config();

        assert!(config.output.is_none());
        assert_eq!(config.copy_concurrency, DEFAULT_COPY_CONCURRENCY);
    }
}
