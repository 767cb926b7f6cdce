//! Pixband CLI - grayscale and sharpen images on a row-band worker pool.
//!
//! Every transform can run on a single thread (the baseline) or split into
//! one horizontal band of rows per worker. `pixband bench` runs all four
//! variants on one image and reports the speedup.
//!
//! # Usage
//!
//! ```bash
//! # Sharpen an image on all cores
//! pixband sharpen input.jpg output.jpg
//!
//! # Single-threaded grayscale
//! pixband grayscale input.jpg output.png --sequential
//!
//! # Compare baseline and parallel runs on 8 workers
//! pixband --workers 8 bench inputs/input.jpg
//!
//! # View configuration
//! pixband config show
//! ```

use clap::{Parser, Subcommand};
use pixband_core::{Config, TransformKind};
use std::path::PathBuf;

mod cli;
mod logging;

/// Pixband - row-band parallel grayscale and sharpen transforms.
#[derive(Parser, Debug)]
#[command(name = "pixband")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Number of workers for parallel runs (defaults to the config value)
    #[arg(short, long, global = true, env = "PIXBAND_WORKERS")]
    workers: Option<usize>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PIXBAND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image to 8-bit grayscale
    Grayscale(cli::transform::TransformArgs),

    /// Apply a 3x3 sharpen kernel to an image
    Sharpen(cli::transform::TransformArgs),

    /// Run every transform sequentially and in parallel and compare timings
    Bench(cli::bench::BenchArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `pixband config path`."
                );
                Config::default()
            }
        },
    };
    let config = match cli.workers {
        Some(workers) => config.with_workers(workers)?,
        None => config,
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!(
        "Pixband v{} ({} workers)",
        pixband_core::VERSION,
        config.processing.workers
    );

    match cli.command {
        Commands::Grayscale(args) => {
            cli::transform::execute(args, TransformKind::Grayscale, &config)
        }
        Commands::Sharpen(args) => cli::transform::execute(args, TransformKind::Sharpen, &config),
        Commands::Bench(args) => cli::bench::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, cli.config.as_deref()),
    }
}
