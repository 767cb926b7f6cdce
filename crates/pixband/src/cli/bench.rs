//! The `pixband bench` command: baseline versus parallel on one image.

use clap::{Args, ValueEnum};
use pixband_core::{
    time_run, BenchReport, Config, ExecutionMode, ReportFormat, TransformKind, TransformProcessor,
};
use std::io;
use std::path::{Path, PathBuf};

use super::profile::{profile_file_name, CpuProfiler};

/// Report format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Column-aligned table
    Table,
    /// JSON object
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Table => ReportFormat::Table,
            Format::Json => ReportFormat::Json,
        }
    }
}

/// Arguments for the `bench` command.
#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Input image (defaults to `bench.input` from the config)
    pub input: Option<PathBuf>,

    /// Directory for the four output images (defaults to `bench.output_dir`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Report format (defaults to `output.format` from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write a CPU profile of each run to this directory
    #[arg(long, value_name = "DIR")]
    pub profile: Option<PathBuf>,
}

/// The four runs in report order: label, transform, mode, file stem.
///
/// Each run writes `<stem>.jpg` and, when profiling, `cpu-<stem>.pb`.
const RUNS: [(&str, TransformKind, ExecutionMode, &str); 4] = [
    (
        "Grayscale",
        TransformKind::Grayscale,
        ExecutionMode::Sequential,
        "grayscale",
    ),
    (
        "Grayscale (parallel)",
        TransformKind::Grayscale,
        ExecutionMode::Parallel,
        "grayscale_parallel",
    ),
    (
        "Sharpen",
        TransformKind::Sharpen,
        ExecutionMode::Sequential,
        "sharpen",
    ),
    (
        "Sharpen (parallel)",
        TransformKind::Sharpen,
        ExecutionMode::Parallel,
        "sharpen_parallel",
    ),
];

/// Execute the bench command.
pub fn execute(args: BenchArgs, config: &Config) -> anyhow::Result<()> {
    let input = args.input.unwrap_or_else(|| config.bench_input());
    let output_dir = args
        .output_dir
        .unwrap_or_else(|| config.bench_output_dir());

    if !input.exists() {
        anyhow::bail!(
            "Input not found: {}\nPass an image path or set bench.input in the config.",
            input.display()
        );
    }
    std::fs::create_dir_all(&output_dir)?;
    if let Some(dir) = &args.profile {
        std::fs::create_dir_all(dir)?;
    }

    let report = run_all(config, &input, &output_dir, args.profile.as_deref())?;

    let format = match args.format {
        Some(format) => format.into(),
        None => ReportFormat::parse(&config.output.format).unwrap_or(ReportFormat::Table),
    };
    let pretty = args.pretty || config.output.pretty;
    report.write_to(io::stdout().lock(), format, pretty)?;
    Ok(())
}

/// Run every transform in both modes, stopping at the first failure.
///
/// With `profile_dir`, each run is wrapped in a CPU profiler whose output
/// lands in that directory.
pub fn run_all(
    config: &Config,
    input: &Path,
    output_dir: &Path,
    profile_dir: Option<&Path>,
) -> anyhow::Result<BenchReport> {
    let processor = TransformProcessor::new(config);
    let mut report = BenchReport::new(processor.workers());
    tracing::info!("Benchmarking {:?} on {} workers", input, processor.workers());

    for (label, kind, mode, stem) in RUNS {
        let output = output_dir.join(format!("{stem}.jpg"));
        let profiler = match profile_dir {
            Some(_) => Some(CpuProfiler::start()?),
            None => None,
        };
        let run = time_run(label, kind, mode, processor.workers(), || {
            processor.process(input, &output, kind, mode)
        })?;
        if let (Some(profiler), Some(dir)) = (profiler, profile_dir) {
            profiler.finish(&dir.join(profile_file_name(stem)))?;
        }
        report.push(run);
    }
    Ok(report)
}
