//! The `pixband grayscale` and `pixband sharpen` commands.

use clap::Args;
use pixband_core::{time_run, Config, ExecutionMode, TransformKind, TransformProcessor};
use std::path::PathBuf;

/// Arguments shared by the transform commands.
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Image file to read
    pub input: PathBuf,

    /// Where to write the result (format from extension, JPEG if unknown)
    pub output: PathBuf,

    /// Run on the calling thread instead of the worker pool
    #[arg(long)]
    pub sequential: bool,
}

impl TransformArgs {
    fn mode(&self) -> ExecutionMode {
        if self.sequential {
            ExecutionMode::Sequential
        } else {
            ExecutionMode::Parallel
        }
    }
}

/// Execute a transform command.
pub fn execute(args: TransformArgs, kind: TransformKind, config: &Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input not found: {}", args.input.display());
    }

    let processor = TransformProcessor::new(config);
    let mode = args.mode();
    let label = format!("{} ({})", kind, mode);

    let run = time_run(&label, kind, mode, processor.workers(), || {
        processor.process(&args.input, &args.output, kind, mode)
    })?;

    println!(
        "{} -> {} ({} bytes, {:.0}ms, {} worker{})",
        args.input.display(),
        args.output.display(),
        run.file_size,
        run.duration_ms,
        run.workers,
        if run.workers == 1 { "" } else { "s" }
    );
    Ok(())
}
