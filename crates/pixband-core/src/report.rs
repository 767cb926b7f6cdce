//! Timing of transform runs and the baseline-versus-parallel report.
//!
//! Each run is labeled explicitly and timed around the full file-to-file
//! operation. The report pairs every parallel run with the sequential run of
//! the same transform and derives speedup and daily throughput from them.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::time::Instant;

use crate::error::PipelineResult;
use crate::pipeline::ExecutionMode;
use crate::transform::TransformKind;

const MS_PER_DAY: f64 = 86_400_000.0;
const BYTES_PER_GB: f64 = 1_073_741_824.0;

/// Outcome of one timed transform run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Human-readable name of the run
    pub label: String,
    pub kind: TransformKind,
    pub mode: ExecutionMode,
    /// Size of the input file in bytes
    pub file_size: u64,
    /// Wall-clock time of the whole operation
    pub duration_ms: f64,
    /// Workers the run used (1 for sequential runs)
    pub workers: usize,
}

/// Time `run`, which returns the input size in bytes, and label the result.
///
/// Errors from `run` are returned unchanged.
pub fn time_run<F>(
    label: &str,
    kind: TransformKind,
    mode: ExecutionMode,
    workers: usize,
    run: F,
) -> PipelineResult<RunResult>
where
    F: FnOnce() -> PipelineResult<u64>,
{
    tracing::info!("Running: {}", label);
    let start = Instant::now();
    let file_size = run()?;
    let elapsed = start.elapsed();
    tracing::info!("  {} complete in {:?}", label, elapsed);

    Ok(RunResult {
        label: label.to_string(),
        kind,
        mode,
        file_size,
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        workers: match mode {
            ExecutionMode::Sequential => 1,
            ExecutionMode::Parallel => workers,
        },
    })
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Column-aligned table for terminals
    Table,
    /// Single JSON object
    Json,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Some(Self::Table),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Maximum sustained throughput, extrapolated to a full day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Throughput {
    pub baseline_gb_per_day: f64,
    pub optimized_gb_per_day: f64,
}

/// A set of runs sharing one worker count.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    /// Worker count of every parallel run
    pub workers: usize,
    pub runs: Vec<RunResult>,
}

impl BenchReport {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            runs: Vec::new(),
        }
    }

    pub fn push(&mut self, run: RunResult) {
        self.runs.push(run);
    }

    /// The sequential run of `kind`, if any.
    pub fn baseline(&self, kind: TransformKind) -> Option<&RunResult> {
        self.find(kind, ExecutionMode::Sequential)
    }

    fn find(&self, kind: TransformKind, mode: ExecutionMode) -> Option<&RunResult> {
        self.runs.iter().find(|r| r.kind == kind && r.mode == mode)
    }

    /// Speedup of a parallel run over its baseline.
    ///
    /// `None` for sequential runs, missing baselines and zero durations.
    pub fn gain(&self, run: &RunResult) -> Option<f64> {
        if run.mode != ExecutionMode::Parallel || run.duration_ms <= 0.0 {
            return None;
        }
        let baseline = self.baseline(run.kind)?;
        Some(baseline.duration_ms / run.duration_ms)
    }

    /// Throughput of all baselines versus all parallel runs.
    ///
    /// Only available once both transforms have run in both modes.
    pub fn throughput(&self) -> Option<Throughput> {
        let kinds = [TransformKind::Grayscale, TransformKind::Sharpen];
        let mut baseline = (0u64, 0f64);
        let mut optimized = (0u64, 0f64);
        for kind in kinds {
            let seq = self.find(kind, ExecutionMode::Sequential)?;
            let par = self.find(kind, ExecutionMode::Parallel)?;
            baseline = (baseline.0 + seq.file_size, baseline.1 + seq.duration_ms);
            optimized = (optimized.0 + par.file_size, optimized.1 + par.duration_ms);
        }
        Some(Throughput {
            baseline_gb_per_day: gb_per_day(baseline.0, baseline.1)?,
            optimized_gb_per_day: gb_per_day(optimized.0, optimized.1)?,
        })
    }

    /// Render the report as a column-aligned table.
    pub fn render_table(&self) -> String {
        let header = [
            "Function",
            "File Size",
            "Execution Time",
            "Performance Gain",
            "Concurrency",
        ];
        let rows: Vec<[String; 5]> = self
            .runs
            .iter()
            .map(|run| {
                let gain = match run.mode {
                    ExecutionMode::Sequential => "(baseline)".to_string(),
                    ExecutionMode::Parallel => self
                        .gain(run)
                        .map(|g| format!("{:.2}x", g))
                        .unwrap_or_else(|| "-".to_string()),
                };
                [
                    run.label.clone(),
                    format!("{} Bytes", run.file_size),
                    format!("{:.0}ms", run.duration_ms),
                    gain,
                    run.workers.to_string(),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        push_row(&mut out, &header, &widths);
        for row in &rows {
            push_row(&mut out, row, &widths);
        }

        if let Some(throughput) = self.throughput() {
            out.push('\n');
            let _ = writeln!(
                out,
                "Max Baseline Throughput Per Day (GB):  {:.2}",
                throughput.baseline_gb_per_day
            );
            let _ = writeln!(
                out,
                "Max Optimized Throughput Per Day (GB): {:.2}",
                throughput.optimized_gb_per_day
            );
        }
        out
    }

    /// Write the report to `writer` in `format`.
    ///
    /// `pretty` only affects JSON output.
    pub fn write_to<W: Write>(
        &self,
        mut writer: W,
        format: ReportFormat,
        pretty: bool,
    ) -> io::Result<()> {
        match format {
            ReportFormat::Table => {
                writer.write_all(self.render_table().as_bytes())?;
            }
            ReportFormat::Json => {
                let summary = JsonReport {
                    workers: self.workers,
                    runs: &self.runs,
                    throughput: self.throughput(),
                };
                if pretty {
                    serde_json::to_writer_pretty(&mut writer, &summary).map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut writer, &summary).map_err(io::Error::other)?;
                }
                writeln!(writer)?;
            }
        }
        writer.flush()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    workers: usize,
    runs: &'a [RunResult],
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput: Option<Throughput>,
}

fn gb_per_day(bytes: u64, duration_ms: f64) -> Option<f64> {
    if duration_ms <= 0.0 {
        return None;
    }
    Some(bytes as f64 / duration_ms * MS_PER_DAY / BYTES_PER_GB)
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    for (cell, width) in cells.iter().zip(widths) {
        let _ = write!(out, "{:<width$}   |", cell.as_ref(), width = width);
    }
    out.push('\n');
}
