//! File-to-file transform operations.
//!
//! Each operation runs size lookup, read, decode, transform, encode and write
//! in that order and stops at the first failure. The output file is created
//! only after encoding has succeeded in memory.

use crate::Rgba64Image;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use crate::codec::ImageCodec;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::executor::{Output, ParallelExecutor, SequentialExecutor};
use crate::transform::{Grayscale, Sharpen, Transform, TransformKind};

/// How a transform is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single-threaded reference run
    Sequential,
    /// One task per row band on the configured number of workers
    Parallel,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Runs transforms from an input file to an output file.
pub struct TransformProcessor {
    codec: ImageCodec,
    sequential: SequentialExecutor,
    parallel: ParallelExecutor,
}

impl TransformProcessor {
    /// Create a processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            codec: ImageCodec::new(config.limits.clone()),
            sequential: SequentialExecutor::new(),
            parallel: ParallelExecutor::from_config(&config.processing),
        }
    }

    /// Worker count used by the parallel operations.
    pub fn workers(&self) -> usize {
        self.parallel.workers()
    }

    /// Grayscale on a single thread. Returns the input size in bytes.
    pub fn grayscale(&self, input: &Path, output: &Path) -> PipelineResult<u64> {
        self.process(input, output, TransformKind::Grayscale, ExecutionMode::Sequential)
    }

    /// Grayscale on the worker pool. Returns the input size in bytes.
    pub fn grayscale_parallel(&self, input: &Path, output: &Path) -> PipelineResult<u64> {
        self.process(input, output, TransformKind::Grayscale, ExecutionMode::Parallel)
    }

    /// Sharpen on a single thread. Returns the input size in bytes.
    pub fn sharpen(&self, input: &Path, output: &Path) -> PipelineResult<u64> {
        self.process(input, output, TransformKind::Sharpen, ExecutionMode::Sequential)
    }

    /// Sharpen on the worker pool. Returns the input size in bytes.
    pub fn sharpen_parallel(&self, input: &Path, output: &Path) -> PipelineResult<u64> {
        self.process(input, output, TransformKind::Sharpen, ExecutionMode::Parallel)
    }

    /// Decode `input`, apply `kind`, and write the encoded result to `output`.
    ///
    /// Returns the size of the input file in bytes. If reading or decoding
    /// fails, `output` is not touched; if writing fails, `output` may be
    /// left empty or partially written.
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        kind: TransformKind,
        mode: ExecutionMode,
    ) -> PipelineResult<u64> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?} -> {:?} ({} {})", input, output, mode, kind);

        let size = file_size(input)?;
        self.codec.check_file_size(input, size)?;

        let read_start = Instant::now();
        let bytes = std::fs::read(input).map_err(|e| read_error(input, e))?;
        tracing::trace!("  Read: {:?}", read_start.elapsed());

        let decode_start = Instant::now();
        let source = self.codec.decode(&bytes, input)?;
        drop(bytes);
        tracing::trace!("  Decode: {:?}", decode_start.elapsed());

        let transform_start = Instant::now();
        let image = self.transform_image(&source, kind, mode)?;
        tracing::trace!("  Transform: {:?}", transform_start.elapsed());

        let encode_start = Instant::now();
        let encoded = self.codec.encode(image, output)?;
        tracing::trace!("  Encode: {:?}", encode_start.elapsed());

        std::fs::write(output, encoded).map_err(|e| PipelineError::Write {
            path: output.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(
            "Processed {:?} in {:?} ({}x{}, {} bytes)",
            input,
            start.elapsed(),
            source.width(),
            source.height(),
            size
        );
        Ok(size)
    }

    /// Apply `kind` to an already decoded source.
    pub fn transform_image(
        &self,
        source: &Rgba64Image,
        kind: TransformKind,
        mode: ExecutionMode,
    ) -> PipelineResult<DynamicImage> {
        let image = match kind {
            TransformKind::Grayscale => {
                DynamicImage::ImageLuma8(self.run(&Grayscale, source, mode)?)
            }
            TransformKind::Sharpen => {
                DynamicImage::ImageRgba8(self.run(&Sharpen::new(), source, mode)?)
            }
        };
        Ok(image)
    }

    fn run<T: Transform>(
        &self,
        transform: &T,
        source: &Rgba64Image,
        mode: ExecutionMode,
    ) -> PipelineResult<Output<T>> {
        match mode {
            ExecutionMode::Sequential => Ok(self.sequential.run(transform, source)),
            ExecutionMode::Parallel => self.parallel.run(transform, source),
        }
    }
}

/// Size of the file at `path` in bytes.
pub fn file_size(path: &Path) -> PipelineResult<u64> {
    std::fs::metadata(path)
        .map(|metadata| metadata.len())
        .map_err(|e| read_error(path, e))
}

fn read_error(path: &Path, source: std::io::Error) -> PipelineError {
    if source.kind() == ErrorKind::NotFound {
        PipelineError::FileNotFound(path.to_path_buf())
    } else {
        PipelineError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_execution_mode_display() {
        assert_eq!(ExecutionMode::Sequential.to_string(), "sequential");
        assert_eq!(ExecutionMode::Parallel.to_string(), "parallel");
    }

    #[test]
    fn test_processor_uses_configured_workers() {
        let config = Config::default().with_workers(6).unwrap();
        assert_eq!(TransformProcessor::new(&config).workers(), 6);
    }

    #[test]
    fn test_transform_image_output_types() {
        let config = Config::default().with_workers(2).unwrap();
        let processor = TransformProcessor::new(&config);
        let source = Rgba64Image::from_pixel(4, 3, Rgba([65535, 0, 0, 65535]));

        let gray = processor
            .transform_image(&source, TransformKind::Grayscale, ExecutionMode::Parallel)
            .unwrap();
        assert!(matches!(gray, DynamicImage::ImageLuma8(_)));

        let sharp = processor
            .transform_image(&source, TransformKind::Sharpen, ExecutionMode::Sequential)
            .unwrap();
        assert!(matches!(sharp, DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn test_file_size_missing_file() {
        let err = file_size(Path::new("/nonexistent/pixband/input.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }
}
