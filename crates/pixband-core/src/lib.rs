//! Pixband Core - row-band parallel image transforms.
//!
//! Pixband decodes a raster image, applies a grayscale or 3x3 sharpen
//! transform, and encodes the result. Every transform runs either on a single
//! thread or split into horizontal row bands, one band per worker, with each
//! worker writing only its own rows of the shared output.
//!
//! # Architecture
//!
//! ```text
//! File → Decode (16-bit RGBA) → Partition rows → Transform bands → Encode → File
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixband_core::{Config, TransformProcessor};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let processor = TransformProcessor::new(&config);
//!
//!     let bytes = processor.sharpen_parallel(Path::new("in.jpg"), Path::new("out.jpg"))?;
//!     println!("Processed {} bytes on {} workers", bytes, processor.workers());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod transform;

// Re-exports for convenient access
pub use codec::ImageCodec;
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use executor::{ParallelExecutor, SequentialExecutor};
pub use kernel::{Kernel3x3, SHARPEN_KERNEL};
pub use partition::{partition_rows, RowBand};
pub use pipeline::{ExecutionMode, TransformProcessor};
pub use report::{time_run, BenchReport, ReportFormat, RunResult};
pub use source::PixelSource;
pub use transform::{Grayscale, Sharpen, Transform, TransformKind};

/// 16-bit RGBA image buffer (not exported by the `image` crate).
pub type Rgba64Image = image::ImageBuffer<image::Rgba<u16>, Vec<u16>>;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
