//! Error types for pixband transforms.
//!
//! Errors are organized by stage so a failure names the file and the step
//! (size lookup, read, decode, encode, write) that produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by a single transform call, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input file exists but could not be read
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes are not a valid, complete image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The encoder rejected the output grid
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Output file could not be created or written
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// The per-call worker pool could not be started
    #[error("Failed to start {workers} worker threads: {message}")]
    WorkerPool { workers: usize, message: String },
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_pipeline_errors_name_the_file() {
        let path = Path::new("inputs/photo.jpg");
        let errors = [
            PipelineError::FileNotFound(path.to_path_buf()),
            PipelineError::Decode {
                path: path.to_path_buf(),
                message: "truncated".into(),
            },
            PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: 200,
                max_mb: 100,
            },
        ];
        for err in errors {
            assert!(err.to_string().contains("inputs/photo.jpg"), "{err}");
        }
    }

    #[test]
    fn test_config_error_from_toml() {
        let err: ConfigError = toml::from_str::<toml::Value>("= nope").unwrap_err().into();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn test_worker_pool_error_message() {
        let err = PipelineError::WorkerPool {
            workers: 4,
            message: "out of threads".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to start 4 worker threads: out of threads"
        );
    }
}
