//! Configuration management for pixband.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a partial file (or none
//! at all) is valid.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for pixband.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker pool settings
    pub processing: ExecutionConfig,

    /// Input limits
    pub limits: LimitsConfig,

    /// Paths used by `pixband bench`
    pub bench: BenchConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/dev.pixband.pixband/config.toml
    /// - Linux: ~/.config/pixband/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\pixband\config\config.toml
    ///
    /// Falls back to ~/.pixband/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "pixband", "pixband")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".pixband").join("config.toml")
            })
    }

    /// Override the worker count, e.g. from a command-line flag.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        self.processing.workers = workers;
        self.validate()?;
        Ok(self)
    }

    /// Resolved benchmark input image (with ~ expansion).
    pub fn bench_input(&self) -> PathBuf {
        expand(&self.bench.input)
    }

    /// Resolved benchmark output directory (with ~ expansion).
    pub fn bench_output_dir(&self) -> PathBuf {
        expand(&self.bench.output_dir)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.processing.workers >= 1);
        assert_eq!(config.limits.max_file_size_mb, 100);
        assert_eq!(config.output.format, "table");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[bench]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nworkers = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.processing.workers, 3);
        assert_eq!(config.limits.max_image_dimension, 20_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[processing]\nworkers = 0\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("workers"));

        std::fs::write(&path, "processing = \"oops\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_with_workers_override() {
        let config = Config::default().with_workers(5).unwrap();
        assert_eq!(config.processing.workers, 5);
        assert!(Config::default().with_workers(0).is_err());
    }

    #[test]
    fn test_bench_paths_expand_tilde() {
        let mut config = Config::default();
        config.bench.output_dir = PathBuf::from("~/pixband-out");
        assert!(config.bench_output_dir().ends_with("pixband-out"));
        assert_eq!(config.bench_input(), PathBuf::from("inputs/input.jpg"));
    }
}
