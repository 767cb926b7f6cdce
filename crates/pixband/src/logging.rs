//! Logging initialization.
//!
//! Log output goes to stderr; stdout carries reports and config output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem.
///
/// `level` is the default filter directive; `RUST_LOG` overrides it when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section and CLI overrides.
pub fn init_from_config(
    config: &pixband_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(default_level(config, verbose_override), json_format);
}

fn default_level(config: &pixband_core::Config, verbose: bool) -> &str {
    if verbose && !matches!(config.logging.level.as_str(), "debug" | "trace") {
        "debug"
    } else {
        &config.logging.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixband_core::Config;

    #[test]
    fn test_default_level() {
        let mut config = Config::default();
        assert_eq!(default_level(&config, false), "info");
        assert_eq!(default_level(&config, true), "debug");

        config.logging.level = "trace".into();
        assert_eq!(default_level(&config, true), "trace");

        config.logging.level = "warn".into();
        assert_eq!(default_level(&config, false), "warn");
    }
}
