// src/logging.rs
//! Logging initialization.
//!
//! Human-readable logs go to stderr. When a log file is configured a JSON
//! layer is added that writes one event per line to it.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config_manager::LoggingConfig;

/// `RUST_LOG` wins over the configured level; `--debug` wins over both.
pub fn build_filter(config: &LoggingConfig, debug_override: bool) -> EnvFilter {
    if debug_override {
        return EnvFilter::new("debug");
    }
    EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone()))
}

pub fn init_logging(config: &LoggingConfig, debug_override: bool) -> Result<()> {
    let filter = build_filter(config, debug_override);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let json_layer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_current_span(false)
                    .with_span_list(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_override_forces_debug() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            log_file: None,
        };
        assert_eq!(build_filter(&config, true).to_string(), "debug");
    }
}
