//! Structured logging via the `tracing` crate.
//!
//! The drift warning from `track` and the activity messages from `fetch`
//! and `stage` go through the subscriber installed here. Callers embedding
//! the library in a larger tool can skip this and install their own.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// The `TREEMIRROR_LOG` environment variable overrides the configured
/// level and accepts full `EnvFilter` directives.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), SourceError> {
    let filter = build_env_filter(config);
    let base = Registry::default().with(filter);

    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(SourceError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }

    if format == "json" {
        base.with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();
    } else {
        let use_color = config.map(|c| c.color).unwrap_or(true);
        base.with(
            fmt::layer()
                .with_target(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(use_color)
                .with_writer(std::io::stderr),
        )
        .init();
    }

    Ok(())
}

fn build_env_filter(config: Option<&LoggingConfig>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env("TREEMIRROR_LOG") {
        return filter;
    }
    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    EnvFilter::new(level)
}
