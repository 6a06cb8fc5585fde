//! Diagnostic logging.
//!
//! Structured logging through `tracing`; everything goes to stderr so page and
//! file output on stdout stays clean. `RUST_LOG` overrides the configured level
//! when set.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::ExplorerError;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive: trace, debug, info, warn, error, off, or a full
    /// `EnvFilter` expression such as `condorview=debug`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ExplorerError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| ExplorerError::Logging(format!("invalid log level '{}': {}", config.level, e)))
}

/// Installs the global subscriber. Call once, before anything logs.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ExplorerError> {
    let filter = build_env_filter(config)?;
    let registry = Registry::default().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| ExplorerError::Logging(e.to_string()))
}
