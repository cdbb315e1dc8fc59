// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::ports::LogLevel;

/// Subscriber settings resolved from CLI and config
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub json: bool,
}

impl LogSettings {
    pub fn new(level: &str, json: bool) -> Result<Self, DomainError> {
        Ok(Self {
            level: LogLevel::parse(level)?,
            json,
        })
    }

    /// `RUST_LOG` wins; otherwise the configured level for every target
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_logging(settings: &LogSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if settings.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}
