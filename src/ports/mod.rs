// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::ProgressCallback;

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file in seconds
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError>;

    /// Check that the prober can be found
    fn ensure_available(&self) -> Result<(), DomainError>;
}

/// Result of one finished transcoder process
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    /// Process exit code; `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Last diagnostic output, bounded in length
    pub diagnostic_tail: String,
    pub elapsed: Duration,
}

impl ExecutionReport {
    /// Turn a nonzero exit into a transcode error
    pub fn into_result(self) -> Result<ExecutionReport, DomainError> {
        if self.success {
            Ok(self)
        } else {
            Err(DomainError::Transcode {
                exit_code: self.exit_code,
                diagnostic_tail: self.diagnostic_tail,
            })
        }
    }
}

/// Port for running transcoder jobs
#[async_trait]
pub trait TranscodePort: Send + Sync {
    /// Run one job to completion.
    ///
    /// A process that starts and exits nonzero is reported through
    /// `ExecutionReport`, not as an error. Errors are reserved for a missing
    /// tool, spawn failures and cancellation.
    async fn execute(
        &self,
        job: &TranscodeJob,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<ExecutionReport, DomainError>;

    /// Check that the transcoder can be found
    fn ensure_available(&self) -> Result<(), DomainError>;
}

/// Port for interactive confirmation
#[async_trait]
pub trait ConfirmPort: Send + Sync {
    /// Ask whether an existing destination may be overwritten
    async fn confirm_overwrite(&self, destination: &Path) -> Result<bool, DomainError>;
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
