// Domain errors - Error types for the domain layer

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug)]
pub enum DomainError {
    /// Malformed time or range syntax
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The requested edit leaves nothing to keep
    #[error("Nothing to keep: {0}")]
    EmptyResult(String),

    /// Duration lookup failed or timed out
    #[error("Probe failed for {}: {message}", .path.display())]
    ProbeFailure { path: PathBuf, message: String },

    /// External transcoder exited with a nonzero status
    #[error("Transcoder exited with {}: {diagnostic_tail}", describe_exit(.exit_code))]
    Transcode {
        exit_code: Option<i32>,
        diagnostic_tail: String,
    },

    /// External tool is missing from the environment
    #[error("Required tool not found: {0}")]
    ToolNotFound(String),

    /// Input file not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The run was cancelled before the job finished
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DomainError {
    /// Errors that make every remaining file fail the same way
    pub fn is_fatal(&self) -> bool {
        matches!(self, DomainError::ToolNotFound(_) | DomainError::Cancelled)
    }

    /// Short machine-friendly name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidFormat(_) => "invalid_format",
            DomainError::EmptyResult(_) => "empty_result",
            DomainError::ProbeFailure { .. } => "probe_failure",
            DomainError::Transcode { .. } => "transcode_error",
            DomainError::ToolNotFound(_) => "tool_not_found",
            DomainError::FileNotFound(_) => "file_not_found",
            DomainError::BadArgs(_) => "bad_args",
            DomainError::Config(_) => "config",
            DomainError::Cancelled => "cancelled",
            DomainError::Io(_) => "io",
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;
