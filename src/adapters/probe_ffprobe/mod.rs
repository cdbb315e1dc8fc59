//! FFprobe adapter for media duration probing

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::ports::*;

/// FFprobe JSON output, reduced to what duration lookup needs
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    program: String,
    timeout: Duration,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn resolve(&self) -> Result<PathBuf, DomainError> {
        which::which(&self.program).map_err(|_| DomainError::ToolNotFound(self.program.clone()))
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        if !file_path.exists() {
            return Err(DomainError::FileNotFound(file_path.to_path_buf()));
        }

        let program = self.resolve()?;

        let failure = |message: String| DomainError::ProbeFailure {
            path: file_path.to_path_buf(),
            message,
        };

        let mut command = Command::new(program);
        command
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(file_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| failure(format!("timed out after {}s", self.timeout.as_secs())))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!(
                "ffprobe exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let duration = parse_duration_output(&stdout)
            .ok_or_else(|| failure(format!("no usable duration in '{}'", stdout.trim())))?;

        debug!("Probed {}: {:.3}s", file_path.display(), duration);
        Ok(duration)
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        self.resolve().map(|_| ())
    }
}

/// Read a duration from either a bare decimal or ffprobe JSON output
pub fn parse_duration_output(text: &str) -> Option<f64> {
    let text = text.trim();

    let raw = match text.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            let parsed: FfprobeOutput = serde_json::from_str(text).ok()?;
            parsed.format?.duration?.trim().parse::<f64>().ok()?
        }
    };

    Some(raw).filter(|d| d.is_finite() && *d > 0.0)
}
