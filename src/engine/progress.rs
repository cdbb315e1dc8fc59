//! Progress parsing and reporting for transcoder runs
//!
//! The transcoder is started with `-progress pipe:2`, so its stderr carries
//! `key=value` progress blocks interleaved with diagnostics. Each line is fed
//! to a [`ProgressTracker`], which turns elapsed media time into a
//! [`ProgressSnapshot`] and forwards it to a [`ProgressCallback`].

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;

/// Progress callback trait for UI integration
pub trait ProgressCallback: Send + Sync {
    /// Called when a job starts
    fn on_start(&self, label: &str, target_seconds: Option<f64>);

    /// Called whenever elapsed media time advances
    fn on_progress(&self, snapshot: &ProgressSnapshot);

    /// Called when a job completes successfully
    fn on_complete(&self, label: &str);

    /// Called when a job fails
    fn on_error(&self, label: &str, error: &str);
}

/// Normalized progress signal for one job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub label: String,
    /// Media seconds written so far
    pub elapsed_media: f64,
    /// Expected output length in seconds
    pub target: f64,
    /// `min(elapsed_media / target, 1.0)`
    pub fraction: f64,
    /// Media seconds per wall-clock second
    pub throughput: f64,
    pub eta_seconds: f64,
    pub wall_elapsed: Duration,
}

/// Extract elapsed media time (seconds) from one line of transcoder output.
///
/// Recognizes `out_time_us=<µs>`, `out_time_ms=<µs>` (ffmpeg reports
/// microseconds under this key too), `out_time=HH:MM:SS.ss` and the
/// `time=HH:MM:SS.ss` token of the classic stats line. Negative or `N/A`
/// values are ignored.
pub fn parse_elapsed(line: &str) -> Option<f64> {
    line.split_whitespace().find_map(|token| {
        let (key, value) = token.split_once('=')?;
        match key {
            "out_time_us" | "out_time_ms" => value
                .parse::<i64>()
                .ok()
                .filter(|us| *us >= 0)
                .map(|us| us as f64 / 1_000_000.0),
            "out_time" | "time" => TimeSpec::parse(value).ok().map(|t| t.as_seconds()),
            _ => None,
        }
    })
}

/// Compute the progress signal for a given elapsed media time and wall time
pub fn compute_snapshot(
    label: &str,
    elapsed_media: f64,
    target: f64,
    wall_elapsed: Duration,
) -> Option<ProgressSnapshot> {
    let wall = wall_elapsed.as_secs_f64();
    if target <= 0.0 || elapsed_media <= 0.0 || wall <= 0.0 {
        return None;
    }

    let fraction = (elapsed_media / target).min(1.0);
    Some(ProgressSnapshot {
        label: label.to_string(),
        elapsed_media,
        target,
        fraction,
        throughput: elapsed_media / wall,
        eta_seconds: (wall / fraction - wall).max(0.0),
        wall_elapsed,
    })
}

/// Per-job progress state fed line by line
pub struct ProgressTracker {
    label: String,
    target: Option<f64>,
    started: Instant,
    last_elapsed: f64,
    callback: Arc<dyn ProgressCallback>,
}

impl ProgressTracker {
    /// Create a new progress tracker and announce the job
    pub fn start(label: &str, target: Option<f64>, callback: Arc<dyn ProgressCallback>) -> Self {
        callback.on_start(label, target);
        Self {
            label: label.to_string(),
            target,
            started: Instant::now(),
            last_elapsed: 0.0,
            callback,
        }
    }

    /// Feed one output line; returns the snapshot if progress advanced
    pub fn observe_line(&mut self, line: &str) -> Option<ProgressSnapshot> {
        let elapsed = parse_elapsed(line)?;
        if elapsed <= self.last_elapsed {
            return None;
        }
        self.last_elapsed = elapsed;

        let snapshot =
            compute_snapshot(&self.label, elapsed, self.target?, self.started.elapsed())?;
        self.callback.on_progress(&snapshot);
        Some(snapshot)
    }

    /// Largest elapsed media time seen so far
    pub fn last_elapsed(&self) -> f64 {
        self.last_elapsed
    }

    pub fn complete(&self) {
        self.callback.on_complete(&self.label);
    }

    pub fn fail(&self, error: &str) {
        self.callback.on_error(&self.label, error);
    }
}

/// How progress is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressFormat {
    Console,
    Json,
    None,
}

impl ProgressFormat {
    /// Parse progress format from string
    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        match format_str.to_lowercase().as_str() {
            "console" => Ok(ProgressFormat::Console),
            "json" => Ok(ProgressFormat::Json),
            "none" | "off" => Ok(ProgressFormat::None),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid progress format: {}. Valid formats: console, json, none",
                format_str
            ))),
        }
    }

    pub fn callback(&self) -> Arc<dyn ProgressCallback> {
        match self {
            ProgressFormat::Console => Arc::new(ConsoleProgressCallback::new()),
            ProgressFormat::Json => Arc::new(JsonProgressCallback),
            ProgressFormat::None => Arc::new(NoOpProgressCallback),
        }
    }
}

/// Console progress bar on stderr
pub struct ConsoleProgressCallback {
    bar_length: usize,
}

impl ConsoleProgressCallback {
    pub fn new() -> Self {
        Self { bar_length: 30 }
    }
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_start(&self, label: &str, target_seconds: Option<f64>) {
        match target_seconds {
            Some(target) => eprintln!("   {} ({:.1}s)", label, target),
            None => eprintln!("   {}", label),
        }
    }

    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        let filled = (snapshot.fraction * self.bar_length as f64) as usize;
        let bar = "#".repeat(filled) + &"-".repeat(self.bar_length - filled.min(self.bar_length));
        let mut stderr = io::stderr().lock();
        let _ = write!(
            stderr,
            "\r   [{}] {:>5.1}% | {:.1}x | ETA {:.0}s",
            bar,
            snapshot.fraction * 100.0,
            snapshot.throughput,
            snapshot.eta_seconds
        );
        let _ = stderr.flush();
    }

    fn on_complete(&self, _label: &str) {
        eprintln!();
    }

    fn on_error(&self, label: &str, error: &str) {
        eprintln!();
        eprintln!("   {} failed: {}", label, error);
    }
}

/// JSON progress events on stdout, one object per line
pub struct JsonProgressCallback;

impl ProgressCallback for JsonProgressCallback {
    fn on_start(&self, label: &str, target_seconds: Option<f64>) {
        let event = serde_json::json!({
            "event": "start",
            "job": label,
            "target_seconds": target_seconds,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_progress(&self, snapshot: &ProgressSnapshot) {
        let event = serde_json::json!({
            "event": "progress",
            "job": snapshot.label,
            "elapsed_media": snapshot.elapsed_media,
            "target_seconds": snapshot.target,
            "percent": snapshot.fraction * 100.0,
            "throughput": snapshot.throughput,
            "eta_seconds": snapshot.eta_seconds,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_complete(&self, label: &str) {
        let event = serde_json::json!({
            "event": "complete",
            "job": label,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }

    fn on_error(&self, label: &str, error: &str) {
        let event = serde_json::json!({
            "event": "error",
            "job": label,
            "error": error,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}

/// No-op progress callback for when progress tracking is disabled
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn on_start(&self, _label: &str, _target_seconds: Option<f64>) {}
    fn on_progress(&self, _snapshot: &ProgressSnapshot) {}
    fn on_complete(&self, _label: &str) {}
    fn on_error(&self, _label: &str, _error: &str) {}
}
