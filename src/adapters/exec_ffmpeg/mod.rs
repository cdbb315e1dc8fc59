//! FFmpeg execution adapter
//!
//! Spawns the transcoder as a child process, streams its stderr through a
//! reader task for progress and diagnostics, and supports cancellation.

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::progress::{ProgressCallback, ProgressTracker};
use crate::ports::*;

/// Default number of diagnostic characters kept from stderr
pub const DEFAULT_TAIL_CHARS: usize = 500;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    program: String,
    tail_chars: usize,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter for the given program name or path
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            tail_chars: DEFAULT_TAIL_CHARS,
            cancel_rx: None,
        }
    }

    /// Set cancellation signal
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Bound the diagnostic tail reported on failure
    pub fn with_tail_chars(mut self, tail_chars: usize) -> Self {
        self.tail_chars = tail_chars;
        self
    }

    fn resolve(&self) -> Result<PathBuf, DomainError> {
        which::which(&self.program).map_err(|_| DomainError::ToolNotFound(self.program.clone()))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Wait for the child, killing it if cancellation is requested first
    async fn wait_for_completion(&self, child: &mut Child) -> Result<ExitStatus, DomainError> {
        let Some(mut cancel_rx) = self.cancel_rx.clone() else {
            return Ok(child.wait().await?);
        };

        tokio::select! {
            status = child.wait() => return Ok(status?),
            _ = cancelled(&mut cancel_rx) => {}
        }

        info!("Cancellation requested, stopping transcoder");
        let _ = child.kill().await;
        Err(DomainError::Cancelled)
    }
}

/// Resolves once the flag reads `true`; never resolves if the sender is gone
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl TranscodePort for FFmpegAdapter {
    async fn execute(
        &self,
        job: &TranscodeJob,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<ExecutionReport, DomainError> {
        if self.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        let program = self.resolve()?;
        debug!("Running: {} {}", program.display(), job.args().join(" "));

        let started = Instant::now();
        let mut child = Command::new(&program)
            .args(job.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => DomainError::ToolNotFound(self.program.clone()),
                _ => DomainError::Io(e),
            })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "transcoder stderr not captured"))?;

        let label = job.label().to_string();
        let target = job.target_duration();
        let tail_chars = self.tail_chars;
        let reader = tokio::spawn(async move {
            let mut tracker = ProgressTracker::start(&label, target, progress);
            let mut tail = DiagnosticTail::new(tail_chars);
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::with_capacity(256);

            // Drain until EOF; output is not guaranteed to be valid UTF-8
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        for line in decode_lines(&buf) {
                            tracker.observe_line(&line);
                            if !is_progress_line(&line) {
                                tail.push(&line);
                            }
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("Stopped reading transcoder output: {}", e);
                        break;
                    }
                }
            }
            (tracker, tail)
        });

        let waited = self.wait_for_completion(&mut child).await;
        let (tracker, tail) = reader
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                tracker.fail(&e.to_string());
                return Err(e);
            }
        };

        let report = ExecutionReport {
            exit_code: status.code(),
            success: status.success(),
            diagnostic_tail: tail.finish(),
            elapsed: started.elapsed(),
        };

        if report.success {
            tracker.complete();
        } else {
            tracker.fail(&report.diagnostic_tail);
        }
        Ok(report)
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        self.resolve().map(|_| ())
    }
}

/// True for the bare `key=value` lines written by `-progress`
pub fn is_progress_line(line: &str) -> bool {
    let line = line.trim();
    match line.split_once('=') {
        Some((key, _)) => {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        None => false,
    }
}

/// Split one raw chunk into lines, replacing invalid UTF-8.
///
/// Stats output rewrites its line with `\r`, so carriage returns separate
/// lines too.
fn decode_lines(raw: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(raw)
        .split(|c: char| c == '\r' || c == '\n')
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bounded buffer over the last diagnostic lines
struct DiagnosticTail {
    max_chars: usize,
    buffer: String,
}

impl DiagnosticTail {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            buffer: String::new(),
        }
    }

    fn push(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() {
            return;
        }
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);

        // Keep memory bounded on chatty output
        if self.buffer.len() > self.max_chars.saturating_mul(8).max(4096) {
            self.buffer = last_chars(&self.buffer, self.max_chars);
        }
    }

    fn finish(self) -> String {
        last_chars(&self.buffer, self.max_chars)
    }
}

/// The final `max_chars` characters of `text`
pub fn last_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}
