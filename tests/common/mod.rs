//! Shared test doubles for the port traits

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use segcut_cli::adapters::AppConfig;
use segcut_cli::app::container::DefaultAppContainer;
use segcut_cli::domain::errors::DomainError;
use segcut_cli::domain::model::{JobInput, TranscodeJob};
use segcut_cli::engine::progress::{NoOpProgressCallback, ProgressCallback};
use segcut_cli::ports::{ConfirmPort, ExecutionReport, ProbePort, TranscodePort};

/// Probe returning canned durations keyed by file name
pub struct FakeProbe {
    durations: HashMap<String, f64>,
}

impl FakeProbe {
    pub fn new(entries: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            durations: entries
                .iter()
                .map(|(name, d)| (name.to_string(), *d))
                .collect(),
        })
    }
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        let name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.durations
            .get(&name)
            .copied()
            .ok_or_else(|| DomainError::ProbeFailure {
                path: file_path.to_path_buf(),
                message: "unknown test file".to_string(),
            })
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// How the fake transcoder responds to jobs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Succeed,
    /// Hardware jobs exit nonzero, everything else succeeds
    FailHardware,
    /// Only the hardware job with this label exits nonzero
    FailHardwareLabel(&'static str),
    /// Every job exits nonzero
    FailAll,
    /// Every job reports the tool as missing
    Missing,
    /// Every job reports cancellation
    Cancel,
}

/// Transcoder that records jobs and writes placeholder outputs
pub struct FakeTranscoder {
    behavior: Behavior,
    jobs: Mutex<Vec<TranscodeJob>>,
    manifests: Mutex<Vec<String>>,
}

impl FakeTranscoder {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            jobs: Mutex::new(Vec::new()),
            manifests: Mutex::new(Vec::new()),
        })
    }

    pub fn jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.lock().unwrap().clone()
    }

    /// Manifest contents captured while the concat job ran
    pub fn manifests(&self) -> Vec<String> {
        self.manifests.lock().unwrap().clone()
    }

    fn report(success: bool) -> ExecutionReport {
        ExecutionReport {
            exit_code: Some(if success { 0 } else { 1 }),
            success,
            diagnostic_tail: if success {
                String::new()
            } else {
                "Error initializing output stream".to_string()
            },
            elapsed: Duration::from_millis(5),
        }
    }
}

#[async_trait]
impl TranscodePort for FakeTranscoder {
    async fn execute(
        &self,
        job: &TranscodeJob,
        progress: Arc<dyn ProgressCallback>,
    ) -> Result<ExecutionReport, DomainError> {
        self.jobs.lock().unwrap().push(job.clone());
        progress.on_start(job.label(), job.target_duration());

        match self.behavior {
            Behavior::Missing => return Err(DomainError::ToolNotFound("ffmpeg".to_string())),
            Behavior::Cancel => return Err(DomainError::Cancelled),
            Behavior::FailAll => {
                fs::write(job.destination(), b"partial").unwrap();
                return Ok(Self::report(false));
            }
            Behavior::FailHardware if job.profile().is_hardware() => {
                fs::write(job.destination(), b"partial").unwrap();
                return Ok(Self::report(false));
            }
            Behavior::FailHardwareLabel(label)
                if job.profile().is_hardware() && job.label() == label =>
            {
                fs::write(job.destination(), b"partial").unwrap();
                return Ok(Self::report(false));
            }
            _ => {}
        }

        if let JobInput::ConcatManifest(manifest) = job.input() {
            let text = fs::read_to_string(manifest).unwrap();
            self.manifests.lock().unwrap().push(text);
        }
        fs::write(job.destination(), job.label().as_bytes()).unwrap();
        progress.on_complete(job.label());
        Ok(Self::report(true))
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        match self.behavior {
            Behavior::Missing => Err(DomainError::ToolNotFound("ffmpeg".to_string())),
            _ => Ok(()),
        }
    }
}

/// Confirmation port with a fixed answer that counts questions
pub struct FakeConfirm {
    answer: bool,
    asked: AtomicUsize,
}

impl FakeConfirm {
    pub fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: AtomicUsize::new(0),
        })
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmPort for FakeConfirm {
    async fn confirm_overwrite(&self, _destination: &Path) -> Result<bool, DomainError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

pub fn container(
    config: &AppConfig,
    probe: Arc<FakeProbe>,
    transcoder: Arc<FakeTranscoder>,
    confirm: Arc<FakeConfirm>,
) -> DefaultAppContainer {
    DefaultAppContainer::with_ports(
        config,
        probe,
        transcoder,
        confirm,
        Arc::new(NoOpProgressCallback),
    )
}

/// Create empty placeholder videos in `dir`
pub fn touch(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, b"video").unwrap();
            path
        })
        .collect()
}
