//! Job execution with hardware fallback, and keep-plan materialization

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::builder::{ConcatManifest, JobBuilder};
use crate::engine::progress::ProgressCallback;
use crate::ports::{ExecutionReport, TranscodePort};

/// Runs single jobs through the transcoder port
pub struct TranscodeDriver {
    transcoder: Arc<dyn TranscodePort>,
    progress: Arc<dyn ProgressCallback>,
    fallback: SoftwareProfile,
}

impl TranscodeDriver {
    pub fn new(
        transcoder: Arc<dyn TranscodePort>,
        progress: Arc<dyn ProgressCallback>,
        fallback: SoftwareProfile,
    ) -> Self {
        Self {
            transcoder,
            progress,
            fallback,
        }
    }

    /// Run `job`; a failed hardware job is retried once in software.
    ///
    /// The job's destination is removed whenever the run fails.
    pub async fn run(&self, job: &TranscodeJob) -> Result<ExecutionReport, DomainError> {
        let report = self.attempt(job).await?;
        if report.success {
            return Ok(report);
        }

        match JobBuilder::software_fallback(job, &self.fallback) {
            Some(retry) => {
                warn!(
                    "Hardware encoding failed for '{}' (exit {:?}), retrying with {}",
                    job.label(),
                    report.exit_code,
                    retry.profile().label()
                );
                self.attempt(&retry).await?.into_result()
            }
            None => report.into_result(),
        }
    }

    /// Run `job` once without fallback; a nonzero exit is returned as a report
    pub async fn attempt(&self, job: &TranscodeJob) -> Result<ExecutionReport, DomainError> {
        debug!("Running job '{}' with {}", job.label(), job.profile().label());

        match self.transcoder.execute(job, self.progress.clone()).await {
            Ok(report) if report.success => {
                debug!(
                    "Job '{}' finished in {:.2}s",
                    job.label(),
                    report.elapsed.as_secs_f64()
                );
                Ok(report)
            }
            Ok(report) => {
                remove_partial(job.destination());
                Ok(report)
            }
            Err(e) => {
                remove_partial(job.destination());
                Err(e)
            }
        }
    }

    /// Profile used when hardware encoding fails
    pub fn fallback_profile(&self) -> &SoftwareProfile {
        &self.fallback
    }

    /// Check that the transcoder can be found
    pub fn ensure_available(&self) -> Result<(), DomainError> {
        self.transcoder.ensure_available()
    }
}

fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial output {}: {}", path.display(), e),
    }
}

/// A temp file next to the final destination, renamed into place on success
struct StagedOutput {
    temp: tempfile::TempPath,
}

impl StagedOutput {
    fn prepare(destination: &Path) -> Result<Self, DomainError> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let suffix = format!(".{}", extension_of(destination));
        let temp = tempfile::Builder::new()
            .prefix(".segcut-")
            .suffix(&suffix)
            .tempfile_in(parent)?
            .into_temp_path();
        Ok(Self { temp })
    }

    fn path(&self) -> &Path {
        &self.temp
    }

    fn commit(self, destination: &Path) -> Result<(), DomainError> {
        self.temp
            .persist(destination)
            .map_err(|e| DomainError::Io(e.error))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or("mp4")
        .to_string()
}

enum Extraction {
    Done(Vec<PathBuf>),
    HardwareFailed {
        index: usize,
        report: ExecutionReport,
    },
}

/// Materializes a cut strategy into a destination file
pub struct PlanExecutor {
    driver: TranscodeDriver,
}

impl PlanExecutor {
    pub fn new(driver: TranscodeDriver) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &TranscodeDriver {
        &self.driver
    }

    /// Execute `strategy` against `source`, writing `destination` only on success
    pub async fn execute(
        &self,
        source: &Path,
        strategy: &CutStrategy,
        profile: &EncoderProfile,
        destination: &Path,
    ) -> Result<(), DomainError> {
        let staged = StagedOutput::prepare(destination)?;

        match strategy {
            CutStrategy::SingleCut(interval) => {
                info!("Extracting {}", interval);
                let job = JobBuilder::cut(source, (*interval).into(), profile, staged.path());
                self.driver.run(&job).await?;
            }
            CutStrategy::ExtractAndConcat(intervals) => {
                self.extract_and_concat(source, intervals, profile, staged.path())
                    .await?;
            }
        }

        staged.commit(destination)?;
        Ok(())
    }

    async fn extract_and_concat(
        &self,
        source: &Path,
        intervals: &[Interval],
        profile: &EncoderProfile,
        output: &Path,
    ) -> Result<(), DomainError> {
        // Removed with everything inside when dropped
        let work_dir = tempfile::Builder::new().prefix("segcut-").tempdir()?;
        let extension = extension_of(output);

        let segments = match self
            .extract_segments(source, intervals, profile, work_dir.path(), &extension)
            .await?
        {
            Extraction::Done(segments) => segments,
            Extraction::HardwareFailed { index, report } => {
                // Concatenating with stream copy needs every segment from one encoder
                let software = EncoderProfile::Software(self.driver.fallback_profile().clone());
                warn!(
                    "Hardware encoding failed for segment {}/{} (exit {:?}), re-extracting all segments with {}",
                    index + 1,
                    intervals.len(),
                    report.exit_code,
                    software.label()
                );
                match self
                    .extract_segments(source, intervals, &software, work_dir.path(), &extension)
                    .await?
                {
                    Extraction::Done(segments) => segments,
                    Extraction::HardwareFailed { report, .. } => {
                        return Err(DomainError::Transcode {
                            exit_code: report.exit_code,
                            diagnostic_tail: report.diagnostic_tail,
                        });
                    }
                }
            }
        };

        let manifest_path = work_dir.path().join("concat_list.txt");
        ConcatManifest::new(segments).write_to(&manifest_path)?;

        info!("Concatenating {} segments", intervals.len());
        let kept: f64 = intervals.iter().map(Interval::length).sum();
        let job = JobBuilder::concat(&manifest_path, output, kept);
        self.driver.run(&job).await?;
        Ok(())
    }

    /// Extract every interval with `profile`, stopping at the first failure.
    ///
    /// A failed hardware segment is reported back instead of retried on its own.
    async fn extract_segments(
        &self,
        source: &Path,
        intervals: &[Interval],
        profile: &EncoderProfile,
        work_dir: &Path,
        extension: &str,
    ) -> Result<Extraction, DomainError> {
        let total = intervals.len();
        let mut segments = Vec::with_capacity(total);

        for (index, interval) in intervals.iter().enumerate() {
            let segment = work_dir.join(format!("segment_{:03}.{}", index, extension));
            info!("Extracting segment {}/{}: {}", index + 1, total, interval);

            let job = JobBuilder::cut(source, (*interval).into(), profile, &segment)
                .with_label(format!("segment {}/{}", index + 1, total));
            let report = self.driver.attempt(&job).await?;
            if !report.success {
                if profile.is_hardware() {
                    return Ok(Extraction::HardwareFailed { index, report });
                }
                report.into_result()?;
            }
            segments.push(segment);
        }

        Ok(Extraction::Done(segments))
    }

    /// Concatenate whole files losslessly into `destination`.
    ///
    /// `total_seconds` is the combined input length, used for progress.
    pub async fn concat_files(
        &self,
        files: &[PathBuf],
        destination: &Path,
        total_seconds: f64,
    ) -> Result<(), DomainError> {
        let staged = StagedOutput::prepare(destination)?;
        let work_dir = tempfile::Builder::new().prefix("segcut-").tempdir()?;

        let entries = files
            .iter()
            .map(|f| fs::canonicalize(f).map_err(DomainError::from))
            .collect::<Result<Vec<_>, _>>()?;
        let manifest_path = work_dir.path().join("concat_list.txt");
        ConcatManifest::new(entries).write_to(&manifest_path)?;

        let job = JobBuilder::concat(&manifest_path, staged.path(), total_seconds)
            .with_label(format!("merge {} files", files.len()));
        self.driver.run(&job).await?;

        staged.commit(destination)?;
        Ok(())
    }
}
