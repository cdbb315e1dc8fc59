// Batch interactor - Runs one edit over many files with failure isolation

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::app::edit_interactor::EditInteractor;
use crate::app::overwrite::OverwriteGate;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::PathUtils;
use crate::utils::Utils;

/// Where outputs are written
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    /// Beside each source, with the edit's suffix
    NextToSource,
    /// Into a directory
    Directory(PathBuf),
    /// One explicit file (single input only)
    File(PathBuf),
}

impl OutputTarget {
    /// Interpret an optional output argument
    pub fn resolve(batch: bool, output: Option<&Path>) -> Self {
        match output {
            None => OutputTarget::NextToSource,
            Some(path) if batch || path.is_dir() => OutputTarget::Directory(path.to_path_buf()),
            Some(path) => OutputTarget::File(path.to_path_buf()),
        }
    }

    /// Destination for one source file
    pub fn destination_for(&self, source: &Path, suffix: &str) -> PathBuf {
        match self {
            OutputTarget::NextToSource => PathUtils::derive_output(source, None, suffix),
            OutputTarget::Directory(dir) => PathUtils::derive_output(source, Some(dir), suffix),
            OutputTarget::File(path) => path.clone(),
        }
    }
}

/// Expand an input path into the files to process.
///
/// A file is returned as-is; a directory yields its video files (not
/// recursive) sorted by name.
pub fn collect_inputs(path: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, DomainError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(DomainError::FileNotFound(path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            DomainError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
            }))
        })?;
        if entry.file_type().is_file() && PathUtils::is_video_file(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Interactor for batch runs
pub struct BatchInteractor {
    edit: Arc<EditInteractor>,
    confirm_port: Arc<dyn ConfirmPort>,
    policy: OverwritePolicy,
}

impl BatchInteractor {
    pub fn new(
        edit: Arc<EditInteractor>,
        confirm_port: Arc<dyn ConfirmPort>,
        policy: OverwritePolicy,
    ) -> Self {
        Self {
            edit,
            confirm_port,
            policy,
        }
    }

    /// Apply `spec` to every file in order, isolating per-file failures.
    ///
    /// Missing tools and cancellation stop the run and are returned as errors.
    pub async fn run_batch(
        &self,
        files: &[PathBuf],
        spec: &EditSpec,
        target: &OutputTarget,
    ) -> Result<BatchResult, DomainError> {
        let started = Instant::now();
        let gate = OverwriteGate::new(self.policy, Arc::clone(&self.confirm_port));
        let mut result = BatchResult::new();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        if let OutputTarget::Directory(dir) = target {
            std::fs::create_dir_all(dir)?;
        }

        info!("Processing {} file(s)", files.len());

        for (index, source) in files.iter().enumerate() {
            let mut destination = target.destination_for(source, spec.output_suffix());
            if claimed.contains(&destination) {
                let renamed =
                    PathUtils::disambiguate(&destination, source, |p| claimed.contains(p));
                warn!(
                    "{} is already an output of this run, writing {} instead",
                    destination.display(),
                    renamed.display()
                );
                destination = renamed;
            }
            claimed.insert(destination.clone());
            info!(
                "[{}/{}] {} -> {}",
                index + 1,
                files.len(),
                source.display(),
                destination.display()
            );

            let status = match self.process_one(&gate, source, spec, &destination).await {
                Ok(EditOutcome::Written { destination, .. }) => FileStatus::Succeeded { destination },
                Ok(EditOutcome::Skipped { reason }) => FileStatus::Skipped { reason },
                Err(e) if e.is_fatal() => {
                    error!("Stopping batch at {}: {}", source.display(), e);
                    Self::log_summary(&result, started);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", source.display(), e);
                    FileStatus::Failed {
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    }
                }
            };
            result.record(source.clone(), status);
        }

        Self::log_summary(&result, started);
        Ok(result)
    }

    async fn process_one(
        &self,
        gate: &OverwriteGate,
        source: &Path,
        spec: &EditSpec,
        destination: &Path,
    ) -> Result<EditOutcome, DomainError> {
        if !gate.allows(destination).await? {
            warn!("Skipping {}: {} exists", source.display(), destination.display());
            return Ok(EditOutcome::Skipped {
                reason: format!("{} already exists", destination.display()),
            });
        }
        self.edit.edit(source, spec, destination).await
    }

    fn log_summary(result: &BatchResult, started: Instant) {
        info!(
            "Batch complete in {}: {} succeeded, {} failed, {} skipped",
            Utils::format_duration(started.elapsed()),
            result.success_count(),
            result.failure_count(),
            result.skipped_count()
        );
    }
}
