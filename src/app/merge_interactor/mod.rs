// Merge interactor - Concatenates whole files in name order

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::overwrite::OverwriteGate;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::PlanExecutor;
use crate::ports::*;

/// Interactor for lossless concatenation of complete files
pub struct MergeInteractor {
    probe_port: Arc<dyn ProbePort>,
    executor: Arc<PlanExecutor>,
    confirm_port: Arc<dyn ConfirmPort>,
    policy: OverwritePolicy,
}

impl MergeInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        executor: Arc<PlanExecutor>,
        confirm_port: Arc<dyn ConfirmPort>,
        policy: OverwritePolicy,
    ) -> Self {
        Self {
            probe_port,
            executor,
            confirm_port,
            policy,
        }
    }

    /// Concatenate `files` in the given order into `destination`
    pub async fn merge(
        &self,
        files: &[PathBuf],
        destination: &Path,
    ) -> Result<EditOutcome, DomainError> {
        // A previous merge result living in the same directory is not an input
        let inputs: Vec<PathBuf> = files
            .iter()
            .filter(|f| !same_file(f, destination))
            .cloned()
            .collect();

        if inputs.len() < 2 {
            return Err(DomainError::BadArgs(format!(
                "merging needs at least two videos, found {}",
                inputs.len()
            )));
        }

        let gate = OverwriteGate::new(self.policy, Arc::clone(&self.confirm_port));
        if !gate.allows(destination).await? {
            warn!("Not merging: {} exists", destination.display());
            return Ok(EditOutcome::Skipped {
                reason: format!("{} already exists", destination.display()),
            });
        }

        let mut total = 0.0;
        for (index, file) in inputs.iter().enumerate() {
            let duration = self.probe_port.probe_duration(file).await?;
            info!("  {}. {} ({})", index + 1, file.display(), TimeSpec::from_seconds(duration));
            total += duration;
        }
        info!("Merging {} files into {}", inputs.len(), destination.display());

        self.executor.concat_files(&inputs, destination, total).await?;

        info!("Wrote {}", destination.display());
        Ok(EditOutcome::Written {
            destination: destination.to_path_buf(),
            kept_seconds: total,
            segments: inputs.len(),
        })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
