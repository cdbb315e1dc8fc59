// Edit interactor - Probes, plans and executes one file edit

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::PlanExecutor;
use crate::ports::*;
use crate::utils::path::PathUtils;

/// Interactor for the per-file edit pipeline
pub struct EditInteractor {
    probe_port: Arc<dyn ProbePort>,
    executor: Arc<PlanExecutor>,
    profile: EncoderProfile,
}

impl EditInteractor {
    /// Create new edit interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        executor: Arc<PlanExecutor>,
        profile: EncoderProfile,
    ) -> Self {
        Self {
            probe_port,
            executor,
            profile,
        }
    }

    pub fn profile(&self) -> &EncoderProfile {
        &self.profile
    }

    /// Apply `spec` to `source`, writing `destination`.
    ///
    /// Edits that keep the whole source are skipped without invoking the
    /// transcoder.
    pub async fn edit(
        &self,
        source: &Path,
        spec: &EditSpec,
        destination: &Path,
    ) -> Result<EditOutcome, DomainError> {
        if !source.is_file() {
            return Err(DomainError::FileNotFound(source.to_path_buf()));
        }
        PathUtils::ensure_distinct(source, destination)?;

        let duration = self.probe_port.probe_duration(source).await?;
        info!(
            "{}: duration {:.2}s ({})",
            source.display(),
            duration,
            TimeSpec::from_seconds(duration)
        );

        let plan = EditPlanner::resolve(spec, duration)?;
        if plan.is_noop() {
            info!("{}: edit keeps the entire video, skipping", source.display());
            return Ok(EditOutcome::Skipped {
                reason: "edit keeps the entire video".to_string(),
            });
        }

        for removed in IntervalPlanner::complement(&plan, duration) {
            info!("Removing {}", removed);
        }

        let strategy = StrategySelector::select(&plan)?;
        info!(
            "Keeping {:.2}s of {:.2}s in {} segment(s), {} with {}",
            plan.kept_seconds(),
            duration,
            plan.len(),
            strategy.name(),
            self.profile.label()
        );

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        self.executor
            .execute(source, &strategy, &self.profile, destination)
            .await?;

        info!("Wrote {}", destination.display());
        Ok(EditOutcome::Written {
            destination: destination.to_path_buf(),
            kept_seconds: plan.kept_seconds(),
            segments: strategy.segment_count(),
        })
    }
}
