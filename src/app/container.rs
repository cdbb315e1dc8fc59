use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::adapters::{AppConfig, ConsoleConfirmAdapter, FFmpegAdapter, FFprobeAdapter};
use crate::app::{BatchInteractor, EditInteractor, MergeInteractor};
use crate::domain::errors::DomainError;
use crate::engine::{PlanExecutor, ProgressCallback, TranscodeDriver};
use crate::ports::{ConfirmPort, ProbePort, TranscodePort};

pub trait AppContainer: Send + Sync {
    fn edit_interactor(&self) -> Arc<EditInteractor>;
    fn batch_interactor(&self) -> Arc<BatchInteractor>;
    fn merge_interactor(&self) -> Arc<MergeInteractor>;

    /// Fail early when an external tool is missing
    fn ensure_tools(&self) -> Result<(), DomainError>;
}

pub struct DefaultAppContainer {
    probe_port: Arc<dyn ProbePort>,
    transcode_port: Arc<dyn TranscodePort>,
    edit_interactor: Arc<EditInteractor>,
    batch_interactor: Arc<BatchInteractor>,
    merge_interactor: Arc<MergeInteractor>,
}

impl DefaultAppContainer {
    /// Wire the real adapters from configuration
    pub fn new(config: &AppConfig, cancel_rx: watch::Receiver<bool>) -> Self {
        let probe_port = Arc::new(FFprobeAdapter::new(
            config.tools.ffprobe.clone(),
            Duration::from_secs(config.tools.probe_timeout_secs),
        ));
        let transcode_port = Arc::new(
            FFmpegAdapter::new(config.tools.ffmpeg.clone())
                .with_tail_chars(config.tools.diagnostic_tail_chars)
                .with_cancel(cancel_rx),
        );
        let confirm_port = Arc::new(ConsoleConfirmAdapter::new());

        Self::with_ports(
            config,
            probe_port,
            transcode_port,
            confirm_port,
            config.progress.format.callback(),
        )
    }

    /// Wire the interactors around the given ports
    pub fn with_ports(
        config: &AppConfig,
        probe_port: Arc<dyn ProbePort>,
        transcode_port: Arc<dyn TranscodePort>,
        confirm_port: Arc<dyn ConfirmPort>,
        progress: Arc<dyn ProgressCallback>,
    ) -> Self {
        let driver = TranscodeDriver::new(
            Arc::clone(&transcode_port),
            progress,
            config.encoding.software_profile(),
        );
        let executor = Arc::new(PlanExecutor::new(driver));

        let edit_interactor = Arc::new(EditInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&executor),
            config.encoding.profile(),
        ));

        let batch_interactor = Arc::new(BatchInteractor::new(
            Arc::clone(&edit_interactor),
            Arc::clone(&confirm_port),
            config.output.overwrite,
        ));

        let merge_interactor = Arc::new(MergeInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&executor),
            Arc::clone(&confirm_port),
            config.output.overwrite,
        ));

        Self {
            probe_port,
            transcode_port,
            edit_interactor,
            batch_interactor,
            merge_interactor,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn edit_interactor(&self) -> Arc<EditInteractor> {
        Arc::clone(&self.edit_interactor)
    }

    fn batch_interactor(&self) -> Arc<BatchInteractor> {
        Arc::clone(&self.batch_interactor)
    }

    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }

    fn ensure_tools(&self) -> Result<(), DomainError> {
        self.transcode_port.ensure_available()?;
        self.probe_port.ensure_available()
    }
}
