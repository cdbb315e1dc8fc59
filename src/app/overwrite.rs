// Overwrite gate - Applies the overwrite policy to existing destinations

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::OverwritePolicy;
use crate::ports::ConfirmPort;

/// Decides whether an existing destination may be replaced.
///
/// Under `Prompt` the user is asked once; the answer holds for every later
/// destination checked through the same gate.
pub struct OverwriteGate {
    policy: OverwritePolicy,
    confirm_port: Arc<dyn ConfirmPort>,
    remembered: Mutex<Option<bool>>,
}

impl OverwriteGate {
    pub fn new(policy: OverwritePolicy, confirm_port: Arc<dyn ConfirmPort>) -> Self {
        Self {
            policy,
            confirm_port,
            remembered: Mutex::new(None),
        }
    }

    /// True when writing `destination` may proceed
    pub async fn allows(&self, destination: &Path) -> Result<bool, DomainError> {
        if !destination.exists() {
            return Ok(true);
        }

        match self.policy {
            OverwritePolicy::Always => Ok(true),
            OverwritePolicy::Never => Ok(false),
            OverwritePolicy::Prompt => {
                if let Some(answer) = self.remembered() {
                    return Ok(answer);
                }
                let answer = self.confirm_port.confirm_overwrite(destination).await?;
                info!(
                    "Overwrite {} for the rest of this run",
                    if answer { "accepted" } else { "declined" }
                );
                if let Ok(mut remembered) = self.remembered.lock() {
                    *remembered = Some(answer);
                }
                Ok(answer)
            }
        }
    }

    fn remembered(&self) -> Option<bool> {
        self.remembered.lock().ok().and_then(|guard| *guard)
    }
}
