//! Alert written to the process log.

use async_trait::async_trait;

use crate::actions::{Action, ActionError, AlertContext};
use crate::health::CheckError;

/// Logs the alert at WARN. Has no external side effect, so dry-run
/// only changes the wording.
pub struct LogAction {
    context: AlertContext,
}

impl LogAction {
    pub fn new(context: AlertContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Action for LogAction {
    async fn trigger(&self, cause: CheckError) -> Result<(), ActionError> {
        tracing::warn!(
            target_host = %self.context.target,
            dry_run = self.context.dry_run,
            "{}",
            self.context.message(&cause)
        );
        Ok(())
    }
}
