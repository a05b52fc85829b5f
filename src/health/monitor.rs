//! The monitoring loop.
//!
//! # Responsibilities
//! - Tick on a fixed period and take one sample per tick
//! - Feed each sample into the failure tracker before the next tick
//! - Fan out the failure cause when the threshold is crossed
//!
//! # Design Decisions
//! - The dispatch is fire-and-forget: probing continues on schedule
//!   while slow actions are still running
//! - Each tick gets a fresh deadline from the sampler, not a shared timer
//! - Shutdown stops the loop; in-flight actions are not drained

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::actions::FanoutDispatcher;
use crate::config::CheckConfig;
use crate::config::validation::ValidationError;
use crate::health::sampler::Sampler;
use crate::health::state::{FailureTracker, Verdict};
use crate::observability::metrics;
use crate::probe::Prober;

/// Long-lived monitor for a single target.
pub struct Monitor {
    sampler: Sampler,
    tracker: FailureTracker,
    dispatcher: FanoutDispatcher,
    interval: Duration,
}

impl Monitor {
    pub fn new(
        sampler: Sampler,
        tracker: FailureTracker,
        dispatcher: FanoutDispatcher,
        interval: Duration,
    ) -> Self {
        Self {
            sampler,
            tracker,
            dispatcher,
            interval,
        }
    }

    /// Build a monitor from the `[check]` section.
    ///
    /// Rejects the values the loop cannot run with: a zero interval or
    /// a zero threshold.
    pub fn from_config(
        config: &CheckConfig,
        prober: Arc<dyn Prober>,
        dispatcher: FanoutDispatcher,
    ) -> Result<Self, ValidationError> {
        if config.interval_ms == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        let threshold = config.threshold().ok_or(ValidationError::ZeroThreshold)?;
        let sampler = Sampler::new(prober, config.target.as_str(), config.timeout());

        Ok(Self::new(
            sampler,
            FailureTracker::new(threshold),
            dispatcher,
            config.interval(),
        ))
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.tracker
    }

    /// Run until the shutdown signal fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            target_host = %self.sampler.target(),
            interval = ?self.interval,
            timeout = ?self.sampler.check_timeout(),
            threshold = self.tracker.threshold().get(),
            actions = self.dispatcher.len(),
            "Monitor starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Take one sample and act on it.
    pub async fn tick(&mut self) -> Verdict {
        let verdict = match self.sampler.sample().await {
            Ok(()) => {
                tracing::info!("Check succeeded");
                self.tracker.record_success()
            }
            Err(cause) => {
                let verdict = self.tracker.record_failure();
                match verdict {
                    Verdict::Tripped => {
                        tracing::error!(
                            threshold = self.tracker.threshold().get(),
                            error = %cause,
                            "Consecutive failures reached threshold, triggering actions"
                        );
                        metrics::record_threshold_crossing();
                        // Not awaited: actions run on their own tasks.
                        drop(self.dispatcher.dispatch(cause));
                    }
                    Verdict::Failing { consecutive } => {
                        tracing::error!(consecutive, error = %cause, "Consecutive failures");
                    }
                    Verdict::Healthy => {}
                }
                verdict
            }
        };

        metrics::record_consecutive_failures(self.tracker.consecutive_failures());
        verdict
    }
}
