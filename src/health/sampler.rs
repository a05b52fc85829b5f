//! One reachability sample per tick.
//!
//! # Responsibilities
//! - Start the probe without blocking the tick clock
//! - Race it against a fresh per-check deadline
//! - Classify the outcome as success, probe error or timeout
//!
//! # Design Decisions
//! - The probe runs in its own task; losing the race detaches it
//!   rather than aborting it, and it releases its socket when its
//!   own read deadline passes
//! - The probe's read deadline is 1.5x the check timeout so the outer
//!   race, not the socket, normally decides a slow check

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::observability::metrics;
use crate::probe::{ProbeError, Prober};

/// Why a sample counted as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// The outer per-check deadline elapsed first.
    #[error("check timed out after {0:?}")]
    Timeout(Duration),
}

impl CheckError {
    /// Metric label for this failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            CheckError::Probe(_) => "error",
            CheckError::Timeout(_) => "timeout",
        }
    }
}

/// Result of a single sample.
pub type SampleResult = Result<(), CheckError>;

/// Runs probes against one target under an outer deadline.
#[derive(Clone)]
pub struct Sampler {
    prober: Arc<dyn Prober>,
    target: Arc<str>,
    check_timeout: Duration,
    probe_timeout: Duration,
}

impl Sampler {
    pub fn new(prober: Arc<dyn Prober>, target: impl Into<Arc<str>>, check_timeout: Duration) -> Self {
        Self {
            prober,
            target: target.into(),
            check_timeout,
            probe_timeout: check_timeout * 3 / 2,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn check_timeout(&self) -> Duration {
        self.check_timeout
    }

    /// Read deadline handed to the prober.
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Take one sample.
    pub async fn sample(&self) -> SampleResult {
        let start = Instant::now();

        let prober = self.prober.clone();
        let target = self.target.clone();
        let probe_timeout = self.probe_timeout;
        let attempt = tokio::spawn(async move { prober.probe(&target, probe_timeout).await });

        let result = match time::timeout(self.check_timeout, attempt).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => {
                tracing::error!(target_host = %self.target, error = %e, "Probe failed");
                Err(CheckError::Probe(e))
            }
            Ok(Err(e)) => {
                tracing::error!(target_host = %self.target, error = %e, "Probe task aborted");
                Err(CheckError::Probe(ProbeError::Aborted(e.to_string())))
            }
            Err(_) => {
                tracing::error!(
                    target_host = %self.target,
                    timeout = ?self.check_timeout,
                    "Check timed out"
                );
                Err(CheckError::Timeout(self.check_timeout))
            }
        };

        let outcome = match &result {
            Ok(()) => "success",
            Err(e) => e.outcome(),
        };
        metrics::record_sample(outcome, start.elapsed());

        result
    }
}
