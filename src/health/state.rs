//! Consecutive-failure state machine.
//!
//! # States
//! - Healthy: counter below threshold
//! - Tripped: counter reached threshold, trigger fires
//!
//! # State Transitions
//! ```text
//! any     --success-->  Healthy (counter = 0)
//! Healthy --failure-->  Healthy (counter += 1)       if counter < threshold
//! Healthy --failure-->  Tripped → Healthy (counter = 0) if counter == threshold
//! ```
//!
//! # Design Decisions
//! - The tracker never stays latched; a fresh run of failures starts
//!   right after a trip, so a sustained outage fires once per threshold
//! - Owned by the monitor loop alone, so the counter is a plain integer

use std::num::NonZeroU32;

/// Outcome of feeding one sample into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The sample succeeded; the counter is zero.
    Healthy,
    /// The sample failed but the threshold is not reached yet.
    Failing { consecutive: u32 },
    /// The threshold was reached; the caller must fire the trigger.
    Tripped,
}

/// Counts consecutive failed samples against a threshold.
#[derive(Debug, Clone)]
pub struct FailureTracker {
    threshold: NonZeroU32,
    consecutive_failures: u32,
}

impl FailureTracker {
    pub fn new(threshold: NonZeroU32) -> Self {
        Self {
            threshold,
            consecutive_failures: 0,
        }
    }

    pub fn threshold(&self) -> NonZeroU32 {
        self.threshold
    }

    /// Current run of consecutive failures.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) -> Verdict {
        self.consecutive_failures = 0;
        Verdict::Healthy
    }

    pub fn record_failure(&mut self) -> Verdict {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.threshold.get() {
            self.consecutive_failures = 0;
            Verdict::Tripped
        } else {
            Verdict::Failing {
                consecutive: self.consecutive_failures,
            }
        }
    }

    /// Feed a sample, classifying `Ok` as success and anything else as failure.
    pub fn record<E>(&mut self, sample: &Result<(), E>) -> Verdict {
        match sample {
            Ok(()) => self.record_success(),
            Err(_) => self.record_failure(),
        }
    }
}
