//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define monitor metrics (samples, failures, threshold crossings, actions)
//! - Install the Prometheus recorder
//!
//! # Metrics
//! - `natwatch_samples_total` (counter): samples by outcome
//! - `natwatch_sample_duration_seconds` (histogram): sample latency
//! - `natwatch_consecutive_failures` (gauge): current failure run
//! - `natwatch_threshold_crossings_total` (counter): trigger events
//! - `natwatch_action_triggers_total` (counter): action runs by action, outcome
//! - `natwatch_action_duration_seconds` (histogram): action latency by action
//!
//! # Design Decisions
//! - Purely observational; nothing reads these back
//! - Without an installed recorder every call is a no-op, so tests
//!   need no setup

use std::time::Duration;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const SAMPLES_TOTAL: &str = "natwatch_samples_total";
pub const SAMPLE_DURATION: &str = "natwatch_sample_duration_seconds";
pub const CONSECUTIVE_FAILURES: &str = "natwatch_consecutive_failures";
pub const THRESHOLD_CROSSINGS: &str = "natwatch_threshold_crossings_total";
pub const ACTION_TRIGGERS: &str = "natwatch_action_triggers_total";
pub const ACTION_DURATION: &str = "natwatch_action_duration_seconds";

/// Install the global Prometheus recorder and describe all metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

fn describe() {
    describe_counter!(SAMPLES_TOTAL, "Reachability samples by outcome");
    describe_histogram!(SAMPLE_DURATION, Unit::Seconds, "Time taken by each sample");
    describe_gauge!(CONSECUTIVE_FAILURES, "Current run of consecutive failed samples");
    describe_counter!(THRESHOLD_CROSSINGS, "Times the failure threshold was reached");
    describe_counter!(ACTION_TRIGGERS, "Action invocations by action and outcome");
    describe_histogram!(ACTION_DURATION, Unit::Seconds, "Time taken by each action");
}

pub fn record_sample(outcome: &'static str, elapsed: Duration) {
    counter!(SAMPLES_TOTAL, "outcome" => outcome).increment(1);
    histogram!(SAMPLE_DURATION).record(elapsed.as_secs_f64());
}

pub fn record_consecutive_failures(count: u32) {
    gauge!(CONSECUTIVE_FAILURES).set(count as f64);
}

pub fn record_threshold_crossing() {
    counter!(THRESHOLD_CROSSINGS).increment(1);
}

pub fn record_action(action: &str, success: bool, elapsed: Duration) {
    let outcome = if success { "success" } else { "error" };
    counter!(ACTION_TRIGGERS, "action" => action.to_string(), "outcome" => outcome).increment(1);
    histogram!(ACTION_DURATION, "action" => action.to_string()).record(elapsed.as_secs_f64());
}
