//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe, sampler, monitor, dispatcher produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → /metrics on the status server (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Metrics are cheap (atomic increments) and never drive decisions

pub mod logging;
pub mod metrics;
