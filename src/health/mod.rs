//! Failure detection subsystem.
//!
//! # Data Flow
//! ```text
//! monitor.rs (fixed-period ticker)
//!     → sampler.rs (spawn probe, race against per-check deadline)
//!     → state.rs (count consecutive failures)
//!     → threshold crossed: actions::FanoutDispatcher (not awaited)
//! ```
//!
//! # Design Decisions
//! - One writer for the failure counter: the monitor loop
//! - Failure causes are kept for logs and the trigger payload only;
//!   the tracker sees success or failure, nothing finer

pub mod monitor;
pub mod sampler;
pub mod state;

pub use monitor::Monitor;
pub use sampler::{CheckError, SampleResult, Sampler};
pub use state::{FailureTracker, Verdict};
