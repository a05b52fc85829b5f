//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse flags → Load config → Validate → Logging → Metrics
//!     → Status server → Actions → Monitor loop
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → monitor loop and status server exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No drain: in-flight actions are abandoned at exit

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
