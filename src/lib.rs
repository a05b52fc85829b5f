//! Network reachability monitor with threshold-triggered actions.

pub mod actions;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod probe;

pub use actions::{Action, ActionRegistry, FanoutDispatcher};
pub use config::MonitorConfig;
pub use health::Monitor;
pub use lifecycle::Shutdown;
pub use probe::{IcmpProber, Prober};
