//! HTTP status subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum router)
//!     → /status  → "OK"
//!     → /metrics → PrometheusHandle::render()
//! ```

pub mod server;

pub use server::StatusServer;
