//! Reachability probe subsystem.
//!
//! # Data Flow
//! ```text
//! target host
//!     → icmp.rs (resolve, open socket, send echo request)
//!     → packet.rs (encode request, decode reply)
//!     → Ok(()) on matching echo reply, ProbeError otherwise
//! ```
//!
//! # Design Decisions
//! - `Prober` is the seam between the sampler and the network; tests
//!   substitute scripted probers
//! - The probe applies its own read deadline; the sampler applies an
//!   independent outer deadline on top

pub mod error;
pub mod icmp;
pub mod packet;

use std::time::Duration;
use async_trait::async_trait;

pub use error::ProbeError;
pub use icmp::IcmpProber;

/// A single reachability check against a target.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `target`, waiting at most `timeout` for a reply.
    async fn probe(&self, target: &str, timeout: Duration) -> Result<(), ProbeError>;
}
