//! Probe error taxonomy.

use std::time::Duration;
use nix::errno::Errno;
use thiserror::Error;

use crate::probe::packet::PacketError;

/// Why a single probe attempt did not see an echo reply.
///
/// Cloneable so the same cause can be handed to every action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// Name lookup failed.
    #[error("failed to resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    /// Lookup succeeded but produced no IPv4 address.
    #[error("no IPv4 address found for {0}")]
    NoAddress(String),

    /// Opening or configuring the ICMP socket failed.
    #[error("failed to open ICMP socket: {0}")]
    Socket(Errno),

    #[error("failed to send echo request: {0}")]
    Send(Errno),

    /// The kernel accepted fewer bytes than the request holds.
    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("failed to receive reply: {0}")]
    Receive(Errno),

    /// No decisive packet arrived before the read deadline.
    #[error("no echo reply within {0:?}")]
    ReadTimeout(Duration),

    #[error("malformed reply: {0}")]
    Malformed(#[from] PacketError),

    #[error("got {kind} (type {kind_code}, code {code}) from {peer}; want echo reply")]
    UnexpectedReply {
        kind: &'static str,
        kind_code: u8,
        code: u8,
        peer: String,
    },

    /// The probe task panicked or was cancelled before reporting.
    #[error("probe task aborted: {0}")]
    Aborted(String),
}
