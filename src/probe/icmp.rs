//! ICMP echo probe over a kernel socket.
//!
//! # Responsibilities
//! - Resolve the target to an IPv4 address
//! - Send one echo request and wait for the matching reply
//! - Close the socket on every exit path
//!
//! # Design Decisions
//! - Socket I/O is blocking and runs on the blocking pool
//! - The socket is opened per probe, never shared between calls
//! - The read deadline is re-armed before every read so skipped
//!   packets cannot extend the total wait

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::os::fd::{AsRawFd, OwnedFd};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::socket::{
    recvfrom, sendto, setsockopt, socket, sockopt, AddressFamily, MsgFlags, SockFlag,
    SockProtocol, SockType, SockaddrIn,
};
use nix::sys::time::{TimeVal, TimeValLike};
use rand::Rng;

use crate::config::SocketKind;
use crate::probe::error::ProbeError;
use crate::probe::packet::{self, EchoRequest, IcmpMessage};
use crate::probe::Prober;

const RECV_BUFFER_LEN: usize = 1500;

/// Production prober sending real ICMP echo requests.
#[derive(Debug, Clone)]
pub struct IcmpProber {
    socket_kind: SocketKind,
}

impl IcmpProber {
    pub fn new(socket_kind: SocketKind) -> Self {
        Self { socket_kind }
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, target: &str, timeout: Duration) -> Result<(), ProbeError> {
        let addr = resolve_ipv4(target).await?;
        let kind = self.socket_kind;

        tokio::task::spawn_blocking(move || ping(addr, timeout, kind))
            .await
            .map_err(|e| ProbeError::Aborted(e.to_string()))?
    }
}

/// Resolve a host name or literal to its first IPv4 address.
pub async fn resolve_ipv4(host: &str) -> Result<Ipv4Addr, ProbeError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }

    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::Resolve {
            host: host.to_string(),
            reason: e.to_string(),
        })?;

    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ProbeError::NoAddress(host.to_string()))
}

/// Send one echo request to `addr` and block up to `timeout` for the reply.
pub fn ping(addr: Ipv4Addr, timeout: Duration, kind: SocketKind) -> Result<(), ProbeError> {
    let fd = open_socket(kind)?;

    let request = EchoRequest::new(
        (std::process::id() & 0xffff) as u16,
        rand::thread_rng().gen(),
    );
    let wire = request.encode();
    let dest = SockaddrIn::from(SocketAddrV4::new(addr, 0));

    let sent = sendto(fd.as_raw_fd(), &wire, &dest, MsgFlags::empty()).map_err(ProbeError::Send)?;
    if sent != wire.len() {
        return Err(ProbeError::ShortWrite {
            sent,
            expected: wire.len(),
        });
    }

    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; RECV_BUFFER_LEN];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ProbeError::ReadTimeout(timeout));
        }
        // A zero SO_RCVTIMEO means "block forever".
        let micros = (remaining.as_micros() as i64).max(1);
        setsockopt(&fd, sockopt::ReceiveTimeout, &TimeVal::microseconds(micros))
            .map_err(ProbeError::Socket)?;

        let (n, peer) = match recvfrom::<SockaddrIn>(fd.as_raw_fd(), &mut buf) {
            Ok(received) => received,
            Err(Errno::EAGAIN) => return Err(ProbeError::ReadTimeout(timeout)),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ProbeError::Receive(e)),
        };
        let peer = peer
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let msg = packet::parse(&buf[..n])?;
        match classify(&msg, &request, kind, &peer) {
            Some(outcome) => return outcome,
            None => continue,
        }
    }
}

/// Decide whether `msg` answers `request`.
///
/// `None` means the packet belongs to someone else and the read continues.
/// Echo replies decide by identifier and sequence; error messages decide
/// only when they quote our request.
pub(crate) fn classify(
    msg: &IcmpMessage,
    request: &EchoRequest,
    kind: SocketKind,
    peer: &str,
) -> Option<Result<(), ProbeError>> {
    // Datagram sockets rewrite the identifier to the socket's port.
    let ours = |identifier: u16, sequence: u16| {
        (kind == SocketKind::Datagram || identifier == request.identifier)
            && sequence == request.sequence
    };

    if msg.is_echo_reply() {
        if ours(msg.identifier, msg.sequence) {
            tracing::debug!(peer = %peer, seq = msg.sequence, "Echo reply received");
            return Some(Ok(()));
        }
        tracing::trace!(
            peer = %peer,
            id = msg.identifier,
            seq = msg.sequence,
            "Ignoring echo reply for another probe"
        );
        return None;
    }

    match msg.quoted {
        Some(quoted) if ours(quoted.identifier, quoted.sequence) => {
            Some(Err(ProbeError::UnexpectedReply {
                kind: msg.kind_name(),
                kind_code: msg.kind,
                code: msg.code,
                peer: peer.to_string(),
            }))
        }
        _ => {
            tracing::trace!(
                peer = %peer,
                kind = msg.kind_name(),
                code = msg.code,
                "Ignoring ICMP packet for another probe"
            );
            None
        }
    }
}

fn open_socket(kind: SocketKind) -> Result<OwnedFd, ProbeError> {
    let ty = match kind {
        SocketKind::Raw => SockType::Raw,
        SocketKind::Datagram => SockType::Datagram,
    };
    socket(AddressFamily::Inet, ty, SockFlag::SOCK_CLOEXEC, SockProtocol::Icmp)
        .map_err(ProbeError::Socket)
}
