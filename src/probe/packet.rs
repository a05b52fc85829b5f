//! ICMPv4 echo wire format.
//!
//! ```text
//!  0        8        16                32
//!  +--------+--------+-----------------+
//!  |  type  |  code  |    checksum     |
//!  +--------+--------+-----------------+
//!  |   identifier    |    sequence     |
//!  +-----------------+-----------------+
//!  |             payload ...           |
//! ```
//!
//! Error messages (destination unreachable, redirect, time exceeded,
//! parameter problem) carry the offending datagram's IPv4 header and
//! first 8 bytes after the ICMP header. For an echo request those 8
//! bytes hold its identifier and sequence.

use thiserror::Error;

/// ICMP type for echo reply.
pub const ICMP_ECHO_REPLY: u8 = 0;
/// ICMP type for echo request.
pub const ICMP_ECHO_REQUEST: u8 = 8;

const ICMP_DEST_UNREACHABLE: u8 = 3;
const ICMP_REDIRECT: u8 = 5;
const ICMP_TIME_EXCEEDED: u8 = 11;
const ICMP_PARAMETER_PROBLEM: u8 = 12;

const IPPROTO_ICMP: u8 = 1;

/// Fixed payload carried by every echo request.
pub const ECHO_PAYLOAD: &[u8] = b"HELLO-R-U-THERE";

const HEADER_LEN: usize = 8;
const IPV4_MIN_HEADER_LEN: usize = 20;

/// Errors decoding a received packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("packet too short: {0} bytes")]
    Truncated(usize),

    #[error("invalid IPv4 header length {0}")]
    BadIpHeader(usize),
}

/// An ICMP echo request ready to go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    pub identifier: u16,
    pub sequence: u16,
}

impl EchoRequest {
    pub fn new(identifier: u16, sequence: u16) -> Self {
        Self { identifier, sequence }
    }

    /// Marshal the request, including checksum.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + ECHO_PAYLOAD.len());
        buf.push(ICMP_ECHO_REQUEST);
        buf.push(0);
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&self.identifier.to_be_bytes());
        buf.extend_from_slice(&self.sequence.to_be_bytes());
        buf.extend_from_slice(ECHO_PAYLOAD);

        let sum = checksum(&buf);
        buf[2..4].copy_from_slice(&sum.to_be_bytes());
        buf
    }
}

/// Identifier and sequence of an echo request quoted inside an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedEcho {
    pub identifier: u16,
    pub sequence: u16,
}

/// Header fields of a received ICMP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpMessage {
    pub kind: u8,
    pub code: u8,
    pub identifier: u16,
    pub sequence: u16,
    /// Set only for error messages quoting one of our echo requests.
    pub quoted: Option<QuotedEcho>,
}

impl IcmpMessage {
    pub fn is_echo_reply(&self) -> bool {
        self.kind == ICMP_ECHO_REPLY
    }

    pub fn is_echo_request(&self) -> bool {
        self.kind == ICMP_ECHO_REQUEST
    }

    /// Error types that quote the datagram that caused them.
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            ICMP_DEST_UNREACHABLE | ICMP_REDIRECT | ICMP_TIME_EXCEEDED | ICMP_PARAMETER_PROBLEM
        )
    }

    /// Human name for logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            0 => "echo reply",
            3 => "destination unreachable",
            5 => "redirect",
            8 => "echo request",
            11 => "time exceeded",
            12 => "parameter problem",
            _ => "unknown",
        }
    }
}

/// Parse a received datagram.
///
/// Raw sockets deliver the IPv4 header in front of the ICMP message,
/// datagram ICMP sockets do not. A leading version nibble of 4 marks
/// the former.
pub fn parse(datagram: &[u8]) -> Result<IcmpMessage, PacketError> {
    let icmp = strip_ipv4_header(datagram)?;
    if icmp.len() < HEADER_LEN {
        return Err(PacketError::Truncated(icmp.len()));
    }

    let mut msg = IcmpMessage {
        kind: icmp[0],
        code: icmp[1],
        identifier: u16::from_be_bytes([icmp[4], icmp[5]]),
        sequence: u16::from_be_bytes([icmp[6], icmp[7]]),
        quoted: None,
    };
    if msg.is_error() {
        msg.quoted = parse_quoted_echo(&icmp[HEADER_LEN..]);
    }
    Ok(msg)
}

/// Pull the echo identifier and sequence out of an error's quoted datagram.
/// Anything other than a quoted ICMP echo request yields `None`.
fn parse_quoted_echo(body: &[u8]) -> Option<QuotedEcho> {
    let first = *body.first()?;
    if first >> 4 != 4 {
        return None;
    }
    let ihl = ((first & 0x0f) as usize) * 4;
    if ihl < IPV4_MIN_HEADER_LEN || body.get(9) != Some(&IPPROTO_ICMP) {
        return None;
    }
    let echo = body.get(ihl..ihl + HEADER_LEN)?;
    if echo[0] != ICMP_ECHO_REQUEST {
        return None;
    }
    Some(QuotedEcho {
        identifier: u16::from_be_bytes([echo[4], echo[5]]),
        sequence: u16::from_be_bytes([echo[6], echo[7]]),
    })
}

fn strip_ipv4_header(datagram: &[u8]) -> Result<&[u8], PacketError> {
    match datagram.first() {
        Some(b) if b >> 4 == 4 => {
            let ihl = ((b & 0x0f) as usize) * 4;
            if ihl < IPV4_MIN_HEADER_LEN {
                return Err(PacketError::BadIpHeader(ihl));
            }
            if datagram.len() < ihl {
                return Err(PacketError::Truncated(datagram.len()));
            }
            Ok(&datagram[ihl..])
        }
        Some(_) => Ok(datagram),
        None => Err(PacketError::Truncated(0)),
    }
}

/// RFC 1071 internet checksum.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        sum += u16::from_be_bytes([pair[0], pair[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 20-byte IPv4 header with the given protocol.
    fn ipv4_header(protocol: u8) -> Vec<u8> {
        let mut header = vec![0u8; IPV4_MIN_HEADER_LEN];
        header[0] = 0x45;
        header[9] = protocol;
        header
    }

    /// An error message as a raw socket delivers it, quoting `inner`
    /// (the first 8 bytes after the offending datagram's IP header).
    pub(crate) fn error_datagram(kind: u8, code: u8, protocol: u8, inner: &[u8]) -> Vec<u8> {
        let mut datagram = ipv4_header(IPPROTO_ICMP);
        datagram.extend_from_slice(&[kind, code, 0, 0, 0, 0, 0, 0]);
        datagram.extend(ipv4_header(protocol));
        datagram.extend_from_slice(inner);
        datagram
    }

    /// An error quoting our echo request.
    pub(crate) fn error_quoting_echo(kind: u8, request: &EchoRequest) -> Vec<u8> {
        error_datagram(kind, 0, IPPROTO_ICMP, &request.encode()[..HEADER_LEN])
    }

    /// Port unreachable for somebody's UDP datagram.
    pub(crate) fn port_unreachable_for_udp() -> Vec<u8> {
        error_datagram(ICMP_DEST_UNREACHABLE, 3, 17, &[0x9c, 0x40, 0, 9, 0, 16, 0, 0])
    }

    #[test]
    fn test_encode_layout() {
        let wire = EchoRequest::new(0x1234, 0xabcd).encode();
        assert_eq!(wire.len(), 8 + ECHO_PAYLOAD.len());
        assert_eq!(wire[0], ICMP_ECHO_REQUEST);
        assert_eq!(wire[1], 0);
        assert_eq!(&wire[4..6], &[0x12, 0x34]);
        assert_eq!(&wire[6..8], &[0xab, 0xcd]);
        assert_eq!(&wire[8..], ECHO_PAYLOAD);
    }

    #[test]
    fn test_checksum_verifies_to_zero() {
        // Summing a message including its own checksum yields 0.
        let wire = EchoRequest::new(7, 42).encode();
        assert_eq!(checksum(&wire), 0);
    }

    #[test]
    fn test_checksum_odd_length() {
        // 0x0100 + 0xf2 << 8 = 0xf300, complement = 0x0cff
        assert_eq!(checksum(&[0x01, 0x00, 0xf2]), 0x0cff);
    }

    #[test]
    fn test_parse_datagram_without_ip_header() {
        let mut reply = EchoRequest::new(9, 10).encode();
        reply[0] = ICMP_ECHO_REPLY;

        let msg = parse(&reply).unwrap();
        assert!(msg.is_echo_reply());
        assert_eq!(msg.identifier, 9);
        assert_eq!(msg.sequence, 10);
    }

    #[test]
    fn test_parse_strips_ip_header() {
        let mut datagram = vec![0u8; 20];
        datagram[0] = 0x45;
        datagram.extend_from_slice(&[3, 1, 0, 0, 0, 0, 0, 0]);

        let msg = parse(&datagram).unwrap();
        assert_eq!(msg.kind, 3);
        assert_eq!(msg.code, 1);
        assert_eq!(msg.kind_name(), "destination unreachable");
    }

    #[test]
    fn test_parse_rejects_short_packets() {
        assert_eq!(parse(&[]), Err(PacketError::Truncated(0)));
        assert_eq!(parse(&[0, 0, 0]), Err(PacketError::Truncated(3)));

        let mut datagram = vec![0u8; 20];
        datagram[0] = 0x45;
        datagram.extend_from_slice(&[0, 0]);
        assert_eq!(parse(&datagram), Err(PacketError::Truncated(2)));
    }

    #[test]
    fn test_parse_error_quoting_echo_request() {
        let request = EchoRequest::new(0x0102, 0x0304);
        let msg = parse(&error_quoting_echo(ICMP_TIME_EXCEEDED, &request)).unwrap();

        assert!(msg.is_error());
        assert_eq!(msg.kind_name(), "time exceeded");
        assert_eq!(
            msg.quoted,
            Some(QuotedEcho {
                identifier: 0x0102,
                sequence: 0x0304,
            })
        );
    }

    #[test]
    fn test_parse_error_quoting_udp_has_no_echo() {
        let msg = parse(&port_unreachable_for_udp()).unwrap();
        assert_eq!(msg.kind, ICMP_DEST_UNREACHABLE);
        assert_eq!(msg.code, 3);
        assert_eq!(msg.quoted, None);
    }

    #[test]
    fn test_parse_error_with_truncated_quote_has_no_echo() {
        let request = EchoRequest::new(1, 2);
        let mut datagram = error_quoting_echo(ICMP_DEST_UNREACHABLE, &request);
        datagram.truncate(datagram.len() - 4);
        assert_eq!(parse(&datagram).unwrap().quoted, None);
    }

    #[test]
    fn test_parse_error_quoting_echo_reply_has_no_echo() {
        let mut inner = EchoRequest::new(1, 2).encode();
        inner[0] = ICMP_ECHO_REPLY;
        let datagram = error_datagram(ICMP_DEST_UNREACHABLE, 1, IPPROTO_ICMP, &inner[..8]);
        assert_eq!(parse(&datagram).unwrap().quoted, None);
    }

    #[test]
    fn test_parse_rejects_bad_ihl() {
        assert_eq!(parse(&[0x42, 0, 0, 0, 0, 0, 0, 0]), Err(PacketError::BadIpHeader(8)));
    }
}
