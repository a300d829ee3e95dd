//! TCP header construction for IPv6
//!
//! This module builds the fixed 20-byte TCP header used as the upper layer
//! of the emitted datagram. TCP options are not supported: the data offset
//! is always 5 and the pseudo-header length is always 20 plus the payload
//! length. If options are ever added, the data offset and the checksum
//! length have to be generalized together.

use crate::checksum::transport_checksum_v6;
use crate::nexthdr;
use bytes::{BufMut, BytesMut};
use std::net::Ipv6Addr;

/// TCP header length in bytes, without options
pub const TCP_HDRLEN: usize = 20;

/// TCP port number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpPort(pub u16);

impl TcpPort {
    /// HTTP (80)
    pub const HTTP: TcpPort = TcpPort(80);

    /// HTTPS (443)
    pub const HTTPS: TcpPort = TcpPort(443);

    pub fn new(port: u16) -> Self {
        TcpPort(port)
    }

    pub fn to_u16(self) -> u16 {
        self.0
    }
}

impl From<u16> for TcpPort {
    fn from(port: u16) -> Self {
        TcpPort(port)
    }
}

/// TCP flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags {
    /// FIN - No more data from sender
    pub fin: bool,
    /// SYN - Synchronize sequence numbers
    pub syn: bool,
    /// RST - Reset the connection
    pub rst: bool,
    /// PSH - Push function
    pub psh: bool,
    /// ACK - Acknowledgment field is significant
    pub ack: bool,
    /// URG - Urgent pointer field is significant
    pub urg: bool,
    /// ECE - ECN-Echo
    pub ece: bool,
    /// CWR - Congestion Window Reduced
    pub cwr: bool,
}

impl TcpFlags {
    /// SYN flag (connection initiation)
    pub const SYN: TcpFlags = TcpFlags {
        syn: true,
        fin: false,
        rst: false,
        psh: false,
        ack: false,
        urg: false,
        ece: false,
        cwr: false,
    };

    /// Convert flags to their wire byte
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.fin {
            flags |= 0b0000_0001;
        }
        if self.syn {
            flags |= 0b0000_0010;
        }
        if self.rst {
            flags |= 0b0000_0100;
        }
        if self.psh {
            flags |= 0b0000_1000;
        }
        if self.ack {
            flags |= 0b0001_0000;
        }
        if self.urg {
            flags |= 0b0010_0000;
        }
        if self.ece {
            flags |= 0b0100_0000;
        }
        if self.cwr {
            flags |= 0b1000_0000;
        }
        flags
    }

    /// Parse flags from their wire byte
    pub fn from_u8(value: u8) -> Self {
        TcpFlags {
            fin: (value & 0b0000_0001) != 0,
            syn: (value & 0b0000_0010) != 0,
            rst: (value & 0b0000_0100) != 0,
            psh: (value & 0b0000_1000) != 0,
            ack: (value & 0b0001_0000) != 0,
            urg: (value & 0b0010_0000) != 0,
            ece: (value & 0b0100_0000) != 0,
            cwr: (value & 0b1000_0000) != 0,
        }
    }
}

/// Fixed-size TCP header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpHeader {
    /// Source port
    pub source_port: TcpPort,
    /// Destination port
    pub destination_port: TcpPort,
    /// Sequence number
    pub sequence_number: u32,
    /// Acknowledgment number
    pub acknowledgment_number: u32,
    /// TCP flags
    pub flags: TcpFlags,
    /// Window size
    pub window_size: u16,
    /// Checksum; zero until computed
    pub checksum: u16,
    /// Urgent pointer
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Create a new TCP header with a zero checksum
    pub fn new(
        source_port: TcpPort,
        destination_port: TcpPort,
        sequence_number: u32,
        acknowledgment_number: u32,
        flags: TcpFlags,
        window_size: u16,
    ) -> Self {
        TcpHeader {
            source_port,
            destination_port,
            sequence_number,
            acknowledgment_number,
            flags,
            window_size,
            checksum: 0,
            urgent_pointer: 0,
        }
    }

    /// Serialize the header to its 20-byte wire format
    pub fn to_bytes(&self) -> [u8; TCP_HDRLEN] {
        let mut buffer = BytesMut::with_capacity(TCP_HDRLEN);

        buffer.put_u16(self.source_port.to_u16());
        buffer.put_u16(self.destination_port.to_u16());
        buffer.put_u32(self.sequence_number);
        buffer.put_u32(self.acknowledgment_number);

        // Data offset (4 bits) + reserved (4 bits); always 5 words
        buffer.put_u8(((TCP_HDRLEN / 4) as u8) << 4);
        buffer.put_u8(self.flags.to_u8());
        buffer.put_u16(self.window_size);
        buffer.put_u16(self.checksum);
        buffer.put_u16(self.urgent_pointer);

        let mut bytes = [0u8; TCP_HDRLEN];
        bytes.copy_from_slice(&buffer);
        bytes
    }

    /// Parse a header from bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < TCP_HDRLEN {
            return None;
        }

        Some(TcpHeader {
            source_port: TcpPort::new(u16::from_be_bytes([data[0], data[1]])),
            destination_port: TcpPort::new(u16::from_be_bytes([data[2], data[3]])),
            sequence_number: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            acknowledgment_number: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
            flags: TcpFlags::from_u8(data[13]),
            window_size: u16::from_be_bytes([data[14], data[15]]),
            checksum: u16::from_be_bytes([data[16], data[17]]),
            urgent_pointer: u16::from_be_bytes([data[18], data[19]]),
        })
    }

    /// Calculate and set the checksum over the IPv6 pseudo-header
    ///
    /// The pseudo-header carries the TCP protocol number regardless of any
    /// extension headers between the IPv6 header and this segment. Any
    /// later change to the addresses or payload invalidates the result.
    pub fn compute_checksum(&mut self, source: &Ipv6Addr, destination: &Ipv6Addr, payload: &[u8]) {
        self.checksum = 0;

        let mut segment = Vec::with_capacity(TCP_HDRLEN + payload.len());
        segment.extend_from_slice(&self.to_bytes());
        segment.extend_from_slice(payload);

        self.checksum = transport_checksum_v6(
            &source.octets(),
            &destination.octets(),
            nexthdr::TCP,
            &segment,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> TcpHeader {
        TcpHeader::new(TcpPort::new(12345), TcpPort::HTTP, 1000, 0, TcpFlags::SYN, 65535)
    }

    #[test]
    fn test_flags_roundtrip() {
        let flags = TcpFlags {
            syn: true,
            ack: true,
            ..Default::default()
        };
        assert_eq!(flags.to_u8(), 0b0001_0010);
        assert_eq!(TcpFlags::from_u8(flags.to_u8()), flags);
    }

    #[test]
    fn test_to_bytes_layout() {
        let bytes = sample_header().to_bytes();

        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), 12345);
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 80);
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 1000);
        assert_eq!(bytes[12] >> 4, 5); // data offset, no options
        assert_eq!(bytes[13], TcpFlags::SYN.to_u8());
        assert_eq!(u16::from_be_bytes([bytes[14], bytes[15]]), 65535);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = sample_header();
        let parsed = TcpHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_checksum_deterministic() {
        // Re-running the computation with the checksum field re-zeroed
        // must reproduce the identical value.
        let src: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let dst: Ipv6Addr = "2001:db8::2".parse().unwrap();
        let payload = b"hello, fragmented world";

        let mut header = sample_header();
        header.compute_checksum(&src, &dst, payload);
        let first = header.checksum;
        assert_ne!(first, 0);

        header.compute_checksum(&src, &dst, payload);
        assert_eq!(header.checksum, first);
    }

    #[test]
    fn test_checksum_depends_on_addresses() {
        let src: Ipv6Addr = "2001:db8::1".parse().unwrap();
        let dst_a: Ipv6Addr = "2001:db8::2".parse().unwrap();
        let dst_b: Ipv6Addr = "2001:db8::3".parse().unwrap();

        let mut a = sample_header();
        let mut b = sample_header();
        a.compute_checksum(&src, &dst_a, &[]);
        b.compute_checksum(&src, &dst_b, &[]);
        assert_ne!(a.checksum, b.checksum);
    }
}
