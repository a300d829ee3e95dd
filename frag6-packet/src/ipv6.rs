//! Fixed IPv6 header construction

use bytes::{BufMut, BytesMut};
use std::net::Ipv6Addr;

/// IPv6 header length in bytes
pub const IP6_HDRLEN: usize = 40;

/// Fixed 40-byte IPv6 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Header {
    /// Traffic class (8 bits)
    pub traffic_class: u8,
    /// Flow label (20 bits)
    pub flow_label: u32,
    /// Payload length: everything after the fixed header, in bytes
    pub payload_length: u16,
    /// Next header protocol number
    pub next_header: u8,
    /// Hop limit
    pub hop_limit: u8,
    /// Source address
    pub source: Ipv6Addr,
    /// Destination address
    pub destination: Ipv6Addr,
}

impl Ipv6Header {
    /// Serialize the header to its 40-byte wire format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(IP6_HDRLEN);

        // Version (4 bits), traffic class (8 bits), flow label (20 bits)
        let first_word = (6u32 << 28)
            | ((self.traffic_class as u32) << 20)
            | (self.flow_label & 0x000F_FFFF);
        buffer.put_u32(first_word);

        buffer.put_u16(self.payload_length);
        buffer.put_u8(self.next_header);
        buffer.put_u8(self.hop_limit);
        buffer.put_slice(&self.source.octets());
        buffer.put_slice(&self.destination.octets());

        buffer.to_vec()
    }

    /// Parse a header from bytes
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < IP6_HDRLEN {
            return None;
        }

        let first_word = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        if first_word >> 28 != 6 {
            return None;
        }

        let mut src = [0u8; 16];
        src.copy_from_slice(&data[8..24]);
        let mut dst = [0u8; 16];
        dst.copy_from_slice(&data[24..40]);

        Some(Ipv6Header {
            traffic_class: ((first_word >> 20) & 0xFF) as u8,
            flow_label: first_word & 0x000F_FFFF,
            payload_length: u16::from_be_bytes([data[4], data[5]]),
            next_header: data[6],
            hop_limit: data[7],
            source: Ipv6Addr::from(src),
            destination: Ipv6Addr::from(dst),
        })
    }
}
