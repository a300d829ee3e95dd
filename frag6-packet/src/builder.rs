//! Datagram builder: assembles and fragments one IPv6 TCP datagram
//!
//! The builder gathers every input the datagram depends on (addresses, TCP
//! fields, payload, option lists) and turns them into an ordered sequence
//! of link-ready IPv6 packets. The steps are coupled: the next-header
//! values depend on which headers exist and on whether fragmentation
//! happens, and fragmentation depends on header lengths that are only
//! known after option layout. `build` runs them in dependency order:
//!
//! 1. lay out the Hop-by-Hop and Destination Options headers
//! 2. split the fragmentable region against the MTU
//! 3. resolve the next-header chain
//! 4. checksum the TCP segment
//! 5. emit one IPv6 packet per planned fragment

use crate::fragment::{FragmentHeader, FragmentPlan, FRAGMENT_HDRLEN};
use crate::ipv6::{Ipv6Header, IP6_HDRLEN};
use crate::nexthdr;
use crate::options::{ExtensionHeader, ExtensionKind, Ipv6Option};
use crate::tcp::{TcpHeader, TCP_HDRLEN};
use frag6_core::{Error, Result};
use std::net::Ipv6Addr;
use tracing::{debug, info};

/// Largest fragmentable region: offsets are 13 bits of 8-byte units, and
/// the region must fit one IPv6 payload length anyway
const MAX_FRAGMENTABLE: usize = 65535;

/// Builder for a single fragmented IPv6 TCP datagram
///
/// All inputs are fixed before `build`; the build itself never mutates
/// them and nothing survives across invocations.
#[derive(Debug, Clone)]
pub struct DatagramBuilder {
    source: Ipv6Addr,
    destination: Ipv6Addr,
    tcp: TcpHeader,
    payload: Vec<u8>,
    hop_by_hop: Vec<Ipv6Option>,
    destination_options: Vec<Ipv6Option>,
    traffic_class: u8,
    flow_label: u32,
    hop_limit: u8,
    fragment_id: Option<u32>,
}

impl DatagramBuilder {
    /// Create a builder for a datagram between two IPv6 addresses
    pub fn new(source: Ipv6Addr, destination: Ipv6Addr, tcp: TcpHeader) -> Self {
        DatagramBuilder {
            source,
            destination,
            tcp,
            payload: Vec::new(),
            hop_by_hop: Vec::new(),
            destination_options: Vec::new(),
            traffic_class: 0,
            flow_label: 0,
            hop_limit: 255,
            fragment_id: None,
        }
    }

    /// Set the TCP payload
    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Append a hop-by-hop option; order is preserved
    pub fn hop_by_hop_option(mut self, option: Ipv6Option) -> Self {
        self.hop_by_hop.push(option);
        self
    }

    /// Append a destination option; order is preserved
    pub fn destination_option(mut self, option: Ipv6Option) -> Self {
        self.destination_options.push(option);
        self
    }

    /// Set the hop limit (default 255)
    pub fn hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Set the traffic class (default 0)
    pub fn traffic_class(mut self, traffic_class: u8) -> Self {
        self.traffic_class = traffic_class;
        self
    }

    /// Set the flow label (default 0)
    pub fn flow_label(mut self, flow_label: u32) -> Self {
        self.flow_label = flow_label;
        self
    }

    /// Fix the 32-bit fragment identification value
    ///
    /// By default a random value is drawn per build.
    pub fn fragment_id(mut self, id: u32) -> Self {
        self.fragment_id = Some(id);
        self
    }

    /// Build the datagram against the link MTU
    ///
    /// Returns the ordered IPv6 packets, one per fragment, each no longer
    /// than the MTU. A datagram that fits in one fragment carries no
    /// Fragment header.
    pub fn build(&self, mtu: usize) -> Result<Vec<Vec<u8>>> {
        // 1. Option layout. Empty option lists omit the header entirely.
        let hop_header = ExtensionHeader::layout(ExtensionKind::HopByHop, &self.hop_by_hop);
        let dst_header =
            ExtensionHeader::layout(ExtensionKind::Destination, &self.destination_options);

        let hop_len = hop_header.as_ref().map_or(0, ExtensionHeader::len);
        let dst_len = dst_header.as_ref().map_or(0, ExtensionHeader::len);
        debug!(hop_len, dst_len, "extension headers laid out");

        // 2. Fragmentation plan. The Destination Options header is the
        // last extension header, so it fragments along with the TCP
        // segment; the Hop-by-Hop header repeats in every fragment.
        let region_len = dst_len + TCP_HDRLEN + self.payload.len();
        if region_len > MAX_FRAGMENTABLE {
            return Err(Error::construction(format!(
                "fragmentable region of {} bytes exceeds the {} byte maximum",
                region_len, MAX_FRAGMENTABLE
            )));
        }

        let unfragmentable = IP6_HDRLEN + hop_len;
        let plan = FragmentPlan::split(region_len, unfragmentable, mtu)?;
        let fragmented = plan.is_fragmented();
        info!(
            fragments = plan.len(),
            region_len, mtu, "fragmentation plan ready"
        );

        // 3. Next-header chain, now that presence and fragmentation are
        // both known.
        let chain = nexthdr::resolve(hop_header.is_some(), fragmented, dst_header.is_some());

        // 4. TCP checksum over the pseudo-header. The pseudo-header uses
        // the TCP protocol number, so the chain does not feed into it, but
        // every other input is final at this point.
        let mut tcp = self.tcp.clone();
        tcp.compute_checksum(&self.source, &self.destination, &self.payload);

        // 5. Fragmentable region: destination header, TCP header, payload.
        let mut region = Vec::with_capacity(region_len);
        if let Some(header) = &dst_header {
            // chain.destination is Some exactly when dst_header is
            let next = chain.destination.ok_or_else(|| {
                Error::construction("next-header chain lacks a destination slot")
            })?;
            region.extend_from_slice(&header.to_bytes(next));
        }
        region.extend_from_slice(&tcp.to_bytes());
        region.extend_from_slice(&self.payload);
        debug_assert_eq!(region.len(), region_len);

        let hop_bytes = match &hop_header {
            Some(header) => {
                let next = chain.hop_by_hop.ok_or_else(|| {
                    Error::construction("next-header chain lacks a hop-by-hop slot")
                })?;
                Some(header.to_bytes(next))
            }
            None => None,
        };

        let identification = self.fragment_id.unwrap_or_else(rand::random);

        let mut packets = Vec::with_capacity(plan.len());
        for (index, fragment) in plan.iter().enumerate() {
            let fragment_hdr_len = if fragmented { FRAGMENT_HDRLEN } else { 0 };
            let payload_length = hop_len + fragment_hdr_len + fragment.length;
            if payload_length > u16::MAX as usize {
                return Err(Error::construction(format!(
                    "fragment {} payload length {} exceeds the IPv6 maximum",
                    index, payload_length
                )));
            }

            let ip_header = Ipv6Header {
                traffic_class: self.traffic_class,
                flow_label: self.flow_label,
                payload_length: payload_length as u16,
                next_header: chain.ipv6,
                hop_limit: self.hop_limit,
                source: self.source,
                destination: self.destination,
            };

            let mut packet = Vec::with_capacity(IP6_HDRLEN + payload_length);
            packet.extend_from_slice(&ip_header.to_bytes());
            if let Some(bytes) = &hop_bytes {
                packet.extend_from_slice(bytes);
            }
            if fragmented {
                let next = chain.fragment.ok_or_else(|| {
                    Error::construction("next-header chain lacks a fragment slot")
                })?;
                let header = FragmentHeader {
                    next_header: next,
                    offset: (fragment.offset / 8) as u16,
                    more_fragments: index + 1 < plan.len(),
                    identification,
                };
                packet.extend_from_slice(&header.to_bytes());
            }
            packet.extend_from_slice(&region[fragment.offset..fragment.offset + fragment.length]);

            debug!(
                index,
                offset = fragment.offset,
                length = fragment.length,
                packet_len = packet.len(),
                "fragment assembled"
            );
            packets.push(packet);
        }

        Ok(packets)
    }
}
