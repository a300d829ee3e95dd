//! Packet construction library for frag6
//!
//! This crate builds a single IPv6 datagram carrying a TCP segment, with a
//! Hop-by-Hop Options extension header and a Destination Options extension
//! header, and splits it into Fragment-header fragments sized to the link
//! MTU. It covers:
//!
//! - **Extension header options** with Pad1/PadN alignment padding per
//!   RFC 2460 section 4.2, including Router Alert (RFC 2711) and ILNP
//!   Nonce (RFC 6744) constructors
//! - **Fragmentation** of the fragmentable region into 8-byte-aligned,
//!   MTU-bounded pieces per RFC 2460 section 4.5
//! - **Next-header chain resolution** across the fixed header and the
//!   optional extension headers
//! - **TCP over IPv6** with the pseudo-header checksum of RFC 2460
//!   section 8.1
//! - **Ethernet II framing** for handing fragments to a link-layer sender
//!
//! # Architecture
//!
//! - [`builder`] - High-level datagram builder producing ready fragments
//! - [`options`] - Option alignment, padding, and extension header layout
//! - [`fragment`] - Fragmentation plan and Fragment header encoding
//! - [`nexthdr`] - Protocol numbers and next-header chain resolution
//! - [`checksum`] - Internet and IPv6 pseudo-header checksums
//! - [`ipv6`] - Fixed IPv6 header encoding
//! - [`tcp`] - TCP header construction
//! - [`ethernet`] - Ethernet II frame encoding
//!
//! # Quick Start
//!
//! ```rust
//! use frag6_packet::builder::DatagramBuilder;
//! use frag6_packet::options::Ipv6Option;
//! use frag6_packet::tcp::{TcpFlags, TcpHeader, TcpPort};
//!
//! let tcp = TcpHeader::new(TcpPort::new(54321), TcpPort::HTTP, 0, 0, TcpFlags::SYN, 65535);
//!
//! let fragments = DatagramBuilder::new(
//!     "2001:db8::1".parse().unwrap(),
//!     "2001:db8::2".parse().unwrap(),
//!     tcp,
//! )
//! .hop_by_hop_option(Ipv6Option::router_alert(5))
//! .payload(vec![0; 4000])
//! .build(1500)
//! .unwrap();
//!
//! assert!(fragments.len() > 1);
//! ```

pub mod builder;
pub mod checksum;
pub mod ethernet;
pub mod fragment;
pub mod ipv6;
pub mod nexthdr;
pub mod options;
pub mod tcp;

// Re-export commonly used types for convenience
pub use builder::DatagramBuilder;
pub use checksum::{internet_checksum, transport_checksum_v6};
pub use ethernet::{EtherType, EthernetFrame, MacAddress};
pub use fragment::{Fragment, FragmentHeader, FragmentPlan};
pub use ipv6::Ipv6Header;
pub use options::{Alignment, ExtensionHeader, ExtensionKind, Ipv6Option};
pub use tcp::{TcpFlags, TcpHeader, TcpPort};
