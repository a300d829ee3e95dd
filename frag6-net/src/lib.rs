//! Network collaborators for frag6
//!
//! Everything here is a thin wrapper over the OS network stack: looking up
//! link parameters for an interface, resolving a target to an IPv6
//! address, and pushing raw Ethernet frames out of a datalink channel.
//! None of it contains packet-construction logic; that lives in
//! `frag6-packet`.

pub mod interface;
pub mod resolve;
pub mod transmit;

pub use interface::{link_info, LinkInfo};
pub use resolve::resolve_ipv6;
pub use transmit::{send_fragments, DatalinkTransmitter, FrameTransmitter};
