//! IPv6 protocol numbers and next-header chain resolution
//!
//! Each header in the chain names the header that follows it. Which value
//! goes where depends on which optional headers are present and whether
//! the datagram is fragmented, so the chain is resolved once, after layout
//! and the fragmentation decision, and before the TCP checksum is taken.

/// Hop-by-Hop Options header protocol number
pub const HOP_BY_HOP: u8 = 0;

/// TCP protocol number
pub const TCP: u8 = 6;

/// Fragment header protocol number
pub const FRAGMENT: u8 = 44;

/// Destination Options header protocol number
pub const DESTINATION: u8 = 60;

/// Resolved next-header values for every header in the datagram
///
/// `None` entries correspond to headers that are absent from the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHeaderChain {
    /// Next-header field of the fixed IPv6 header
    pub ipv6: u8,
    /// Next-header field of the Hop-by-Hop header, if present
    pub hop_by_hop: Option<u8>,
    /// Next-header field of the Fragment header, if fragmenting
    pub fragment: Option<u8>,
    /// Next-header field of the Destination header, if present
    pub destination: Option<u8>,
}

/// Resolve the next-header chain
///
/// The header order is fixed: IPv6, Hop-by-Hop, Fragment, Destination,
/// TCP, with absent headers skipped. The Destination header is always the
/// last extension header before the upper layer, so its next-header is
/// always TCP.
pub fn resolve(has_hop_by_hop: bool, fragmented: bool, has_destination: bool) -> NextHeaderChain {
    let after_fragment = if has_destination { DESTINATION } else { TCP };
    let after_hop_by_hop = if fragmented { FRAGMENT } else { after_fragment };

    NextHeaderChain {
        ipv6: if has_hop_by_hop {
            HOP_BY_HOP
        } else {
            after_hop_by_hop
        },
        hop_by_hop: has_hop_by_hop.then_some(after_hop_by_hop),
        fragment: fragmented.then_some(after_fragment),
        destination: has_destination.then_some(TCP),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_tcp() {
        let chain = resolve(false, false, false);
        assert_eq!(chain.ipv6, TCP);
        assert_eq!(chain.hop_by_hop, None);
        assert_eq!(chain.fragment, None);
        assert_eq!(chain.destination, None);
    }

    #[test]
    fn test_full_chain() {
        let chain = resolve(true, true, true);
        assert_eq!(chain.ipv6, HOP_BY_HOP);
        assert_eq!(chain.hop_by_hop, Some(FRAGMENT));
        assert_eq!(chain.fragment, Some(DESTINATION));
        assert_eq!(chain.destination, Some(TCP));
    }

    #[test]
    fn test_hop_by_hop_only() {
        let chain = resolve(true, false, false);
        assert_eq!(chain.ipv6, HOP_BY_HOP);
        assert_eq!(chain.hop_by_hop, Some(TCP));
    }

    #[test]
    fn test_hop_by_hop_and_destination_unfragmented() {
        let chain = resolve(true, false, true);
        assert_eq!(chain.ipv6, HOP_BY_HOP);
        assert_eq!(chain.hop_by_hop, Some(DESTINATION));
        assert_eq!(chain.destination, Some(TCP));
    }

    #[test]
    fn test_fragmented_without_options() {
        let chain = resolve(false, true, false);
        assert_eq!(chain.ipv6, FRAGMENT);
        assert_eq!(chain.fragment, Some(TCP));
    }

    #[test]
    fn test_fragmented_with_destination_only() {
        let chain = resolve(false, true, true);
        assert_eq!(chain.ipv6, FRAGMENT);
        assert_eq!(chain.fragment, Some(DESTINATION));
        assert_eq!(chain.destination, Some(TCP));
    }

    #[test]
    fn test_destination_only() {
        let chain = resolve(false, false, true);
        assert_eq!(chain.ipv6, DESTINATION);
        assert_eq!(chain.destination, Some(TCP));
    }

    #[test]
    fn test_chain_walk_matches_presence() {
        // For every combination, walking the chain from the IPv6 header
        // must visit exactly the headers that are present, in order.
        for hbh in [false, true] {
            for frag in [false, true] {
                for dst in [false, true] {
                    let chain = resolve(hbh, frag, dst);

                    let mut current = chain.ipv6;
                    if hbh {
                        assert_eq!(current, HOP_BY_HOP);
                        current = chain.hop_by_hop.unwrap();
                    }
                    if frag {
                        assert_eq!(current, FRAGMENT);
                        current = chain.fragment.unwrap();
                    }
                    if dst {
                        assert_eq!(current, DESTINATION);
                        current = chain.destination.unwrap();
                    }
                    assert_eq!(current, TCP);
                }
            }
        }
    }
}
