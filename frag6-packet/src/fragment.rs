//! IPv6 fragmentation: splitting plan and Fragment header encoding
//!
//! The fragmentable part of the packet (Destination Options header, TCP
//! header, payload) is partitioned into MTU-bounded pieces. Every fragment
//! except the last must be a multiple of 8 bytes long (RFC 2460 section
//! 4.5), and fragment offsets are expressed in 8-byte units.

use frag6_core::{Error, Result};

/// Fragment header size in bytes
pub const FRAGMENT_HDRLEN: usize = 8;

/// One planned fragment: a byte range within the fragmentable region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    /// Byte offset within the fragmentable region, always a multiple of 8
    pub offset: usize,
    /// Length in bytes; a multiple of 8 for all but the last fragment
    pub length: usize,
}

/// Ordered, contiguous partition of the fragmentable region
#[derive(Debug, Clone)]
pub struct FragmentPlan {
    fragments: Vec<Fragment>,
}

impl FragmentPlan {
    /// Partition `region_len` bytes into fragments that fit the MTU
    ///
    /// `unfragmentable` is the number of bytes repeated in front of every
    /// fragment: the fixed IPv6 header plus the Hop-by-Hop header. The
    /// per-fragment budget reserves room for a Fragment header; a budget
    /// that cannot hold any 8-byte block when fragmentation is needed is a
    /// configuration error.
    pub fn split(region_len: usize, unfragmentable: usize, mtu: usize) -> Result<FragmentPlan> {
        let budget = mtu as i64 - unfragmentable as i64 - FRAGMENT_HDRLEN as i64;
        if budget <= 0 {
            return Err(Error::config(format!(
                "MTU {} leaves no room after {} bytes of unfragmentable headers",
                mtu, unfragmentable
            )));
        }
        let budget = budget as usize;

        if region_len > budget && budget < 8 {
            return Err(Error::config(format!(
                "per-fragment budget of {} bytes cannot hold an 8-byte block",
                budget
            )));
        }

        let mut fragments = Vec::new();
        let mut offset = 0usize;
        loop {
            let remaining = region_len - offset;
            let mut length = remaining.min(budget);
            if length < remaining {
                // Not the final fragment: trailing bytes that break the
                // 8-byte alignment roll into the next fragment.
                length &= !7;
            }

            fragments.push(Fragment { offset, length });
            offset += length;
            if offset == region_len {
                break;
            }
        }

        Ok(FragmentPlan { fragments })
    }

    /// Number of planned fragments; at least 1
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always false; even an empty region yields one (empty) fragment
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the datagram actually needs Fragment headers
    pub fn is_fragmented(&self) -> bool {
        self.fragments.len() > 1
    }

    /// Iterate over the planned fragments in ascending offset order
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// The planned fragments as a slice
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

/// IPv6 Fragment extension header (RFC 2460 section 4.5)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    /// Protocol number of the header following the reassembled fragments
    pub next_header: u8,
    /// Fragment offset in 8-byte units (13 bits)
    pub offset: u16,
    /// More-fragments flag; set on all but the last fragment
    pub more_fragments: bool,
    /// Identification value, constant across all fragments of a datagram
    pub identification: u32,
}

impl FragmentHeader {
    /// Serialize to the 8-byte wire format
    pub fn to_bytes(&self) -> [u8; FRAGMENT_HDRLEN] {
        let mut bytes = [0u8; FRAGMENT_HDRLEN];
        bytes[0] = self.next_header;
        // bytes[1] is reserved

        // 13-bit offset, 2 reserved bits, M flag
        let offset_and_flags = (self.offset << 3) | (self.more_fragments as u16);
        bytes[2..4].copy_from_slice(&offset_and_flags.to_be_bytes());
        bytes[4..8].copy_from_slice(&self.identification.to_be_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_single_fragment() {
        let plan = FragmentPlan::split(1000, 48, 1500).unwrap();
        assert_eq!(plan.len(), 1);
        assert!(!plan.is_fragmented());
        assert_eq!(plan.fragments()[0], Fragment { offset: 0, length: 1000 });
    }

    #[test]
    fn test_split_5000_bytes_at_mtu_1500() {
        // 5000 bytes with 48 bytes of unfragmentable overhead: budget is
        // 1500 - 48 - 8 = 1444, rounded down to 1440 for non-final
        // fragments.
        let plan = FragmentPlan::split(5000, 48, 1500).unwrap();

        let lengths: Vec<usize> = plan.iter().map(|f| f.length).collect();
        let offsets: Vec<usize> = plan.iter().map(|f| f.offset).collect();
        assert_eq!(lengths, vec![1440, 1440, 1440, 680]);
        assert_eq!(offsets, vec![0, 1440, 2880, 4320]);
    }

    #[test]
    fn test_split_reconstruction() {
        let region: Vec<u8> = (0..5000u32).map(|i| i as u8).collect();
        let plan = FragmentPlan::split(region.len(), 48, 1500).unwrap();

        let mut rebuilt = Vec::new();
        for fragment in plan.iter() {
            rebuilt.extend_from_slice(&region[fragment.offset..fragment.offset + fragment.length]);
        }
        assert_eq!(rebuilt, region);
    }

    #[test]
    fn test_split_non_final_fragments_are_8_aligned() {
        for region_len in [100usize, 999, 1441, 4096, 5001] {
            let plan = FragmentPlan::split(region_len, 42, 576).unwrap();
            let n = plan.len();
            for (i, fragment) in plan.iter().enumerate() {
                assert_eq!(fragment.offset % 8, 0);
                if i + 1 < n {
                    assert_eq!(fragment.length % 8, 0, "region_len {}", region_len);
                }
            }
            let total: usize = plan.iter().map(|f| f.length).sum();
            assert_eq!(total, region_len);
        }
    }

    #[test]
    fn test_split_contiguous_offsets() {
        let plan = FragmentPlan::split(10_000, 48, 1280).unwrap();
        let mut expected = 0;
        for fragment in plan.iter() {
            assert_eq!(fragment.offset, expected);
            expected += fragment.length;
        }
    }

    #[test]
    fn test_split_zero_length_region() {
        let plan = FragmentPlan::split(0, 48, 1500).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.fragments()[0], Fragment { offset: 0, length: 0 });
    }

    #[test]
    fn test_split_mtu_too_small() {
        assert!(FragmentPlan::split(1000, 1500, 1500).is_err());
        assert!(FragmentPlan::split(1000, 1492, 1500).is_err());
    }

    #[test]
    fn test_split_budget_below_block_size() {
        // Budget of 4 bytes can hold the whole region unfragmented but
        // never a non-final 8-byte block.
        assert!(FragmentPlan::split(4, 1488, 1500).is_ok());
        assert!(FragmentPlan::split(100, 1488, 1500).is_err());
    }

    #[test]
    fn test_fragment_header_encoding() {
        let header = FragmentHeader {
            next_header: 60,
            offset: 180, // 1440 bytes / 8
            more_fragments: true,
            identification: 31415,
        };
        let bytes = header.to_bytes();

        assert_eq!(bytes[0], 60);
        assert_eq!(bytes[1], 0);
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), (180 << 3) | 1);
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 31415);
    }

    #[test]
    fn test_fragment_header_last_fragment_clears_m_flag() {
        let header = FragmentHeader {
            next_header: 6,
            offset: 540,
            more_fragments: false,
            identification: 1,
        };
        let bytes = header.to_bytes();
        assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]) & 1, 0);
    }
}
