//! IPv6 extension header options with alignment-driven padding
//!
//! Hop-by-hop and destination options carry an alignment requirement of the
//! form xN + y: the option type byte must land at an offset congruent to y
//! modulo x, measured from the start of the extension header. Padding is
//! inserted with the Pad1 and PadN options, and the whole header is padded
//! out to a multiple of 8 bytes (RFC 2460 section 4.2).

use bytes::{BufMut, BytesMut};
use frag6_core::{Error, Result};

/// Pad1 option type: a single zero byte, no length field
pub const PAD1: u8 = 0;

/// PadN option type: type byte, length byte, then length zero bytes
pub const PADN: u8 = 1;

/// Largest option data length encodable in the one-byte length field
pub const MAX_OPTION_DATA: usize = 255;

/// Alignment requirement xN + y for an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Multiple x; must be at least 1
    pub multiple: u32,
    /// Remainder y
    pub remainder: u32,
}

impl Alignment {
    /// No alignment requirement (1n + 0)
    pub const NONE: Alignment = Alignment {
        multiple: 1,
        remainder: 0,
    };

    /// 8-byte boundary (8n + 0), used to close out an extension header
    pub const EIGHT: Alignment = Alignment {
        multiple: 8,
        remainder: 0,
    };

    /// Create a new alignment requirement
    ///
    /// A multiple of zero or a remainder not below the multiple is a
    /// programming error at the call site, not a recoverable condition;
    /// `padding_for` will panic on either. `Ipv6Option::new` rejects such
    /// alignments with a configuration error instead.
    pub fn new(multiple: u32, remainder: u32) -> Self {
        Alignment {
            multiple,
            remainder,
        }
    }

    /// Whether any offset can satisfy this alignment
    ///
    /// Requires a nonzero multiple and a remainder below it; with
    /// `remainder >= multiple` no offset is ever congruent to it.
    pub fn is_satisfiable(&self) -> bool {
        self.multiple >= 1 && self.remainder < self.multiple
    }
}

/// Compute the minimal padding that moves `offset` to the alignment
///
/// Returns the encoded Pad1/PadN bytes; the caller advances its offset by
/// the returned length. Zero bytes are returned when the offset already
/// satisfies the alignment.
pub fn padding_for(offset: usize, align: Alignment) -> Vec<u8> {
    assert!(align.multiple >= 1, "alignment multiple must be at least 1");
    assert!(
        align.remainder < align.multiple,
        "alignment remainder must be below the multiple"
    );

    let x = align.multiple as usize;
    let y = align.remainder as usize;

    let mut need = 0;
    while (offset + need) % x != y {
        need += 1;
    }

    match need {
        0 => Vec::new(),
        1 => vec![PAD1],
        n => {
            // PadN: type, length byte (n - 2), then n - 2 zero bytes
            let mut pad = Vec::with_capacity(n);
            pad.push(PADN);
            pad.push((n - 2) as u8);
            pad.resize(n, 0);
            pad
        }
    }
}

/// A single hop-by-hop or destination option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Option {
    /// Option type byte
    pub kind: u8,
    /// Option data (excludes the type and length bytes)
    pub data: Vec<u8>,
    /// Alignment requirement for the option type byte
    pub align: Alignment,
}

impl Ipv6Option {
    /// Router Alert option type (RFC 2711)
    pub const ROUTER_ALERT: u8 = 5;

    /// ILNP Nonce option type (RFC 6744)
    pub const ILNP_NONCE: u8 = 139;

    /// Create an option from raw parts
    pub fn new(kind: u8, data: Vec<u8>, align: Alignment) -> Result<Self> {
        if !align.is_satisfiable() {
            return Err(Error::config(format!(
                "unsatisfiable alignment {}n + {}",
                align.multiple, align.remainder
            )));
        }
        if data.len() > MAX_OPTION_DATA {
            return Err(Error::config(format!(
                "option data length {} exceeds maximum {}",
                data.len(),
                MAX_OPTION_DATA
            )));
        }
        Ok(Ipv6Option { kind, data, align })
    }

    /// Router Alert hop-by-hop option with the given 16-bit value
    ///
    /// Alignment is 2n + 0 per RFC 2711 section 2.1.
    pub fn router_alert(value: u16) -> Self {
        Ipv6Option {
            kind: Self::ROUTER_ALERT,
            data: value.to_be_bytes().to_vec(),
            align: Alignment::new(2, 0),
        }
    }

    /// ILNP Nonce destination option
    ///
    /// Alignment is 4n + 2 per RFC 6744 section 2, so the nonce itself
    /// starts on a 4-byte boundary. The nonce must be 4 or 12 bytes long.
    pub fn ilnp_nonce(nonce: &[u8]) -> Result<Self> {
        if nonce.len() != 4 && nonce.len() != 12 {
            return Err(Error::config(format!(
                "ILNP nonce must be 4 or 12 bytes, got {}",
                nonce.len()
            )));
        }
        Ok(Ipv6Option {
            kind: Self::ILNP_NONCE,
            data: nonce.to_vec(),
            align: Alignment::new(4, 2),
        })
    }

    /// Encoded size: type byte, length byte, and data
    pub fn encoded_len(&self) -> usize {
        2 + self.data.len()
    }

    fn encode_into(&self, buf: &mut BytesMut) {
        buf.put_u8(self.kind);
        buf.put_u8(self.data.len() as u8);
        buf.put_slice(&self.data);
    }
}

/// Which extension header an option list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionKind {
    /// Hop-by-Hop Options header (protocol number 0), unfragmentable part
    HopByHop,
    /// Destination Options header (protocol number 60), fragmentable part
    Destination,
}

/// A fully laid-out extension header, minus its next-header byte
///
/// The next-header value depends on which headers follow in the chain and
/// whether the datagram is fragmented, so it is supplied at serialization
/// time rather than at layout time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionHeader {
    kind: ExtensionKind,
    /// Options and padding; excludes the 2-byte next-header/length stub
    body: Vec<u8>,
}

impl ExtensionHeader {
    /// Lay out an ordered option list into a padded extension header
    ///
    /// Returns `None` for an empty option list: a header with zero options
    /// is never emitted and is absent from the next-header chain. Option
    /// order is preserved; alignment padding is order-dependent.
    pub fn layout(kind: ExtensionKind, options: &[Ipv6Option]) -> Option<Self> {
        if options.is_empty() {
            return None;
        }

        let mut body = BytesMut::new();
        // The offset counts from the start of the header, so the 2-byte
        // next-header/length stub is already behind us.
        let mut offset = 2usize;

        for option in options {
            let pad = padding_for(offset, option.align);
            offset += pad.len();
            body.put_slice(&pad);

            option.encode_into(&mut body);
            offset += option.encoded_len();
        }

        // Round the whole header out to an 8-byte boundary (RFC 2460 4.2).
        let tail = padding_for(offset, Alignment::EIGHT);
        offset += tail.len();
        body.put_slice(&tail);

        debug_assert_eq!(offset % 8, 0);
        debug_assert_eq!(offset, 2 + body.len());

        Some(ExtensionHeader {
            kind,
            body: body.to_vec(),
        })
    }

    /// Which header this is
    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    /// Total encoded length, always a multiple of 8
    pub fn len(&self) -> usize {
        2 + self.body.len()
    }

    /// Always false; a laid-out header has at least one option
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Header Extension Length field: length in 8-byte units, not counting
    /// the first 8 bytes (RFC 2460 section 4.3)
    pub fn length_field(&self) -> u8 {
        ((self.len() / 8).saturating_sub(1)) as u8
    }

    /// Serialize with the resolved next-header value
    pub fn to_bytes(&self, next_header: u8) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        buf.push(next_header);
        buf.push(self.length_field());
        buf.extend_from_slice(&self.body);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_none_needed() {
        assert!(padding_for(2, Alignment::new(2, 0)).is_empty());
        assert!(padding_for(0, Alignment::NONE).is_empty());
        assert!(padding_for(16, Alignment::EIGHT).is_empty());
    }

    #[test]
    fn test_padding_one_byte_is_pad1() {
        let pad = padding_for(1, Alignment::new(2, 0));
        assert_eq!(pad, vec![PAD1]);
    }

    #[test]
    fn test_padding_two_bytes_is_padn() {
        // Two bytes of padding must be PadN with a zero length byte, never
        // two Pad1 options.
        let pad = padding_for(6, Alignment::EIGHT);
        assert_eq!(pad, vec![PADN, 0]);
    }

    #[test]
    fn test_padding_multi_byte_padn() {
        let pad = padding_for(3, Alignment::EIGHT);
        assert_eq!(pad.len(), 5);
        assert_eq!(pad[0], PADN);
        assert_eq!(pad[1], 3);
        assert!(pad[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_padding_is_minimal() {
        for offset in 0..32usize {
            for x in 1..=8u32 {
                for y in 0..x {
                    let pad = padding_for(offset, Alignment::new(x, y));
                    let landed = offset + pad.len();
                    assert_eq!(
                        landed % x as usize,
                        y as usize,
                        "offset {} align {}n+{}",
                        offset,
                        x,
                        y
                    );
                    // Minimality: no shorter padding satisfies the alignment
                    for shorter in 0..pad.len() {
                        assert_ne!((offset + shorter) % x as usize, y as usize);
                    }
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "remainder must be below the multiple")]
    fn test_padding_unsatisfiable_remainder_panics() {
        // No offset is ever congruent to 5 mod 2; the search must not spin.
        padding_for(2, Alignment::new(2, 5));
    }

    #[test]
    fn test_option_rejects_bad_alignment() {
        assert!(Ipv6Option::new(5, vec![0; 2], Alignment::new(2, 5)).is_err());
        assert!(Ipv6Option::new(5, vec![0; 2], Alignment::new(0, 0)).is_err());
        assert!(Ipv6Option::new(5, vec![0; 2], Alignment::new(8, 7)).is_ok());
    }

    #[test]
    fn test_option_data_too_long() {
        let result = Ipv6Option::new(5, vec![0; 256], Alignment::NONE);
        assert!(result.is_err());
    }

    #[test]
    fn test_ilnp_nonce_length_validation() {
        assert!(Ipv6Option::ilnp_nonce(&[0; 4]).is_ok());
        assert!(Ipv6Option::ilnp_nonce(&[0; 12]).is_ok());
        assert!(Ipv6Option::ilnp_nonce(&[0; 8]).is_err());
    }

    #[test]
    fn test_layout_empty_options_is_omitted() {
        assert!(ExtensionHeader::layout(ExtensionKind::HopByHop, &[]).is_none());
    }

    #[test]
    fn test_layout_router_alert() {
        // Router alert at offset 2: 2 mod 2 == 0, so no leading pad. The
        // option occupies bytes 2..6, then PadN(0) brings the header to 8.
        let hdr = ExtensionHeader::layout(
            ExtensionKind::HopByHop,
            &[Ipv6Option::router_alert(5)],
        )
        .unwrap();

        assert_eq!(hdr.len(), 8);
        assert_eq!(hdr.length_field(), 0);

        let bytes = hdr.to_bytes(6);
        assert_eq!(bytes[0], 6); // next header
        assert_eq!(bytes[1], 0); // length field
        assert_eq!(bytes[2], Ipv6Option::ROUTER_ALERT);
        assert_eq!(bytes[3], 2); // option data length
        assert_eq!(&bytes[4..6], &[0, 5]); // alert value
        assert_eq!(&bytes[6..8], &[PADN, 0]); // trailing PadN
    }

    #[test]
    fn test_layout_ilnp_nonce() {
        // Nonce option at offset 2: 2 mod 4 == 2, so no leading pad. The
        // option occupies bytes 2..16, which is already 8-aligned.
        let nonce = [4, 35, 229, 0, 79, 50, 211, 23, 156, 170, 102, 116];
        let hdr = ExtensionHeader::layout(
            ExtensionKind::Destination,
            &[Ipv6Option::ilnp_nonce(&nonce).unwrap()],
        )
        .unwrap();

        assert_eq!(hdr.len(), 16);
        assert_eq!(hdr.length_field(), 1);

        let bytes = hdr.to_bytes(6);
        assert_eq!(bytes[2], Ipv6Option::ILNP_NONCE);
        assert_eq!(bytes[3], 12);
        assert_eq!(&bytes[4..16], &nonce);
    }

    #[test]
    fn test_layout_always_multiple_of_eight() {
        for data_len in 0..24usize {
            let opt = Ipv6Option::new(30, vec![0xAB; data_len], Alignment::new(4, 0)).unwrap();
            let hdr = ExtensionHeader::layout(ExtensionKind::Destination, &[opt]).unwrap();
            assert_eq!(hdr.len() % 8, 0, "data_len {}", data_len);
            assert_eq!(hdr.length_field() as usize, hdr.len() / 8 - 1);
        }
    }

    #[test]
    fn test_layout_preserves_option_order() {
        let first = Ipv6Option::router_alert(5);
        let second = Ipv6Option::new(30, vec![1, 2, 3], Alignment::NONE).unwrap();
        let hdr =
            ExtensionHeader::layout(ExtensionKind::HopByHop, &[first.clone(), second.clone()])
                .unwrap();

        let bytes = hdr.to_bytes(0);
        assert_eq!(bytes[2], first.kind);
        // Second option follows the first directly (no alignment needed at
        // offset 6 for a 1n+0 option).
        assert_eq!(bytes[6], second.kind);
        assert_eq!(bytes[7], 3);
        assert_eq!(&bytes[8..11], &[1, 2, 3]);
    }

    #[test]
    fn test_layout_inserts_alignment_padding() {
        // A 4n+2 option after a 2-byte option at offset 2 sits at offset 6:
        // 6 mod 4 == 2, no pad. Shift it with a 1-byte option instead.
        let one_byte = Ipv6Option::new(30, vec![], Alignment::NONE).unwrap();
        let aligned = Ipv6Option::new(31, vec![0xFF; 4], Alignment::new(4, 2)).unwrap();
        let hdr = ExtensionHeader::layout(ExtensionKind::Destination, &[one_byte, aligned])
            .unwrap();

        let bytes = hdr.to_bytes(0);
        // First option at 2..4, next 4n+2 slot is 6, so one Pad1 at 4... no:
        // offset 4 mod 4 == 0, need 2 -> PadN(0) at 4..6, option at 6.
        assert_eq!(&bytes[4..6], &[PADN, 0]);
        assert_eq!(bytes[6], 31);
    }
}
