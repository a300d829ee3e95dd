//! Checksum calculations for network packets
//!
//! Internet checksum (RFC 1071) plus the IPv6 pseudo-header variant used
//! for the TCP checksum (RFC 2460 section 8.1).

/// Calculates the Internet Checksum as defined in RFC 1071.
///
/// The data is treated as a sequence of big-endian 16-bit words which are
/// summed with end-around carry; the result is the one's complement of the
/// folded sum. A trailing odd byte is zero-extended into a 16-bit word.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        let word = u16::from_be_bytes([chunk[0], chunk[1]]);
        sum += word as u32;
    }

    // Handle odd byte if present
    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
    }

    // Fold 32-bit sum to 16 bits
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !sum as u16
}

/// Calculates the upper-layer checksum over the IPv6 pseudo-header.
///
/// The pseudo-header is: source address (16 bytes), destination address
/// (16 bytes), the upper-layer packet length as a 32-bit big-endian
/// integer, three zero bytes, and the final protocol number.
///
/// `protocol` is the upper-layer protocol number (6 for TCP), never the
/// IPv6 header's own next-header field, which may point at an extension
/// header when options or fragmentation are in play.
///
/// `segment` is the complete upper-layer header and payload with the
/// checksum field held at zero.
pub fn transport_checksum_v6(
    src: &[u8; 16],
    dst: &[u8; 16],
    protocol: u8,
    segment: &[u8],
) -> u16 {
    let mut pseudo = Vec::with_capacity(40 + segment.len());

    // Source address (16 bytes)
    pseudo.extend_from_slice(src);

    // Destination address (16 bytes)
    pseudo.extend_from_slice(dst);

    // Upper-layer packet length (4 bytes)
    pseudo.extend_from_slice(&(segment.len() as u32).to_be_bytes());

    // Zero field (3 bytes) and protocol number (1 byte)
    pseudo.extend_from_slice(&[0, 0, 0, protocol]);

    // Upper-layer header and payload
    pseudo.extend_from_slice(segment);

    internet_checksum(&pseudo)
}
