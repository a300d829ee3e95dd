//! Example: Building a fragmented IPv6 TCP datagram
//!
//! This example builds a TCP SYN datagram with a Router Alert hop-by-hop
//! option and an ILNP nonce destination option, fragments it for a
//! 1500-byte MTU, and prints the resulting fragment layout.

use frag6_packet::builder::DatagramBuilder;
use frag6_packet::options::Ipv6Option;
use frag6_packet::tcp::{TcpFlags, TcpHeader, TcpPort};

fn main() {
    let tcp = TcpHeader::new(
        TcpPort::new(54321),
        TcpPort::HTTP,
        1000, // Initial sequence number
        0,    // Acknowledgment number (0 for SYN)
        TcpFlags::SYN,
        65535,
    );

    let nonce = [4, 35, 229, 0, 79, 50, 211, 23, 156, 170, 102, 116];

    let fragments = DatagramBuilder::new(
        "2001:db8::214:51ff:fe2f:1556".parse().unwrap(),
        "2001:db8::1".parse().unwrap(),
        tcp,
    )
    .hop_by_hop_option(Ipv6Option::router_alert(5))
    .destination_option(Ipv6Option::ilnp_nonce(&nonce).unwrap())
    .payload(vec![0x42; 5000])
    .build(1500)
    .expect("Failed to build datagram");

    println!("Datagram split into {} fragments:", fragments.len());
    for (i, fragment) in fragments.iter().enumerate() {
        println!("  fragment {}: {} bytes", i, fragment.len());
    }
}
