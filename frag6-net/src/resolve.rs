//! Target name and literal resolution to IPv6 addresses

use frag6_core::{Error, Result};
use std::net::{Ipv6Addr, SocketAddr, ToSocketAddrs};

/// Resolve a host name or IPv6 literal to an IPv6 address
///
/// Literals skip the resolver entirely. Name resolution takes the first
/// IPv6 address returned; a name that only resolves to IPv4 is an error,
/// since this tool emits IPv6 exclusively.
pub fn resolve_ipv6(target: &str) -> Result<Ipv6Addr> {
    if let Ok(addr) = target.parse::<Ipv6Addr>() {
        return Ok(addr);
    }

    let addrs = (target, 0u16)
        .to_socket_addrs()
        .map_err(|e| Error::resolution(format!("failed to resolve '{}': {}", target, e)))?;

    addrs
        .filter_map(|addr| match addr {
            SocketAddr::V6(v6) => Some(*v6.ip()),
            SocketAddr::V4(_) => None,
        })
        .next()
        .ok_or_else(|| Error::resolution(format!("no IPv6 address found for '{}'", target)))
}
