//! Network interface link parameters

use frag6_core::{Error, Result};
use frag6_packet::MacAddress;
use pnet_datalink::NetworkInterface;

/// Link parameters needed to frame and fragment for an interface
#[derive(Debug, Clone)]
pub struct LinkInfo {
    /// Interface name (e.g. "eth0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// Maximum transmission unit in bytes
    pub mtu: u32,
    /// Hardware address of the interface
    pub mac: MacAddress,
}

/// Look up the pnet interface record by name
pub fn find_interface(name: &str) -> Result<NetworkInterface> {
    pnet_datalink::interfaces()
        .into_iter()
        .find(|iface| iface.name == name)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

/// Query MTU, hardware address, and index for a named interface
///
/// Any missing piece is fatal; the caller cannot build correctly sized
/// fragments without the real MTU or frame them without the real MAC.
pub fn link_info(name: &str) -> Result<LinkInfo> {
    let iface = find_interface(name)?;

    let mac = iface
        .mac
        .map(|mac| MacAddress([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
        .ok_or_else(|| {
            Error::Interface(format!("interface '{}' has no hardware address", name))
        })?;

    let mtu = read_mtu(name)?;

    Ok(LinkInfo {
        name: name.to_string(),
        index: iface.index,
        mtu,
        mac,
    })
}

/// Read the interface MTU from sysfs
///
/// pnet does not expose the MTU, so it comes straight from
/// /sys/class/net/<name>/mtu on Linux.
fn read_mtu(name: &str) -> Result<u32> {
    let path = format!("/sys/class/net/{}/mtu", name);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Interface(format!("failed to read MTU from {}: {}", path, e)))?;
    raw.trim()
        .parse::<u32>()
        .map_err(|e| Error::Interface(format!("unparseable MTU in {}: {}", path, e)))
}
