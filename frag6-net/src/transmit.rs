//! Raw Ethernet frame transmission
//!
//! Fragments must leave the machine strictly in ascending offset order,
//! and a send failure stops the run: IPv6 gives no way to cancel an
//! in-flight fragmented datagram, so the only correct behavior is to stop
//! and report which fragment failed.

use frag6_core::{Error, Result};
use frag6_packet::{EtherType, EthernetFrame, MacAddress};
use tracing::debug;

use crate::interface::find_interface;

/// A sink for link-layer frames
///
/// The production implementation wraps a pnet datalink channel; tests use
/// an in-memory implementation.
pub trait FrameTransmitter {
    /// Send one assembled frame
    fn transmit(&mut self, frame: &EthernetFrame) -> Result<()>;
}

/// Frame transmitter backed by a pnet datalink channel
pub struct DatalinkTransmitter {
    tx: Box<dyn pnet_datalink::DataLinkSender>,
}

impl DatalinkTransmitter {
    /// Open a raw datalink channel on the named interface
    pub fn open(interface_name: &str) -> Result<Self> {
        let iface = find_interface(interface_name)?;

        match pnet_datalink::channel(&iface, Default::default()) {
            Ok(pnet_datalink::Channel::Ethernet(tx, _rx)) => Ok(DatalinkTransmitter { tx }),
            Ok(_) => Err(Error::Interface(
                "unsupported datalink channel type".to_string(),
            )),
            Err(e) => Err(Error::Interface(format!(
                "failed to open datalink channel on '{}': {}",
                interface_name, e
            ))),
        }
    }
}

impl FrameTransmitter for DatalinkTransmitter {
    fn transmit(&mut self, frame: &EthernetFrame) -> Result<()> {
        let bytes = frame.to_bytes();
        match self.tx.send_to(&bytes, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(Error::Io(e)),
            None => Err(Error::Interface(
                "datalink channel refused the frame".to_string(),
            )),
        }
    }
}

/// Send the fragments of one datagram in ascending offset order
///
/// Each packet is framed with the given addresses and the IPv6 EtherType.
/// On the first failure the remaining fragments are not sent and the error
/// names the failing fragment index.
pub fn send_fragments<T: FrameTransmitter>(
    transmitter: &mut T,
    destination: MacAddress,
    source: MacAddress,
    packets: &[Vec<u8>],
) -> Result<()> {
    for (index, packet) in packets.iter().enumerate() {
        debug!(
            index,
            total = packets.len(),
            bytes = packet.len(),
            "sending fragment"
        );
        let frame = EthernetFrame::new(destination, source, EtherType::IPv6, packet.clone());
        transmitter.transmit(&frame).map_err(|e| Error::Transmission {
            index,
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Captures frames and fails from a chosen index onward
    struct MockTransmitter {
        sent: Vec<Vec<u8>>,
        fail_at: Option<usize>,
    }

    impl MockTransmitter {
        fn new(fail_at: Option<usize>) -> Self {
            MockTransmitter {
                sent: Vec::new(),
                fail_at,
            }
        }
    }

    impl FrameTransmitter for MockTransmitter {
        fn transmit(&mut self, frame: &EthernetFrame) -> Result<()> {
            if self.fail_at == Some(self.sent.len()) {
                return Err(Error::Interface("link down".to_string()));
            }
            self.sent.push(frame.to_bytes());
            Ok(())
        }
    }

    fn packets(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; 100]).collect()
    }

    #[test]
    fn test_sends_all_fragments_in_order() {
        let mut mock = MockTransmitter::new(None);
        send_fragments(
            &mut mock,
            MacAddress::BROADCAST,
            MacAddress::ZERO,
            &packets(4),
        )
        .unwrap();

        assert_eq!(mock.sent.len(), 4);
        for (i, frame) in mock.sent.iter().enumerate() {
            // Frames are sent in plan order, each carrying its packet
            // after the 14-byte Ethernet header.
            assert_eq!(frame[14], i as u8);
            assert_eq!(u16::from_be_bytes([frame[12], frame[13]]), 0x86DD);
        }
    }

    #[test]
    fn test_stops_on_first_failure() {
        let mut mock = MockTransmitter::new(Some(2));
        let result = send_fragments(
            &mut mock,
            MacAddress::BROADCAST,
            MacAddress::ZERO,
            &packets(5),
        );

        match result {
            Err(Error::Transmission { index, .. }) => assert_eq!(index, 2),
            other => panic!("expected transmission error, got {:?}", other.err()),
        }
        // Fragments after the failing one were never sent
        assert_eq!(mock.sent.len(), 2);
    }

    #[test]
    fn test_empty_packet_list_is_ok() {
        let mut mock = MockTransmitter::new(None);
        send_fragments(&mut mock, MacAddress::BROADCAST, MacAddress::ZERO, &[]).unwrap();
        assert!(mock.sent.is_empty());
    }
}
