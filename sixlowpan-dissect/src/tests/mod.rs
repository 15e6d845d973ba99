use crate::*;

mod iphc;
mod mac;
mod pcap;

/// A packet positioned after the MAC layer, as the adaptation-layer
/// analyzers see it.
pub(crate) fn network_packet(bytes: &[u8]) -> Packet {
    Packet::new(bytes.to_vec(), Level::Network, 0)
}

/// Append a valid FCS to a frame.
pub(crate) fn with_fcs(mut frame: Vec<u8>) -> Vec<u8> {
    let fcs = crate::analyzers::ieee802154::crc16(&frame);
    frame.extend_from_slice(&fcs.to_le_bytes());
    frame
}
