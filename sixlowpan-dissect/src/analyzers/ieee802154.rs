//! IEEE 802.15.4 MAC layer, the mandatory first link of the chain.

use log::warn;

use crate::{Address, AnalyzerResult, Dissection, Level, Packet, PcapExporter};

const TYPE_BEACON: u8 = 0;
const TYPE_DATA: u8 = 1;
const TYPE_ACK: u8 = 2;
const TYPE_CMD: u8 = 3;

const MODE_NO_ADDRESS: u8 = 0;
const MODE_SHORT: u8 = 2;
const MODE_EXTENDED: u8 = 3;

/// Decoded MAC header fields.
#[derive(Debug, Default)]
pub(crate) struct MacHeader {
    pub frame_type: u8,
    pub security: bool,
    pub frame_pending: bool,
    pub ack_requested: bool,
    pub intra_pan: bool,
    pub dst_mode: u8,
    pub frame_version: u8,
    pub src_mode: u8,
    pub seq_no: u8,
    pub dst_pan: u16,
    pub src_pan: u16,
    pub dst: Address,
    pub src: Address,
    /// Header length in bytes, counted from the frame control field.
    pub len: usize,
}

impl MacHeader {
    /// Parse the MAC header at the packet cursor.
    pub(crate) fn parse(packet: &Packet) -> Self {
        let fcf0 = packet.get(0);
        let fcf1 = packet.get(1);

        let mut hdr = MacHeader {
            frame_type: fcf0 & 0x07,
            security: fcf0 & 0x08 != 0,
            frame_pending: fcf0 & 0x10 != 0,
            ack_requested: fcf0 & 0x20 != 0,
            intra_pan: fcf0 & 0x40 != 0,
            dst_mode: (fcf1 >> 2) & 0x03,
            frame_version: (fcf1 >> 4) & 0x03,
            src_mode: (fcf1 >> 6) & 0x03,
            seq_no: packet.get(2),
            len: 3,
            ..MacHeader::default()
        };

        // An acknowledgment carries no addressing fields.
        if hdr.frame_type == TYPE_ACK {
            return hdr;
        }

        if hdr.dst_mode != MODE_NO_ADDRESS {
            hdr.dst_pan = u16::from(packet.get(hdr.len)) | u16::from(packet.get(hdr.len + 1)) << 8;
            hdr.len += 2;
            hdr.dst = read_address(packet, &mut hdr.len, hdr.dst_mode);
        }

        if hdr.src_mode != MODE_NO_ADDRESS {
            if hdr.intra_pan {
                // PAN ID compression: the source PAN is the destination PAN.
                hdr.src_pan = hdr.dst_pan;
            } else {
                hdr.src_pan =
                    u16::from(packet.get(hdr.len)) | u16::from(packet.get(hdr.len + 1)) << 8;
                hdr.len += 2;
            }
            hdr.src = read_address(packet, &mut hdr.len, hdr.src_mode);
        }

        hdr
    }

    fn type_brief(&self) -> char {
        match self.frame_type {
            TYPE_BEACON => 'B',
            TYPE_DATA => 'D',
            TYPE_ACK => 'A',
            TYPE_CMD => 'C',
            _ => '-',
        }
    }

    fn type_verbose(&self) -> &'static str {
        match self.frame_type {
            TYPE_BEACON => "Beacon",
            TYPE_DATA => "Data",
            TYPE_ACK => "Ack",
            TYPE_CMD => "Command",
            _ => "Unknown",
        }
    }
}

fn read_address(packet: &Packet, offset: &mut usize, mode: u8) -> Address {
    let mut wire = [0u8; 8];
    let len = match mode {
        MODE_SHORT => 2,
        MODE_EXTENDED => 8,
        _ => return Address::Absent,
    };
    packet.copy(*offset, &mut wire[..len]);
    *offset += len;
    Address::from_wire(&wire[..len])
}

/// The MAC layer always matches first.
pub(crate) fn matches(packet: &Packet) -> bool {
    packet.level() == Level::Mac
}

pub(crate) fn analyze(
    packet: &mut Packet,
    out: &mut Dissection,
    pcap: Option<&mut PcapExporter>,
) -> AnalyzerResult {
    // Export the original, un-consumed frame bytes before parsing.
    if let Some(exporter) = pcap {
        if let Err(e) = exporter.export(packet.raw(), packet.timestamp_us()) {
            warn!("pcap export failed: {e}");
        }
    }

    let hdr = MacHeader::parse(packet);

    if hdr.frame_type == TYPE_ACK {
        out.push_brief(&format!("15.4 A {}", hdr.seq_no));
        out.push_verbose(&format!("<b>IEEE 802.15.4 Ack #{}</b>", hdr.seq_no));
        return AnalyzerResult::Final;
    }

    if check_fcs(packet).is_some_and(|ok| !ok) {
        warn!("frame #{}: FCS mismatch", hdr.seq_no);
    }

    out.push_brief(&format!("15.4 {} {}", hdr.type_brief(), hdr.dst));
    out.push_verbose(&format!(
        "<b>IEEE 802.15.4 {} #{}</b><br>\
         From 0x{:04x}/{} to 0x{:04x}/{}<br>\
         Security = {}, Pending = {}, Ack req = {}, iPAN = {}, Vers. = {}",
        hdr.type_verbose(),
        hdr.seq_no,
        hdr.src_pan,
        hdr.src,
        hdr.dst_pan,
        hdr.dst,
        hdr.security as u8,
        hdr.frame_pending as u8,
        hdr.ack_requested as u8,
        hdr.intra_pan as u8,
        hdr.frame_version,
    ));

    packet.llsender = hdr.src;
    packet.llreceiver = hdr.dst;
    packet.consume_bytes_start(hdr.len);
    packet.consume_bytes_end(2);
    packet.level = Level::Network;

    AnalyzerResult::Continue
}

/// Verify the trailing FCS, if at least the FCS itself is present.
fn check_fcs(packet: &Packet) -> Option<bool> {
    let window = packet.payload();
    if window.len() < 2 {
        return None;
    }
    let (content, fcs) = window.split_at(window.len() - 2);
    Some(crc16(content) == u16::from_le_bytes([fcs[0], fcs[1]]))
}

/// The 16-bit ITU-T CRC used by IEEE 802.15.4, with both the initial and
/// final values 0x0000 instead of 0xFFFF. Calculated over the entire frame
/// excluding the FCS field itself.
pub(crate) fn crc16(data: &[u8]) -> u16 {
    const CRC_16_IEEE802154: crc::Algorithm<u16> = crc::Algorithm {
        width: 16,
        poly: 0x1021,
        init: 0x0000,
        refin: true,
        refout: true,
        xorout: 0x0000,
        check: 0x2189,
        residue: 0x0000,
    };
    crc::Crc::<u16>::new(&CRC_16_IEEE802154).checksum(data)
}
