//! 6LoWPAN fragmentation headers (FRAG1 and FRAGN).
//!
//! Only the headers are decoded; payload reassembly is out of scope. The
//! remainder of a fragment still carries an IPHC or IPv6 header, so this
//! layer never terminates the chain and never changes the packet level.

use crate::{AnalyzerResult, Dissection, Level, Packet};

const DISPATCH_FRAG1: u8 = 0xc0;
const DISPATCH_FRAGN: u8 = 0xe0;
// Masking out the low three datagram-size bits covers both dispatches.
const DISPATCH_FRAG_MASK: u8 = 0xd8;

/// A decoded fragmentation header.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct FragHeader {
    pub datagram_size: u16,
    pub datagram_tag: u16,
    /// Fragment offset in units of 8 bytes; `None` for a first fragment.
    pub offset: Option<u8>,
    pub len: usize,
}

impl FragHeader {
    /// Parse the fragmentation header at the packet cursor.
    pub(crate) fn parse(packet: &Packet) -> Self {
        let first = packet.get(0);
        let offset = if first & 0xf8 == DISPATCH_FRAGN {
            Some(packet.get(4))
        } else {
            None
        };

        FragHeader {
            datagram_size: (u16::from(first & 0x07) << 8) | u16::from(packet.get(1)),
            datagram_tag: packet.get_int(2, 2) as u16,
            offset,
            len: if offset.is_some() { 5 } else { 4 },
        }
    }

    fn name(&self) -> &'static str {
        if self.offset.is_some() {
            "FRAGN"
        } else {
            "FRAG1"
        }
    }
}

pub(crate) fn matches(packet: &Packet) -> bool {
    packet.level() == Level::Network && packet.get(0) & DISPATCH_FRAG_MASK == DISPATCH_FRAG1
}

pub(crate) fn analyze(packet: &mut Packet, out: &mut Dissection) -> AnalyzerResult {
    let hdr = FragHeader::parse(packet);

    out.push_brief(hdr.name());

    let mut verbose = format!(
        "<b>{}</b><br>size = {}, tag = 0x{:04x}",
        hdr.name(),
        hdr.datagram_size,
        hdr.datagram_tag
    );
    if let Some(offset) = hdr.offset {
        verbose.push_str(&format!(", offset = {}", usize::from(offset) * 8));
    }
    out.push_verbose(&verbose);

    packet.consume_bytes_start(hdr.len);

    AnalyzerResult::Continue
}
