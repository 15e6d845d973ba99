//! Uncompressed IPv6 behind the 6LoWPAN IPv6 dispatch byte.

use std::net::Ipv6Addr;

use crate::{AnalyzerResult, Dissection, Level, Packet};

const DISPATCH_IPV6: u8 = 0x41;

/// Dispatch byte plus the fixed 40-byte RFC 2460 header.
const HEADER_LEN: usize = 41;

/// The fixed-offset RFC 2460 header fields.
#[derive(Debug)]
pub(crate) struct Ipv6Header {
    pub version: u8,
    pub traffic_class: u8,
    pub flow_label: u32,
    pub payload_len: u16,
    pub next_header: u8,
    pub hop_limit: u8,
    pub src: [u8; 16],
    pub dst: [u8; 16],
}

impl Ipv6Header {
    /// Parse the header behind the dispatch byte at the packet cursor.
    pub(crate) fn parse(packet: &Packet) -> Self {
        let mut src = [0; 16];
        let mut dst = [0; 16];
        packet.copy(9, &mut src);
        packet.copy(25, &mut dst);

        Ipv6Header {
            version: packet.get(1) >> 4,
            traffic_class: (packet.get(1) << 4) | (packet.get(2) >> 4),
            flow_label: (u32::from(packet.get(2) & 0x0f) << 16)
                | (u32::from(packet.get(3)) << 8)
                | u32::from(packet.get(4)),
            payload_len: packet.get_int(5, 2) as u16,
            next_header: packet.get(7),
            hop_limit: packet.get(8),
            src,
            dst,
        }
    }
}

pub(crate) fn matches(packet: &Packet) -> bool {
    packet.level() == Level::Network && packet.get(0) == DISPATCH_IPV6
}

pub(crate) fn analyze(packet: &mut Packet, out: &mut Dissection) -> AnalyzerResult {
    if packet.len() < HEADER_LEN {
        return AnalyzerResult::Failed;
    }

    let hdr = Ipv6Header::parse(packet);

    out.push_brief("IPv6");
    out.push_verbose(&format!(
        "<b>IPv6</b><br>\
         vers. = {}, TC = {}, FL = 0x{:05x}, len = {}, NH = {}, HL = {}<br>\
         src = {}<br>dst = {}",
        hdr.version,
        hdr.traffic_class,
        hdr.flow_label,
        hdr.payload_len,
        hdr.next_header,
        hdr.hop_limit,
        Ipv6Addr::from(hdr.src),
        Ipv6Addr::from(hdr.dst),
    ));

    packet.consume_bytes_start(HEADER_LEN);
    packet.last_dispatch = hdr.next_header;
    packet.level = Level::Application;

    AnalyzerResult::Continue
}
