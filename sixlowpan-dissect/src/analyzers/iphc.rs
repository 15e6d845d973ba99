//! 6LoWPAN IPHC (HC-06) header decompression, RFC 6282 § 3.1.
//!
//! The compressed header is a sequence of optional fields whose presence
//! and width depend on bits decided earlier, so decoding is a strict
//! left-to-right cursor advance:
//!
//! ```txt
//!    0                                       1
//!    0   1   2   3   4   5   6   7   8   9   0   1   2   3   4   5
//!  +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//!  | 0 | 1 | 1 |  TF   |NH | HLIM  |CID|SAC|  SAM  | M |DAC|  DAM  |
//!  +---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+---+
//! ```
//!
//! Elided interface identifiers are reconstructed from the link-layer
//! addresses the MAC layer captured; stateful modes take their prefix from
//! the injected [`AddressContexts`] table.

use std::net::Ipv6Addr;

use super::proto;
use crate::{AddressContexts, AnalyzerResult, Dissection, Level, Packet};

const DISPATCH_IPHC: u8 = 0x60;
const DISPATCH_IPHC_MASK: u8 = 0xe0;

const NHC_UDP_ID: u8 = 0xf0;
const NHC_UDP_MASK: u8 = 0xf8;

const UDP_8BIT_PORT: u16 = 0xf000;
const UDP_4BIT_PORT: u16 = 0xf0b0;

const LINK_LOCAL_PREFIX: [u8; 2] = [0xfe, 0x80];

/// A fault while decompressing; reported as an inline annotation, never a
/// pipeline abort.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DecodeError {
    /// A stateful address mode referenced an unconfigured context index.
    UnknownContext(u8),
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DecodeError::UnknownContext(index) => write!(f, "unknown address context {index}"),
        }
    }
}

/// The decompressed header fields.
///
/// Filled in decoding order, so on error the fields decoded so far remain
/// available for partial display.
#[derive(Debug, Default)]
pub(crate) struct Iphc {
    pub tf: u8,
    pub nh_compressed: bool,
    pub hlim: u8,
    pub cid: bool,
    pub sac: bool,
    pub sam: u8,
    pub multicast: bool,
    pub dac: bool,
    pub dam: u8,
    pub sci: u8,
    pub dci: u8,
    pub traffic_class: u8,
    pub flow_label: u32,
    pub next_header: u8,
    pub hop_limit: u8,
    pub src: [u8; 16],
    pub dst: [u8; 16],
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    /// `M=1, DAC=1` is not supported; passed through as unspecified.
    pub mcast_context_unsupported: bool,
    /// Bytes consumed from the packet so far.
    pub len: usize,
}

impl Iphc {
    /// Decompress the header at the packet cursor.
    ///
    /// On error the fields already decoded, and the byte count already
    /// consumed, are left in place.
    pub(crate) fn decode(&mut self, packet: &Packet, contexts: &AddressContexts) -> Result<(), DecodeError> {
        let b0 = packet.get(0);
        let b1 = packet.get(1);

        self.tf = (b0 >> 3) & 0x03;
        self.nh_compressed = b0 & 0x04 != 0;
        self.hlim = b0 & 0x03;

        self.cid = b1 & 0x80 != 0;
        self.sac = b1 & 0x40 != 0;
        self.sam = (b1 >> 4) & 0x03;
        self.multicast = b1 & 0x08 != 0;
        self.dac = b1 & 0x04 != 0;
        self.dam = b1 & 0x03;

        self.len = 2;
        if self.cid {
            self.sci = packet.get(2) >> 4;
            self.dci = packet.get(2) & 0x0f;
            self.len = 3;
        }

        self.decode_traffic_class(packet);
        if !self.nh_compressed {
            self.next_header = packet.get(self.len);
            self.len += 1;
        }
        self.decode_hop_limit(packet);
        self.decode_src(packet, contexts)?;
        self.decode_dst(packet, contexts)?;
        self.decode_next_header(packet);

        Ok(())
    }

    /// Inline traffic class and flow label, per the TF mode.
    ///
    /// HC-06 stores the ECN bits before the DSCP bits, the inverse of the
    /// uncompressed traffic-class octet, so the inline byte is unshuffled
    /// rather than taken as-is.
    fn decode_traffic_class(&mut self, packet: &Packet) {
        match self.tf {
            // ECN + DSCP + 4-bit pad + 20-bit flow label.
            0b00 => {
                let b = packet.get(self.len);
                self.traffic_class = (b >> 6) | ((b & 0x3f) << 2);
                self.flow_label = (u32::from(packet.get(self.len + 1) & 0x0f) << 16)
                    | (u32::from(packet.get(self.len + 2)) << 8)
                    | u32::from(packet.get(self.len + 3));
                self.len += 4;
            }
            // ECN + 2-bit pad + 20-bit flow label, DSCP elided.
            0b01 => {
                let b = packet.get(self.len);
                self.traffic_class = b >> 6;
                self.flow_label = (u32::from(b & 0x0f) << 16)
                    | (u32::from(packet.get(self.len + 1)) << 8)
                    | u32::from(packet.get(self.len + 2));
                self.len += 3;
            }
            // ECN + DSCP, flow label elided.
            0b10 => {
                let b = packet.get(self.len);
                self.traffic_class = (b >> 6) | ((b & 0x3f) << 2);
                self.len += 1;
            }
            // Everything elided.
            _ => {}
        }
    }

    fn decode_hop_limit(&mut self, packet: &Packet) {
        self.hop_limit = match self.hlim {
            0b00 => {
                let inline = packet.get(self.len);
                self.len += 1;
                inline
            }
            0b01 => 1,
            0b10 => 64,
            _ => 255,
        };
    }

    fn decode_src(&mut self, packet: &Packet, contexts: &AddressContexts) -> Result<(), DecodeError> {
        if self.sac {
            // Stateful: SAM 00 is the unspecified address, the rest build
            // on the context prefix.
            if self.sam != 0b00 {
                let prefix = contexts
                    .prefix(self.sci)
                    .ok_or(DecodeError::UnknownContext(self.sci))?;
                self.src[..8].copy_from_slice(prefix);
                self.decode_iid(packet, true);
            }
        } else {
            match self.sam {
                // Full address inline.
                0b00 => {
                    let mut addr = [0; 16];
                    packet.copy(self.len, &mut addr);
                    self.src = addr;
                    self.len += 16;
                }
                _ => {
                    self.src[..2].copy_from_slice(&LINK_LOCAL_PREFIX);
                    self.decode_iid(packet, true);
                }
            }
        }
        Ok(())
    }

    fn decode_dst(&mut self, packet: &Packet, contexts: &AddressContexts) -> Result<(), DecodeError> {
        if self.multicast {
            if self.dac {
                // TODO(rfc6282 §3.1.2): unicast-prefix-based multicast is
                // not decoded; the address is left unspecified.
                self.mcast_context_unsupported = true;
                return Ok(());
            }
            match self.dam {
                // Full address inline.
                0b00 => {
                    let mut addr = [0; 16];
                    packet.copy(self.len, &mut addr);
                    self.dst = addr;
                    self.len += 16;
                }
                // ffXX::00XX:XXXX:XXXX
                0b01 => {
                    self.dst[0] = 0xff;
                    self.dst[1] = packet.get(self.len);
                    let mut tail = [0; 5];
                    packet.copy(self.len + 1, &mut tail);
                    self.dst[11..16].copy_from_slice(&tail);
                    self.len += 6;
                }
                // ffXX::00XX:XXXX
                0b10 => {
                    self.dst[0] = 0xff;
                    self.dst[1] = packet.get(self.len);
                    let mut tail = [0; 3];
                    packet.copy(self.len + 1, &mut tail);
                    self.dst[13..16].copy_from_slice(&tail);
                    self.len += 4;
                }
                // ff02::00XX
                _ => {
                    self.dst[0] = 0xff;
                    self.dst[1] = 0x02;
                    self.dst[15] = packet.get(self.len);
                    self.len += 1;
                }
            }
            return Ok(());
        }

        if self.dac {
            if self.dam != 0b00 {
                let prefix = contexts
                    .prefix(self.dci)
                    .ok_or(DecodeError::UnknownContext(self.dci))?;
                self.dst[..8].copy_from_slice(prefix);
                self.decode_iid(packet, false);
            }
        } else {
            match self.dam {
                0b00 => {
                    let mut addr = [0; 16];
                    packet.copy(self.len, &mut addr);
                    self.dst = addr;
                    self.len += 16;
                }
                _ => {
                    self.dst[..2].copy_from_slice(&LINK_LOCAL_PREFIX);
                    self.decode_iid(packet, false);
                }
            }
        }
        Ok(())
    }

    /// The low 64 bits of a source or destination address whose prefix was
    /// already placed, per the 2-bit mode:
    /// inline 64-bit, inline 16-bit behind the `ff:fe` pad, or fully
    /// elided and inferred from the captured link-layer address.
    fn decode_iid(&mut self, packet: &Packet, source: bool) {
        let mode = if source { self.sam } else { self.dam };
        let ll = if source {
            packet.llsender()
        } else {
            packet.llreceiver()
        };

        let mut iid = [0u8; 8];
        match mode {
            0b01 => {
                packet.copy(self.len, &mut iid);
                self.len += 8;
            }
            0b10 => {
                iid[3] = 0xff;
                iid[4] = 0xfe;
                packet.copy(self.len, &mut iid[6..8]);
                self.len += 2;
            }
            _ => {
                // Fully elided: right-align the link-layer address bytes
                // into the low-order bytes of the IID.
                let bytes = ll.as_bytes();
                iid[8 - bytes.len()..].copy_from_slice(bytes);
            }
        }

        let addr = if source { &mut self.src } else { &mut self.dst };
        addr[8..16].copy_from_slice(&iid);
    }

    /// Compressed or extension next headers, after the address fields.
    fn decode_next_header(&mut self, packet: &Packet) {
        if self.nh_compressed {
            let nhc = packet.get(self.len);
            if nhc & NHC_UDP_MASK == NHC_UDP_ID {
                self.next_header = proto::UDP;
                self.len += 1;
                self.decode_udp_ports(packet, nhc);
            }
        } else if self.next_header == proto::HBHO {
            // Skip the hop-by-hop options header; its length field is in
            // units of 8 bytes.
            self.next_header = packet.get(self.len);
            let ext_len = usize::from(packet.get(self.len + 1));
            self.len += (ext_len / 8 + 1) * 8;

            if self.next_header == proto::UDP {
                // An uncompressed UDP header follows the options.
                self.src_port = Some(packet.get_int(self.len, 2) as u16);
                self.dst_port = Some(packet.get_int(self.len + 2, 2) as u16);
                self.len += 8;
            }
        }
    }

    fn decode_udp_ports(&mut self, packet: &Packet, nhc: u8) {
        let (src_port, dst_port) = match nhc & 0x03 {
            // Both ports inline.
            0b00 => {
                let ports = (
                    packet.get_int(self.len, 2) as u16,
                    packet.get_int(self.len + 2, 2) as u16,
                );
                self.len += 4;
                ports
            }
            // Destination port in the 8-bit 0xf0XX window.
            0b01 => {
                let ports = (
                    packet.get_int(self.len, 2) as u16,
                    UDP_8BIT_PORT | u16::from(packet.get(self.len + 2)),
                );
                self.len += 3;
                ports
            }
            // Source port in the 8-bit 0xf0XX window.
            0b10 => {
                let ports = (
                    UDP_8BIT_PORT | u16::from(packet.get(self.len)),
                    packet.get_int(self.len + 1, 2) as u16,
                );
                self.len += 3;
                ports
            }
            // Both ports in the 4-bit 0xf0bX window.
            _ => {
                let nibbles = packet.get(self.len);
                self.len += 1;
                (
                    UDP_4BIT_PORT | u16::from(nibbles >> 4),
                    UDP_4BIT_PORT | u16::from(nibbles & 0x0f),
                )
            }
        };
        self.src_port = Some(src_port);
        self.dst_port = Some(dst_port);
    }
}

pub(crate) fn matches(packet: &Packet) -> bool {
    packet.level() == Level::Network && packet.get(0) & DISPATCH_IPHC_MASK == DISPATCH_IPHC
}

pub(crate) fn analyze(
    packet: &mut Packet,
    out: &mut Dissection,
    contexts: &AddressContexts,
) -> AnalyzerResult {
    let mut hdr = Iphc::default();
    let result = hdr.decode(packet, contexts);

    out.push_brief("IPHC");
    out.push_brief("IPv6");

    let mut verbose = format!(
        "<b>IPHC HC-06</b><br>\
         TF = {}, NH = {}, HLIM = {}, CID = {}",
        hdr.tf,
        if hdr.nh_compressed {
            "compressed".into()
        } else {
            format!("{}", hdr.next_header)
        },
        hdr.hop_limit,
        hdr.cid as u8,
    );
    if hdr.cid {
        verbose.push_str(&format!(" (sci = {}, dci = {})", hdr.sci, hdr.dci));
    }
    verbose.push_str(&format!(
        "<br>src = {}<br>dst = {}",
        Ipv6Addr::from(hdr.src),
        Ipv6Addr::from(hdr.dst)
    ));
    if hdr.mcast_context_unsupported {
        verbose.push_str(" (context-based multicast not supported)");
    }

    if let (Some(src_port), Some(dst_port)) = (hdr.src_port, hdr.dst_port) {
        out.push_brief(&format!("UDP {src_port} {dst_port}"));
        verbose.push_str(&format!(
            "<br>UDP src port = {src_port}, dst port = {dst_port}"
        ));
    }

    packet.consume_bytes_start(hdr.len);

    if let Err(e) = result {
        out.push_verbose(&format!("{verbose}<br>error during parsing: {e}"));
        return AnalyzerResult::Final;
    }
    out.push_verbose(&verbose);

    packet.last_dispatch = hdr.next_header;
    if matches!(hdr.next_header, proto::UDP | proto::ICMPV6 | proto::TCP) {
        packet.level = Level::Application;
    }

    AnalyzerResult::Continue
}
