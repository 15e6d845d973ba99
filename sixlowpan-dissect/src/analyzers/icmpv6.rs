//! ICMPv6, including the RPL control messages carried in type 155.
//!
//! This is a terminal layer: embedded packets in error messages are not
//! dissected further.

use super::proto;
use crate::{AnalyzerResult, Dissection, Level, Packet};

const TYPE_RPL: u8 = 155;

const RPL_DIS: u8 = 0x00;
const RPL_DIO: u8 = 0x01;
const RPL_DAO: u8 = 0x02;
const RPL_DAO_ACK: u8 = 0x03;

/// Names for the fixed informational/discovery type range 128..=136.
const TYPE_NAMES: [&str; 9] = [
    "echo request",
    "echo reply",
    "group query",
    "group report",
    "group reduction",
    "router solicitation",
    "router advertisement",
    "neighbor solicitation",
    "neighbor advertisement",
];

/// A decoded ICMPv6 header, with the RPL DIO base fields when present.
#[derive(Debug)]
pub(crate) struct Icmpv6Header {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    pub dio: Option<Dio>,
    pub len: usize,
}

/// The DIO base object, at fixed offsets behind the ICMP header.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Dio {
    pub instance_id: u8,
    pub version: u8,
    pub rank: u16,
    pub mop: u8,
    pub dtsn: u8,
}

impl Icmpv6Header {
    /// Parse the ICMPv6 header at the packet cursor.
    pub(crate) fn parse(packet: &Packet) -> Self {
        let icmp_type = packet.get(0);
        let code = packet.get(1);

        let dio = (icmp_type == TYPE_RPL && code == RPL_DIO).then(|| Dio {
            instance_id: packet.get(4),
            version: packet.get(5),
            rank: packet.get_int(6, 2) as u16,
            mop: (packet.get(8) >> 3) & 0x07,
            dtsn: packet.get(9),
        });

        Icmpv6Header {
            icmp_type,
            code,
            checksum: packet.get_int(2, 2) as u16,
            len: if dio.is_some() { 10 } else { 4 },
            dio,
        }
    }

    pub(crate) fn name(&self) -> String {
        match self.icmp_type {
            128..=136 => TYPE_NAMES[usize::from(self.icmp_type - 128)].into(),
            TYPE_RPL => match self.code {
                RPL_DIS => "RPL DIS".into(),
                RPL_DIO => "RPL DIO".into(),
                RPL_DAO => "RPL DAO".into(),
                RPL_DAO_ACK => "RPL DAO ACK".into(),
                code => format!("RPL code {code}"),
            },
            icmp_type => format!("type {icmp_type}"),
        }
    }
}

pub(crate) fn matches(packet: &Packet) -> bool {
    packet.level() == Level::Application && packet.last_dispatch() == proto::ICMPV6
}

pub(crate) fn analyze(packet: &mut Packet, out: &mut Dissection) -> AnalyzerResult {
    let hdr = Icmpv6Header::parse(packet);

    let name = hdr.name();
    if hdr.icmp_type == TYPE_RPL {
        out.push_brief(&name);
    } else {
        out.push_brief(&format!("ICMPv6 {name}"));
    }

    let mut verbose = format!(
        "<b>ICMPv6 {}</b><br>type = {}, code = {}, checksum = 0x{:04x}",
        name, hdr.icmp_type, hdr.code, hdr.checksum
    );
    if let Some(dio) = &hdr.dio {
        verbose.push_str(&format!(
            "<br>instance = {}, version = {}, rank = {}, MOP = {}, DTSN = {}",
            dio.instance_id, dio.version, dio.rank, dio.mop, dio.dtsn
        ));
    }
    out.push_verbose(&verbose);

    packet.consume_bytes_start(hdr.len);

    AnalyzerResult::Final
}
