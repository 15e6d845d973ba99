//! The closed set of protocol analyzers and their dispatch order.

use crate::{AddressContexts, Dissection, Packet, PcapExporter};

pub(crate) mod fragment;
pub(crate) mod icmpv6;
pub(crate) mod ieee802154;
pub(crate) mod iphc;
pub(crate) mod ipv6;

/// The outcome of one analyzer's decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerResult {
    /// Malformed or too-short input for this layer; the chain stops but
    /// text accumulated by earlier layers is preserved.
    Failed,
    /// This layer decoded successfully; run the next matching analyzer.
    Continue,
    /// This layer is deliberately terminal (ACK frames, ICMPv6 payloads).
    Final,
}

/// One layer of the dissector chain.
///
/// The chain is a closed set tried in [`Analyzer::CHAIN`] order: the first
/// variant whose [`matches`] predicate accepts the packet runs its
/// [`analyze`] step, which may consume bytes, raise the packet level and
/// append output text.
///
/// [`matches`]: Analyzer::matches
/// [`analyze`]: Analyzer::analyze
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    /// IEEE 802.15.4 MAC header.
    Ieee802154,
    /// 6LoWPAN FRAG1/FRAGN fragmentation header.
    Fragment,
    /// 6LoWPAN IPHC (HC-06) compressed IPv6 header.
    Iphc,
    /// Uncompressed IPv6 header behind the 6LoWPAN IPv6 dispatch.
    Ipv6,
    /// ICMPv6 and RPL control messages.
    Icmpv6,
}

impl Analyzer {
    /// All analyzers, in the order the pipeline tries them.
    pub const CHAIN: [Analyzer; 5] = [
        Analyzer::Ieee802154,
        Analyzer::Fragment,
        Analyzer::Iphc,
        Analyzer::Ipv6,
        Analyzer::Icmpv6,
    ];

    /// Query whether this analyzer can decode the packet's current layer.
    pub fn matches(&self, packet: &Packet) -> bool {
        match self {
            Analyzer::Ieee802154 => ieee802154::matches(packet),
            Analyzer::Fragment => fragment::matches(packet),
            Analyzer::Iphc => iphc::matches(packet),
            Analyzer::Ipv6 => ipv6::matches(packet),
            Analyzer::Icmpv6 => icmpv6::matches(packet),
        }
    }

    /// Decode one layer, consuming bytes from the packet and appending
    /// brief and verbose output.
    pub fn analyze(
        &self,
        packet: &mut Packet,
        out: &mut Dissection,
        contexts: &AddressContexts,
        pcap: Option<&mut PcapExporter>,
    ) -> AnalyzerResult {
        match self {
            Analyzer::Ieee802154 => ieee802154::analyze(packet, out, pcap),
            Analyzer::Fragment => fragment::analyze(packet, out),
            Analyzer::Iphc => iphc::analyze(packet, out, contexts),
            Analyzer::Ipv6 => ipv6::analyze(packet, out),
            Analyzer::Icmpv6 => icmpv6::analyze(packet, out),
        }
    }
}

impl core::fmt::Display for Analyzer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Analyzer::Ieee802154 => write!(f, "IEEE 802.15.4"),
            Analyzer::Fragment => write!(f, "6LoWPAN fragmentation"),
            Analyzer::Iphc => write!(f, "6LoWPAN IPHC"),
            Analyzer::Ipv6 => write!(f, "IPv6"),
            Analyzer::Icmpv6 => write!(f, "ICMPv6"),
        }
    }
}

/// Transport protocol numbers used for dispatch between layers.
pub(crate) mod proto {
    pub const HBHO: u8 = 0;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const ICMPV6: u8 = 58;
}
