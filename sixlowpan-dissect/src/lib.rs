//! Layered dissection of captured IEEE 802.15.4 / 6LoWPAN radio frames.
//!
//! A captured frame enters the pipeline as a raw byte buffer plus a capture
//! timestamp. The [`Pipeline`] wraps it in a [`Packet`] and repeatedly runs
//! the first [`Analyzer`] whose match predicate accepts the packet's current
//! decoding [`Level`] and dispatch byte:
//!
//! - [`Analyzer::Ieee802154`]: MAC frame control, addressing and FCS trim.
//! - [`Analyzer::Fragment`]: 6LoWPAN FRAG1/FRAGN fragmentation headers.
//! - [`Analyzer::Iphc`]: 6LoWPAN IPHC (HC-06) header decompression,
//!   including UDP next-header compression.
//! - [`Analyzer::Ipv6`]: uncompressed IPv6 headers.
//! - [`Analyzer::Icmpv6`]: ICMPv6, including the RPL control messages.
//!
//! Each analyzer consumes bytes from the packet, may raise its level, and
//! appends a short pipe-delimited token to the brief output and an HTML
//! fragment to the verbose output. The loop stops when an analyzer is
//! terminal, fails, or no analyzer matches.
//!
//! ```
//! use sixlowpan_dissect::{AddressContexts, Pipeline};
//!
//! // An immediate acknowledgment for sequence number 1.
//! let frame = [0x02, 0x00, 0x01];
//!
//! let mut pipeline = Pipeline::new(AddressContexts::default());
//! let dissection = pipeline.analyze(&frame, 0);
//!
//! assert_eq!(dissection.brief(), "15.4 A 1");
//! ```
//!
//! Stateful IPHC address modes look prefixes up in an [`AddressContexts`]
//! table supplied by the caller; the table is immutable while a frame is
//! being decoded. Raw frames can additionally be appended to a PCAP file
//! (link-type 195, IEEE 802.15.4) through a [`PcapExporter`] attached to
//! the pipeline.
//!
//! Decoding never panics on short or malformed input: all packet reads
//! saturate to zero past the effective end of the buffer, and a decode
//! error inside an analyzer is reported as an inline annotation in the
//! verbose output rather than aborting the capture session.

#![deny(missing_docs)]
#![deny(unsafe_code)]

#[cfg(test)]
mod tests;

mod addressing;
pub use addressing::Address;

mod packet;
pub use packet::{Level, Packet};

mod context;
pub use context::AddressContexts;

mod analyzers;
pub use analyzers::{Analyzer, AnalyzerResult};

mod pipeline;
pub use pipeline::{Dissection, Pipeline};

mod pcap;
pub use pcap::PcapExporter;
