use std::net::Ipv6Addr;

use super::*;
use crate::analyzers::iphc::Iphc;
use crate::pipeline::Dissection;

fn decode(bytes: &[u8], contexts: &AddressContexts) -> Iphc {
    let mut packet = network_packet(bytes);
    packet.llsender = Address::Short([0x00, 0x01]);
    packet.llreceiver = Address::BROADCAST;

    let mut hdr = Iphc::default();
    hdr.decode(&packet, contexts).unwrap();
    hdr
}

#[test]
fn udp_ports_in_the_4bit_window() {
    let hdr = decode(&[0x7e, 0x33, 0xf3, 0x12], &AddressContexts::default());

    assert_eq!(hdr.src_port, Some(61617));
    assert_eq!(hdr.dst_port, Some(61618));
    assert_eq!(hdr.next_header, 17);
    assert_eq!(hdr.hop_limit, 64);
    assert_eq!(hdr.len, 4);
}

#[test]
fn elided_iids_come_from_the_link_layer() {
    let hdr = decode(&[0x7e, 0x33, 0xf3, 0x12], &AddressContexts::default());

    assert_eq!(Ipv6Addr::from(hdr.src), "fe80::1".parse::<Ipv6Addr>().unwrap());
    assert_eq!(Ipv6Addr::from(hdr.dst), "fe80::ffff".parse::<Ipv6Addr>().unwrap());
}

#[test]
fn extended_link_layer_iid_fills_eight_bytes() {
    let mut packet = network_packet(&[0x7e, 0x33, 0xf3, 0x12]);
    packet.llsender = Address::Extended([0x02, 0x12, 0x74, 0x01, 0x00, 0x01, 0x01, 0x01]);
    packet.llreceiver = Address::BROADCAST;

    let mut hdr = Iphc::default();
    hdr.decode(&packet, &AddressContexts::default()).unwrap();

    assert_eq!(
        Ipv6Addr::from(hdr.src),
        "fe80::212:7401:1:101".parse::<Ipv6Addr>().unwrap()
    );
}

#[test]
fn stateful_source_uses_the_context_prefix() {
    // CID byte present, SAC=1/SAM=01 (64-bit IID inline), destination
    // elided from the link layer; hop limit code 01, next header inline.
    let hdr = decode(
        &[
            0x79, 0xd3, 0x00, 58, 0x02, 0x12, 0x74, 0x01, 0x00, 0x01, 0x01, 0x01,
        ],
        &AddressContexts::default(),
    );

    assert!(hdr.cid);
    assert_eq!((hdr.sci, hdr.dci), (0, 0));
    assert_eq!(
        Ipv6Addr::from(hdr.src),
        "aaaa::212:7401:1:101".parse::<Ipv6Addr>().unwrap()
    );
    assert_eq!(hdr.next_header, 58);
    assert_eq!(hdr.hop_limit, 1);
    assert_eq!(hdr.len, 12);
}

#[test]
fn short_form_address_sits_behind_the_fffe_pad() {
    // SAC=0/SAM=10: 16 inline bits behind the ff:fe pad in a link-local
    // address.
    let hdr = decode(&[0x7b, 0x23, 58, 0xab, 0xcd], &AddressContexts::default());

    assert_eq!(
        Ipv6Addr::from(hdr.src),
        "fe80::ff:fe00:abcd".parse::<Ipv6Addr>().unwrap()
    );
    assert_eq!(hdr.hop_limit, 255);
    assert_eq!(hdr.len, 5);
}

#[test]
fn unspecified_source() {
    // SAC=1/SAM=00 is the unspecified address; no context lookup happens.
    let hdr = decode(&[0x7b, 0x43, 58, 0x01], &AddressContexts::new());

    assert_eq!(Ipv6Addr::from(hdr.src), Ipv6Addr::UNSPECIFIED);
}

#[test]
fn traffic_class_bits_are_unshuffled() {
    // TF=00: ECN rides in front of DSCP on the wire; the uncompressed
    // traffic class has them the other way around.
    let hdr = decode(
        &[0x62, 0x33, 0x43, 0x01, 0x02, 0x03, 17],
        &AddressContexts::default(),
    );

    assert_eq!(hdr.traffic_class, (3 << 2) | 1);
    assert_eq!(hdr.flow_label, 0x10203);
    assert_eq!(hdr.next_header, 17);
    assert_eq!(hdr.len, 7);
}

#[test]
fn multicast_from_one_inline_byte() {
    let hdr = decode(&[0x7b, 0x3b, 58, 0x01], &AddressContexts::default());

    assert_eq!(
        Ipv6Addr::from(hdr.dst),
        "ff02::1".parse::<Ipv6Addr>().unwrap()
    );
    assert_eq!(hdr.len, 4);
}

#[test]
fn multicast_from_four_inline_bytes() {
    let hdr = decode(
        &[0x7b, 0x3a, 58, 0x05, 0x00, 0x01, 0x02],
        &AddressContexts::default(),
    );

    assert_eq!(
        Ipv6Addr::from(hdr.dst),
        "ff05::102".parse::<Ipv6Addr>().unwrap()
    );
    assert_eq!(hdr.len, 7);
}

#[test]
fn multicast_with_context_is_passed_through() {
    let mut packet = network_packet(&[0x7b, 0x3f, 58]);
    packet.llsender = Address::Short([0x00, 0x01]);

    let mut hdr = Iphc::default();
    hdr.decode(&packet, &AddressContexts::default()).unwrap();

    assert!(hdr.mcast_context_unsupported);
    assert_eq!(Ipv6Addr::from(hdr.dst), Ipv6Addr::UNSPECIFIED);
}

#[test]
fn hop_by_hop_header_is_skipped() {
    // Inline next header 0 (hop-by-hop), zero-length options block, then
    // an uncompressed UDP header.
    let hdr = decode(
        &[
            0x7b, 0x33, 0x00, // IPHC with inline NH = HBHO
            17, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // options
            0xf0, 0xb1, 0x16, 0x33, 0x00, 0x08, 0x00, 0x00, // UDP
        ],
        &AddressContexts::default(),
    );

    assert_eq!(hdr.next_header, 17);
    assert_eq!(hdr.src_port, Some(61617));
    assert_eq!(hdr.dst_port, Some(5683));
    assert_eq!(hdr.len, 19);
}

#[test]
fn unknown_context_annotates_instead_of_failing() {
    // SAC=1/SAM=01 against an empty table.
    let mut packet = network_packet(&[0x79, 0xd3, 0x50, 58]);
    let mut out = Dissection::new();

    let result = Analyzer::Iphc.analyze(&mut packet, &mut out, &AddressContexts::new(), None);

    assert_eq!(result, AnalyzerResult::Final);
    assert!(out
        .verbose()
        .contains("error during parsing: unknown address context 5"));
    assert!(packet.invariant_holds());
}

#[test]
fn analyze_raises_the_level_for_udp() {
    let mut packet = network_packet(&[0x7e, 0x33, 0xf3, 0x12]);
    packet.llsender = Address::Short([0x00, 0x01]);
    packet.llreceiver = Address::BROADCAST;
    let mut out = Dissection::new();

    let result = Analyzer::Iphc.analyze(&mut packet, &mut out, &AddressContexts::default(), None);

    assert_eq!(result, AnalyzerResult::Continue);
    assert_eq!(packet.level(), Level::Application);
    assert_eq!(packet.last_dispatch(), 17);
    assert_eq!(packet.cursor(), 4);
    assert_eq!(out.brief(), "IPHC|IPv6|UDP 61617 61618");
}
