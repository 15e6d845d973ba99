use super::*;
use crate::analyzers::ieee802154::{crc16, MacHeader};
use crate::pipeline::Dissection;

#[test]
fn crc16_check_value() {
    assert_eq!(crc16(b"123456789"), 0x2189);
}

#[test]
fn intra_pan_short_addressing() {
    // Data frame, intra-PAN, short destination and source: one shared
    // PAN ID plus two 16-bit addresses, 6 bytes after the FCF and
    // sequence number.
    let frame = with_fcs(vec![
        0x41, 0x88, 0x2a, 0xcd, 0xab, 0xff, 0xff, 0x01, 0x00,
    ]);
    let packet = Packet::new(frame, Level::Mac, 0);

    let hdr = MacHeader::parse(&packet);

    assert_eq!(hdr.len, 9);
    assert!(hdr.intra_pan);
    assert_eq!(hdr.seq_no, 0x2a);
    assert_eq!(hdr.dst_pan, 0xabcd);
    assert_eq!(hdr.src_pan, 0xabcd);
    assert_eq!(hdr.dst, Address::BROADCAST);
    assert_eq!(hdr.src, Address::Short([0x00, 0x01]));
}

#[test]
fn extended_address_is_byte_reversed() {
    // Destination-only frame with an extended address in wire order.
    let frame = with_fcs(vec![
        0x01, 0x0c, 0x07, 0xcd, 0xab, 0xc7, 0xd9, 0xb5, 0x14, 0x00, 0x4b, 0x12, 0x00,
    ]);
    let packet = Packet::new(frame, Level::Mac, 0);

    let hdr = MacHeader::parse(&packet);

    assert_eq!(hdr.len, 13);
    assert_eq!(
        hdr.dst,
        Address::Extended([0x00, 0x12, 0x4b, 0x00, 0x14, 0xb5, 0xd9, 0xc7])
    );
    assert_eq!(hdr.src, Address::Absent);
}

#[test]
fn data_frame_advances_to_network() {
    let frame = with_fcs(vec![
        0x41, 0x88, 0x2a, 0xcd, 0xab, 0xff, 0xff, 0x01, 0x00, 0x60, 0x00,
    ]);
    let mut packet = Packet::new(frame, Level::Mac, 0);
    let mut out = Dissection::new();

    let result = Analyzer::Ieee802154.analyze(&mut packet, &mut out, &AddressContexts::default(), None);

    assert_eq!(result, AnalyzerResult::Continue);
    assert_eq!(packet.level(), Level::Network);
    assert_eq!(packet.cursor(), 9);
    // The two FCS bytes are trimmed from the tail.
    assert_eq!(packet.len(), 2);
    assert_eq!(packet.llsender(), Address::Short([0x00, 0x01]));
    assert_eq!(packet.llreceiver(), Address::BROADCAST);
    assert_eq!(out.brief(), "15.4 D 0xffff");
    assert!(packet.invariant_holds());
}

#[test]
fn ack_frame_is_terminal() {
    let mut packet = Packet::new(vec![0x02, 0x00, 0x01], Level::Mac, 0);
    let mut out = Dissection::new();

    let result = Analyzer::Ieee802154.analyze(&mut packet, &mut out, &AddressContexts::default(), None);

    assert_eq!(result, AnalyzerResult::Final);
    assert_eq!(packet.level(), Level::Mac);
    assert_eq!(out.brief(), "15.4 A 1");
    assert!(out.verbose().contains("Ack #1"));
}

#[test]
fn mac_always_matches_first() {
    let packet = Packet::new(vec![0x41, 0x88], Level::Mac, 0);
    assert!(Analyzer::Ieee802154.matches(&packet));

    let packet = network_packet(&[0x41]);
    assert!(!Analyzer::Ieee802154.matches(&packet));
}
