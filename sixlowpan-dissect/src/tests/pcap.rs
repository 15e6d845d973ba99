use super::*;

const GLOBAL_HEADER: [u8; 24] = [
    0xa1, 0xb2, 0xc3, 0xd4, // magic
    0x00, 0x02, 0x00, 0x04, // version 2.4
    0x00, 0x00, 0x00, 0x00, // thiszone
    0x00, 0x00, 0x00, 0x00, // sigfigs
    0x00, 0x00, 0x10, 0x00, // snaplen 4096
    0x00, 0x00, 0x00, 0xc3, // link-type 195, IEEE 802.15.4
];

#[test]
fn global_header_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radiolog.pcap");

    let mut exporter = PcapExporter::new();
    exporter.open(Some(&path)).unwrap();
    exporter.close().unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), GLOBAL_HEADER);
}

#[test]
fn record_header_and_payload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radiolog.pcap");

    let frame = [0x41, 0x88, 0x2a, 0xcd, 0xab];
    let mut exporter = PcapExporter::new();
    exporter.open(Some(&path)).unwrap();
    exporter.export(&frame, 3_000_042).unwrap();
    exporter.close().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let record = &bytes[GLOBAL_HEADER.len()..];

    assert_eq!(&record[0..4], &[0, 0, 0, 3]); // ts_sec
    assert_eq!(&record[4..8], &[0, 0, 0, 42]); // ts_usec
    assert_eq!(&record[8..12], &[0, 0, 0, 5]); // caplen
    assert_eq!(&record[12..16], &[0, 0, 0, 5]); // origlen
    assert_eq!(&record[16..], &frame);
}

#[test]
fn records_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("radiolog.pcap");

    let mut exporter = PcapExporter::new();
    exporter.open(Some(&path)).unwrap();
    exporter.export(&[0x02, 0x00, 0x01], 0).unwrap();
    exporter.export(&[0x02, 0x00, 0x02], 1).unwrap();
    exporter.close().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 24 + 2 * (16 + 3));
}
