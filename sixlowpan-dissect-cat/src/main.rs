use std::path::PathBuf;

use clap::Parser;
use sixlowpan_dissect::PcapExporter;
use sixlowpan_dissect_cat::Dissector;

/// `cat` for captured IEEE 802.15.4 / 6LoWPAN frames.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The captured frame to dissect, hex encoded.
    #[clap(value_parser(clap::builder::NonEmptyStringValueParser::new()))]
    input: String,

    /// Capture timestamp in microseconds.
    #[clap(long, default_value_t = 0)]
    timestamp: u64,

    /// Also append the raw frame to this PCAP file.
    #[clap(long)]
    pcap: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let data = hex::decode(args.input).unwrap();

    let mut dissector = Dissector::new();
    if let Some(path) = args.pcap.as_deref() {
        let mut exporter = PcapExporter::new();
        exporter.open(Some(path)).unwrap();
        dissector = dissector.with_pcap(exporter);
    }

    print!("{}", dissector.dissect(&data, args.timestamp));
}
