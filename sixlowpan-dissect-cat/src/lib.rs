use colored::*;
use sixlowpan_dissect::{AddressContexts, Dissection, PcapExporter, Pipeline};

/// Runs captured frames through the dissector pipeline and renders the
/// result for a terminal.
pub struct Dissector {
    pipeline: Pipeline,
}

impl Dissector {
    /// A dissector with the default address-context table.
    pub fn new() -> Self {
        Self::with_contexts(AddressContexts::default())
    }

    /// A dissector decoding against the given context table.
    pub fn with_contexts(contexts: AddressContexts) -> Self {
        Self {
            pipeline: Pipeline::new(contexts),
        }
    }

    /// Additionally append every dissected frame to a PCAP exporter.
    pub fn with_pcap(mut self, pcap: PcapExporter) -> Self {
        self.pipeline = self.pipeline.with_pcap(pcap);
        self
    }

    /// Dissect a hex-encoded frame captured at time zero.
    pub fn dissect_hex(&mut self, input: &str) -> Result<String, hex::FromHexError> {
        let data = hex::decode(input)?;
        Ok(self.dissect(&data, 0))
    }

    /// Dissect one frame and render the brief line plus the detailed
    /// breakdown.
    pub fn dissect(&mut self, frame: &[u8], timestamp_us: u64) -> String {
        render(&self.pipeline.analyze(frame, timestamp_us))
    }
}

impl Default for Dissector {
    fn default() -> Self {
        Self::new()
    }
}

/// Map the verbose HTML fragment onto indented terminal lines: `<b>`
/// section headings unindented, everything else two spaces deep.
fn render(dissection: &Dissection) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", dissection.brief().bold()));

    for fragment in dissection.verbose().split("<br>") {
        if fragment.is_empty() {
            continue;
        }
        if let Some(heading) = fragment
            .strip_prefix("<b>")
            .and_then(|f| f.strip_suffix("</b>"))
        {
            out.push_str(&format!("{}\n", heading.underline()));
        } else {
            out.push_str(&format!("  {fragment}\n"));
        }
    }

    out
}
