//! The chain driver that feeds a captured frame through the analyzers.

use log::{debug, trace};

use crate::{AddressContexts, Analyzer, AnalyzerResult, Level, Packet, PcapExporter};

/// The accumulated result of dissecting one captured frame.
#[derive(Debug)]
pub struct Dissection {
    brief: String,
    verbose: String,
    level: Level,
    last_dispatch: u8,
}

impl Dissection {
    pub(crate) fn new() -> Self {
        Dissection {
            brief: String::new(),
            verbose: String::new(),
            level: Level::Mac,
            last_dispatch: 0,
        }
    }

    /// One-line summary, one pipe-delimited token per decoded layer.
    pub fn brief(&self) -> &str {
        &self.brief
    }

    /// Detailed multi-line description as an HTML fragment.
    pub fn verbose(&self) -> &str {
        &self.verbose
    }

    /// Decoding depth the frame reached.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Final protocol classification of the frame.
    pub fn last_dispatch(&self) -> u8 {
        self.last_dispatch
    }

    pub(crate) fn push_brief(&mut self, token: &str) {
        if !self.brief.is_empty() {
            self.brief.push('|');
        }
        self.brief.push_str(token);
    }

    pub(crate) fn push_verbose(&mut self, fragment: &str) {
        if !self.verbose.is_empty() {
            self.verbose.push_str("<br>");
        }
        self.verbose.push_str(fragment);
    }
}

/// Dissects captured frames one at a time, deepest layer first to last.
///
/// The pipeline owns the address-context table and, optionally, a PCAP
/// exporter that records every analyzed frame. One frame is decoded to
/// completion before the next is accepted; the context table is never
/// mutated while decoding.
pub struct Pipeline {
    contexts: AddressContexts,
    pcap: Option<PcapExporter>,
}

impl Pipeline {
    /// Create a pipeline decoding against the given context table.
    pub fn new(contexts: AddressContexts) -> Self {
        Self {
            contexts,
            pcap: None,
        }
    }

    /// Attach a PCAP exporter; every subsequently analyzed frame is
    /// appended to it.
    pub fn with_pcap(mut self, pcap: PcapExporter) -> Self {
        self.pcap = Some(pcap);
        self
    }

    /// Detach and return the PCAP exporter, if one was attached.
    pub fn take_pcap(&mut self) -> Option<PcapExporter> {
        self.pcap.take()
    }

    /// Run one captured frame through the analyzer chain.
    ///
    /// The loop selects the first analyzer whose predicate matches the
    /// packet's current level and dispatch, runs it, and stops on a
    /// terminal or failed result or when no analyzer matches.
    pub fn analyze(&mut self, frame: &[u8], timestamp_us: u64) -> Dissection {
        let mut packet = Packet::new(frame.to_vec(), Level::Mac, timestamp_us);
        let mut out = Dissection::new();

        loop {
            let Some(analyzer) = Analyzer::CHAIN.iter().find(|a| a.matches(&packet)) else {
                break;
            };

            trace!("running {analyzer} on {} byte(s)", packet.len());
            match analyzer.analyze(&mut packet, &mut out, &self.contexts, self.pcap.as_mut()) {
                AnalyzerResult::Continue => {}
                AnalyzerResult::Final => break,
                AnalyzerResult::Failed => {
                    debug!("{analyzer} failed, keeping partial dissection");
                    break;
                }
            }
        }

        out.level = packet.level();
        out.last_dispatch = packet.last_dispatch();
        debug!("dissected frame: {}", out.brief);

        out
    }
}
