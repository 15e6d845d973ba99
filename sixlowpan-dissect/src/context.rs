//! Address-compression contexts for stateful IPHC decoding.

/// A table of 64-bit IPv6 prefixes indexed by the 4-bit context
/// identifiers carried in the IPHC CID extension byte.
///
/// The table is configured before decoding starts and is read-only while
/// frames flow through the pipeline. It is passed explicitly into the
/// decode entry point; there is no global state.
#[derive(Debug, Clone)]
pub struct AddressContexts {
    prefixes: [Option<[u8; 8]>; 16],
}

impl AddressContexts {
    /// Create an empty context table.
    pub fn new() -> Self {
        Self {
            prefixes: [None; 16],
        }
    }

    /// Install an 8-byte prefix at `index` (0..16).
    pub fn set(&mut self, index: u8, prefix: [u8; 8]) {
        if let Some(slot) = self.prefixes.get_mut(usize::from(index)) {
            *slot = Some(prefix);
        }
    }

    /// Look up the prefix at `index`, if one is configured.
    pub fn prefix(&self, index: u8) -> Option<&[u8; 8]> {
        self.prefixes.get(usize::from(index))?.as_ref()
    }
}

impl Default for AddressContexts {
    /// A table with the conventional 6LoWPAN context 0, `aaaa::/64`.
    fn default() -> Self {
        let mut contexts = Self::new();
        contexts.set(0, [0xaa, 0xaa, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        contexts
    }
}
