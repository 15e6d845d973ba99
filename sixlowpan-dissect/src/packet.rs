//! The shared packet state threaded through the analyzer chain.

use crate::Address;

/// How deep a captured frame has been decoded so far.
///
/// The level only ever increases while a frame flows through the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Raw radio bytes, nothing decoded yet.
    Radio,
    /// The MAC header is next.
    Mac,
    /// The MAC header has been consumed; an adaptation or network header
    /// is next.
    Network,
    /// The network header has been consumed; a transport or control
    /// payload is next.
    Application,
}

/// A cursor-addressed view over one captured frame.
///
/// The buffer is owned once and never copied between layers: analyzers
/// consume bytes from the front by advancing the read cursor and from the
/// back by shrinking the effective size (used to drop the trailing FCS).
///
/// All index accessors are relative to the cursor and total: reading past
/// the effective end returns `0` instead of panicking, so analyzers degrade
/// gracefully on short or truncated frames.
#[derive(Debug)]
pub struct Packet {
    data: Vec<u8>,
    pos: usize,
    size: usize,
    /// Decoding depth, non-decreasing over a chain run.
    pub(crate) level: Level,
    /// Protocol number decided by the most recently completed layer.
    pub(crate) last_dispatch: u8,
    /// Link-layer sender, captured by the MAC layer.
    pub(crate) llsender: Address,
    /// Link-layer receiver, captured by the MAC layer.
    pub(crate) llreceiver: Address,
    timestamp_us: u64,
}

impl Packet {
    /// Create a new [`Packet`] over a captured byte buffer.
    pub fn new(data: Vec<u8>, level: Level, timestamp_us: u64) -> Self {
        let size = data.len();
        Self {
            data,
            pos: 0,
            size,
            level,
            last_dispatch: 0,
            llsender: Address::Absent,
            llreceiver: Address::Absent,
            timestamp_us,
        }
    }

    /// Read the byte at `index`, relative to the cursor.
    ///
    /// Returns `0` for any index at or past the effective end.
    pub fn get(&self, index: usize) -> u8 {
        match self.pos.checked_add(index) {
            Some(i) if i < self.size => self.data[i],
            _ => 0,
        }
    }

    /// Read a big-endian integer of `width` bytes at `index`, relative to
    /// the cursor.
    pub fn get_int(&self, index: usize, width: usize) -> u32 {
        let mut value = 0u32;
        for i in 0..width.min(4) {
            value = (value << 8) | u32::from(self.get(index + i));
        }
        value
    }

    /// Fill `dst` with bytes starting at `index`, relative to the cursor.
    ///
    /// Bytes past the effective end read as `0`.
    pub fn copy(&self, index: usize, dst: &mut [u8]) {
        for (i, b) in dst.iter_mut().enumerate() {
            *b = self.get(index + i);
        }
    }

    /// Consume `n` bytes from the front by advancing the cursor.
    ///
    /// Saturates at the effective end.
    pub fn consume_bytes_start(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n).min(self.size);
    }

    /// Consume `n` bytes from the back by shrinking the effective size.
    ///
    /// Saturates at the cursor.
    pub fn consume_bytes_end(&mut self, n: usize) {
        self.size = self.size.saturating_sub(n).max(self.pos);
    }

    /// Remaining length between the cursor and the effective end.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.size - self.pos
    }

    /// Query whether any bytes remain to be decoded.
    pub fn has_more_data(&self) -> bool {
        self.pos < self.size
    }

    /// The window between the cursor and the effective end.
    pub fn payload(&self) -> &[u8] {
        &self.data[self.pos..self.size]
    }

    /// The original captured bytes, regardless of what has been consumed.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Decoding depth reached so far.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Protocol number decided by the most recently completed layer.
    pub fn last_dispatch(&self) -> u8 {
        self.last_dispatch
    }

    /// Link-layer sender, as captured by the MAC layer.
    pub fn llsender(&self) -> Address {
        self.llsender
    }

    /// Link-layer receiver, as captured by the MAC layer.
    pub fn llreceiver(&self) -> Address {
        self.llreceiver
    }

    /// Capture time in microseconds; opaque to decoding.
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_us
    }

    #[cfg(test)]
    pub(crate) fn cursor(&self) -> usize {
        self.pos
    }

    #[cfg(test)]
    pub(crate) fn invariant_holds(&self) -> bool {
        self.pos <= self.size && self.size <= self.data.len()
    }
}
