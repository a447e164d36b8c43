//! Backing store behind the DMA channel.
//!
//! Line contents are generated from the line address, so every line has a
//! distinct, reproducible payload without allocating the whole address
//! space. Individual lines can be overwritten; those take precedence over the
//! generated pattern. The simulator compares every line the prefetcher serves
//! against this store.

/// Latency models for the DMA channel.
pub mod controller;

use std::collections::HashMap;

/// Line-granular backing memory.
#[derive(Clone, Debug)]
pub struct LineMemory {
    line_bytes: usize,
    written: HashMap<u64, Vec<u8>>,
}

impl LineMemory {
    /// Creates a memory serving lines of `line_bytes` bytes.
    pub fn new(line_bytes: usize) -> Self {
        Self {
            line_bytes,
            written: HashMap::new(),
        }
    }

    /// Returns the line width in bytes.
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Reads the line at `addr`.
    pub fn read_line(&self, addr: u64) -> Vec<u8> {
        self.written
            .get(&addr)
            .cloned()
            .unwrap_or_else(|| Self::pattern(addr, self.line_bytes))
    }

    /// Overwrites the line at `addr`; the payload is padded or truncated to the line width.
    pub fn write_line(&mut self, addr: u64, mut data: Vec<u8>) {
        data.resize(self.line_bytes, 0);
        let _ = self.written.insert(addr, data);
    }

    /// Generated contents of an unwritten line.
    fn pattern(addr: u64, line_bytes: usize) -> Vec<u8> {
        let seed = addr.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        (0..line_bytes)
            .map(|i| ((seed >> ((i % 8) * 8)) as u8) ^ (i as u8))
            .collect()
    }
}
