//! Stream Table.
//!
//! A fixed-capacity, array-backed set of candidate and confirmed streams.
//! Slots are addressed by index; the same index selects the stream's line in
//! the prefetch buffer, so a stream's identity and its speculative line move
//! together.
//!
//! Entries are created on the first unmatched miss that finds a free slot and
//! are never evicted. Once every slot is valid, misses that continue no
//! existing stream are simply not tracked until the table is reset.

use super::stride;
use crate::config::{PrefetcherConfig, StrideBase};

/// One candidate or confirmed stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamEntry {
    /// Address of the miss that opened the stream.
    pub start_address: u64,
    /// Address of the most recent miss that continued the stream.
    pub last_address: u64,
    /// Misses seen so far, saturating at the confirmation count.
    pub miss_count: u8,
    /// Detected stride; meaningful only once confirmed.
    pub stride: u64,
    /// Whether this slot holds a stream.
    pub valid: bool,
}

impl StreamEntry {
    /// Returns `true` once the entry has seen `confirm_count` misses.
    #[inline]
    pub const fn is_confirmed(&self, confirm_count: u8) -> bool {
        self.valid && self.miss_count >= confirm_count
    }
}

/// Fixed-capacity stream table.
#[derive(Clone, Debug)]
pub struct StreamTable {
    entries: Vec<StreamEntry>,
    threshold: u64,
    confirm_count: u8,
    stride_base: StrideBase,
}

impl StreamTable {
    /// Creates an empty table sized and tuned by `config`.
    ///
    /// `config` is assumed validated; see [`PrefetcherConfig::validate`].
    pub fn new(config: &PrefetcherConfig) -> Self {
        Self {
            entries: vec![StreamEntry::default(); config.table_size],
            threshold: config.threshold,
            confirm_count: config.confirm_count,
            stride_base: config.stride_base,
        }
    }

    /// Returns the table capacity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no slots.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all slots in index order.
    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    /// Returns the slot at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&StreamEntry> {
        self.entries.get(index)
    }

    /// Returns the number of valid slots.
    pub fn occupied(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// Returns `true` when every slot holds a stream.
    pub fn is_full(&self) -> bool {
        self.entries.iter().all(|e| e.valid)
    }

    /// Locates the stream `addr` continues, or a free slot for a new one.
    ///
    /// Does not modify the table; the caller commits the choice with
    /// [`record_hit`](Self::record_hit) or [`record_create`](Self::record_create).
    ///
    /// # Returns
    ///
    /// * `Some((index, false))` - `addr` continues the stream at `index`.
    /// * `Some((index, true))` - no match; `index` is the first free slot.
    /// * `None` - no match and the table is full; the miss is not tracked.
    pub fn find_or_allocate(&self, addr: u64) -> Option<(usize, bool)> {
        if let Some(index) = stride::detect(&self.entries, addr, self.threshold) {
            return Some((index, false));
        }
        self.entries
            .iter()
            .position(|e| !e.valid)
            .map(|index| (index, true))
    }

    /// Computes the entry `index` would hold after a continuing miss at `addr`.
    ///
    /// # Returns
    ///
    /// The updated entry, or `None` if `index` is out of range.
    pub fn preview_hit(&self, index: usize, addr: u64) -> Option<StreamEntry> {
        let entry = self.entries.get(index)?;
        let mut next = *entry;
        next.last_address = addr;
        next.miss_count = entry
            .miss_count
            .saturating_add(1)
            .min(self.confirm_count);
        if next.miss_count >= self.confirm_count {
            let base = match self.stride_base {
                StrideBase::Previous => entry.last_address,
                StrideBase::Origin => entry.start_address,
            };
            next.stride = addr.wrapping_sub(base);
        }
        Some(next)
    }

    /// Records a continuing miss at `addr` on the stream at `index`.
    ///
    /// # Returns
    ///
    /// `true` if the stream is confirmed after this miss and ready to prefetch.
    pub fn record_hit(&mut self, index: usize, addr: u64) -> bool {
        match self.preview_hit(index, addr) {
            Some(next) => {
                self.entries[index] = next;
                next.is_confirmed(self.confirm_count)
            }
            None => false,
        }
    }

    /// Opens a new stream at `index` with its first miss at `addr`.
    pub fn record_create(&mut self, index: usize, addr: u64) {
        if let Some(entry) = self.entries.get_mut(index) {
            *entry = StreamEntry {
                start_address: addr,
                last_address: addr,
                miss_count: 1,
                stride: 0,
                valid: true,
            };
        }
    }

    /// Invalidates and zeroes every slot.
    pub fn reset(&mut self) {
        self.entries.fill(StreamEntry::default());
    }
}
