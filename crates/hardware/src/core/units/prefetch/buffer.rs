//! Prefetch Buffer.
//!
//! Holds at most one speculatively fetched line per stream-table slot. A line
//! is written when the DMA response for its stream's request returns, and is
//! consumed exactly once: the first cache-serve probe that matches its
//! address receives the data and the slot is invalidated. A later fill for
//! the same slot overwrites whatever is there, consumed or not.
//!
//! Matching is by exact line address; there is no partial-line or sub-block
//! matching.

/// One speculative line slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefetchSlot {
    /// Line address the data was fetched from.
    pub address: u64,
    /// Line payload, exactly one line wide.
    pub data: Vec<u8>,
    /// Whether the slot holds an unconsumed line.
    pub valid: bool,
}

/// Fixed-capacity buffer indexed by stream-table slot.
#[derive(Clone, Debug)]
pub struct PrefetchBuffer {
    slots: Vec<PrefetchSlot>,
    line_bytes: usize,
}

impl PrefetchBuffer {
    /// Creates an empty buffer with `capacity` slots of `line_bytes` each.
    pub fn new(capacity: usize, line_bytes: usize) -> Self {
        let empty = PrefetchSlot {
            address: 0,
            data: vec![0; line_bytes],
            valid: false,
        };
        Self {
            slots: vec![empty; capacity],
            line_bytes,
        }
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the buffer has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the line width in bytes.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Returns the slot at `index`, if in range.
    pub fn slot(&self, index: usize) -> Option<&PrefetchSlot> {
        self.slots.get(index)
    }

    /// Returns all slots in index order.
    pub fn slots(&self) -> &[PrefetchSlot] {
        &self.slots
    }

    /// Returns the number of slots holding an unconsumed line.
    pub fn ready(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }

    /// Finds the valid slot holding `addr` without consuming it.
    ///
    /// # Returns
    ///
    /// The lowest matching slot index, or `None`.
    pub fn probe(&self, addr: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.valid && s.address == addr)
    }

    /// Serves `addr` from the buffer, consuming the slot on a hit.
    ///
    /// Immediate form of what `Controller::tick` does across a cycle: it
    /// finds the slot while evaluating and applies
    /// [`invalidate`](Self::invalidate) at commit, so a same-cycle fill of
    /// that slot is ordered after the consume.
    ///
    /// # Returns
    ///
    /// The line data on a hit; `None` sends the request down the ordinary miss path.
    pub fn try_serve(&mut self, addr: u64) -> Option<Vec<u8>> {
        let index = self.probe(addr)?;
        let slot = &mut self.slots[index];
        slot.valid = false;
        Some(slot.data.clone())
    }

    /// Invalidates the slot at `index`.
    pub fn invalidate(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.valid = false;
        }
    }

    /// Writes a freshly fetched line into the slot at `index`.
    ///
    /// The payload is truncated or zero-padded to the line width.
    ///
    /// # Returns
    ///
    /// The address of an unconsumed line that was overwritten, if any.
    pub fn fill(&mut self, index: usize, addr: u64, mut data: Vec<u8>) -> Option<u64> {
        let slot = self.slots.get_mut(index)?;
        let overwritten = slot.valid.then_some(slot.address);
        data.resize(self.line_bytes, 0);
        *slot = PrefetchSlot {
            address: addr,
            data,
            valid: true,
        };
        overwritten
    }

    /// Invalidates and zeroes every slot.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.address = 0;
            slot.data.fill(0);
            slot.valid = false;
        }
    }
}
