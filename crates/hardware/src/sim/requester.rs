//! Blocking miss requester.
//!
//! Stands in for the cache pipeline. It replays a [`Trace`] one miss at a
//! time and blocks until each miss is satisfied:
//! 1. **Present:** The line address is driven on the miss interface and the
//!    cache-serve interface in the same cycle.
//! 2. **Served:** If the prefetch buffer answers, the access completes at once.
//! 3. **Demand fill:** Otherwise it waits for the DMA channel, issues an
//!    ordinary fill, and completes when the data returns.
//! 4. **Think:** It idles for the access's `gap` before presenting the next one.

use crate::common::{AddrMask, line_align};
use crate::sim::trace::Trace;

/// Where the requester is in the current access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Idle until the given cycle.
    Think {
        /// First cycle the next access may be presented.
        until: u64,
    },
    /// Driving the current access this cycle.
    Present,
    /// Missed the prefetch buffer; waiting for the channel to accept a demand fill.
    WaitGrant {
        /// Cycle the access missed the buffer.
        since: u64,
    },
    /// Demand fill in flight.
    WaitFill {
        /// Cycle the access missed the buffer.
        since: u64,
    },
    /// Trace exhausted.
    Done,
}

/// How a completed access was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Answered by the prefetch buffer.
    Prefetched {
        /// Line address.
        addr: u64,
    },
    /// Answered by a demand fill.
    Demand {
        /// Line address.
        addr: u64,
        /// Cycles spent between missing the buffer and receiving the data.
        waited: u64,
    },
}

/// Trace-driven blocking cache stand-in.
#[derive(Clone, Debug)]
pub struct MissRequester {
    trace: Trace,
    next: usize,
    current: u64,
    phase: Phase,
    line_bytes: u64,
    mask: AddrMask,
}

impl MissRequester {
    /// Creates a requester that starts presenting `trace` on cycle 0.
    pub fn new(trace: Trace, line_bytes: usize) -> Self {
        Self {
            trace,
            next: 0,
            current: 0,
            phase: Phase::Think { until: 0 },
            line_bytes: line_bytes as u64,
            mask: AddrMask::new(64),
        }
    }

    /// Truncates every trace address to the width selected by `mask`
    /// before it is line-aligned and presented.
    #[must_use]
    pub fn with_addr_mask(mut self, mask: AddrMask) -> Self {
        self.mask = mask;
        self
    }

    /// Returns the current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the number of completed accesses.
    pub const fn completed(&self) -> usize {
        self.next
    }

    /// Returns `true` once every access has completed.
    pub const fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Moves from thinking to presenting once the gap has elapsed.
    pub fn begin_cycle(&mut self, cycle: u64) {
        if let Phase::Think { until } = self.phase
            && cycle >= until
        {
            match self.trace.accesses.get(self.next) {
                Some(access) => {
                    self.current = line_align(self.mask.apply(access.addr), self.line_bytes);
                    self.phase = Phase::Present;
                }
                None => self.phase = Phase::Done,
            }
        }
    }

    /// Address driven on the miss and serve interfaces this cycle.
    pub const fn presented(&self) -> Option<u64> {
        match self.phase {
            Phase::Present => Some(self.current),
            _ => None,
        }
    }

    /// Address of a demand fill waiting for the channel.
    pub const fn demand(&self) -> Option<u64> {
        match self.phase {
            Phase::WaitGrant { .. } => Some(self.current),
            _ => None,
        }
    }

    /// Records the prefetch buffer's answer to this cycle's presented access.
    pub fn on_serve(&mut self, cycle: u64, served: bool) -> Option<Completion> {
        if self.phase != Phase::Present {
            return None;
        }
        if served {
            let addr = self.current;
            self.complete(cycle);
            Some(Completion::Prefetched { addr })
        } else {
            self.phase = Phase::WaitGrant { since: cycle };
            None
        }
    }

    /// Records that the channel accepted the waiting demand fill.
    pub fn on_grant(&mut self) {
        if let Phase::WaitGrant { since } = self.phase {
            self.phase = Phase::WaitFill { since };
        }
    }

    /// Consumes a DMA response if a demand fill is in flight.
    pub fn on_response(&mut self, cycle: u64, valid: bool) -> Option<Completion> {
        match self.phase {
            Phase::WaitFill { since } if valid => {
                let addr = self.current;
                self.complete(cycle);
                Some(Completion::Demand {
                    addr,
                    waited: cycle - since,
                })
            }
            _ => None,
        }
    }

    fn complete(&mut self, cycle: u64) {
        let gap = self.trace.accesses.get(self.next).map_or(0, |a| a.gap);
        self.next += 1;
        self.phase = Phase::Think {
            until: cycle + 1 + gap,
        };
    }
}
