//! Single-channel DMA engine.
//!
//! Executes one line fetch at a time. The channel is busy from the cycle a
//! request is accepted until the cycle its data is returned; the response
//! carries only data, so whoever issued the request must remember what it
//! asked for. Latency comes from a pluggable [`MemoryController`].

use std::fmt;

use tracing::trace;

use crate::common::constants::MIN_DMA_LATENCY;
use crate::common::error::DmaError;
use crate::config::DmaConfig;
use crate::core::signals::DmaResponse;
use crate::soc::memory::LineMemory;
use crate::soc::memory::controller::{self, MemoryController};

/// A transfer occupying the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Line address being fetched.
    pub addr: u64,
    /// Cycle on which the response is presented.
    pub done_at: u64,
}

/// DMA engine model.
pub struct DmaEngine {
    timing: Box<dyn MemoryController>,
    memory: LineMemory,
    in_flight: Option<Transfer>,
}

impl fmt::Debug for DmaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DmaEngine")
            .field("memory", &self.memory)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl DmaEngine {
    /// Creates an idle engine over `memory` with the given latency model.
    pub fn new(timing: Box<dyn MemoryController>, memory: LineMemory) -> Self {
        Self {
            timing,
            memory,
            in_flight: None,
        }
    }

    /// Creates an idle engine using the latency model selected by `config`.
    pub fn from_config(config: &DmaConfig, memory: LineMemory) -> Self {
        Self::new(controller::from_config(config), memory)
    }

    /// Returns `true` while a transfer is in flight.
    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns the transfer occupying the channel, if any.
    pub const fn in_flight(&self) -> Option<Transfer> {
        self.in_flight
    }

    /// Returns the backing memory.
    pub const fn memory(&self) -> &LineMemory {
        &self.memory
    }

    /// Returns the backing memory for modification.
    pub const fn memory_mut(&mut self) -> &mut LineMemory {
        &mut self.memory
    }

    /// Samples the response wires for `cycle`.
    ///
    /// When the in-flight transfer completes on or before `cycle`, its data is
    /// returned and the channel becomes free in the same cycle.
    pub fn poll(&mut self, cycle: u64) -> DmaResponse {
        match self.in_flight {
            Some(t) if t.done_at <= cycle => {
                self.in_flight = None;
                trace!(cycle, "DMA transfer of {:#x} complete", t.addr);
                DmaResponse::with_data(self.memory.read_line(t.addr))
            }
            _ => DmaResponse::default(),
        }
    }

    /// Accepts a fetch of `addr` in `cycle`.
    ///
    /// # Returns
    ///
    /// The cycle on which the response will be presented.
    ///
    /// # Errors
    ///
    /// [`DmaError::Busy`] if a transfer is already in flight.
    pub fn accept(&mut self, cycle: u64, addr: u64) -> Result<u64, DmaError> {
        if let Some(t) = self.in_flight {
            return Err(DmaError::Busy {
                addr,
                in_flight: t.addr,
            });
        }
        let latency = self.timing.access_latency(addr).max(MIN_DMA_LATENCY);
        let done_at = cycle + latency;
        self.in_flight = Some(Transfer { addr, done_at });
        trace!(cycle, latency, "DMA transfer of {addr:#x} accepted");
        Ok(done_at)
    }
}
