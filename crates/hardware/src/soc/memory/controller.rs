//! DMA latency models.
//!
//! This module provides:
//! 1. **SimpleController:** Fixed latency per transfer (no row-buffer modeling).
//! 2. **DramController:** Row-buffer-aware latency (CAS, RAS, precharge) for DRAM-style timing.
//!
//! The DMA engine asks its controller how long each line transfer takes; the
//! prefetcher never sees these numbers, only the busy flag they produce.

use crate::config::{DmaConfig, DmaController};

/// Trait for latency models that report transfer time in cycles.
///
/// Implementors must be `Send + Sync` so a configured engine can be moved across threads.
pub trait MemoryController: Send + Sync {
    /// Returns the number of cycles required for a transfer from the given address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Line address being fetched (may be used for row-buffer modeling).
    ///
    /// # Returns
    ///
    /// Latency in simulation cycles.
    fn access_latency(&mut self, addr: u64) -> u64;
}

/// Builds the latency model selected by `config`.
pub fn from_config(config: &DmaConfig) -> Box<dyn MemoryController> {
    match config.controller {
        DmaController::Simple => Box::new(SimpleController::new(config.latency)),
        DmaController::Dram => Box::new(DramController::new(
            config.t_cas,
            config.t_ras,
            config.t_pre,
        )),
    }
}

/// Fixed-latency controller; every transfer takes the same number of cycles.
#[derive(Clone, Copy, Debug)]
pub struct SimpleController {
    latency: u64,
}

impl SimpleController {
    /// Creates a simple controller with the given fixed latency in cycles.
    pub const fn new(latency: u64) -> Self {
        Self { latency }
    }
}

impl MemoryController for SimpleController {
    fn access_latency(&mut self, _addr: u64) -> u64 {
        self.latency
    }
}

/// DRAM-style controller with row buffer; models CAS, RAS, and precharge latencies.
#[derive(Clone, Copy, Debug)]
pub struct DramController {
    last_row: Option<u64>,
    t_cas: u64,
    t_ras: u64,
    t_pre: u64,
    row_mask: u64,
}

impl DramController {
    /// Creates a DRAM controller with the given timing parameters (in cycles).
    ///
    /// # Arguments
    ///
    /// * `t_cas` - Column access strobe latency.
    /// * `t_ras` - Row access strobe latency.
    /// * `t_pre` - Precharge latency.
    ///
    /// # Returns
    ///
    /// A new `DramController` with no row currently open and 2 KiB rows.
    pub const fn new(t_cas: u64, t_ras: u64, t_pre: u64) -> Self {
        Self {
            last_row: None,
            t_cas,
            t_ras,
            t_pre,
            row_mask: !2047,
        }
    }
}

impl MemoryController for DramController {
    fn access_latency(&mut self, addr: u64) -> u64 {
        let row = addr & self.row_mask;
        match self.last_row {
            Some(open_row) if open_row == row => self.t_cas,
            Some(_) => {
                self.last_row = Some(row);
                self.t_pre + self.t_ras + self.t_cas
            }
            None => {
                self.last_row = Some(row);
                self.t_ras + self.t_cas
            }
        }
    }
}
