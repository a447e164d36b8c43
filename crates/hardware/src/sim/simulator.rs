//! Simulator: the prefetch controller wired to its collaborator models.
//!
//! Owns the controller, the DMA engine and the miss requester side by side
//! and clocks them in a fixed order every cycle:
//! 1. **Response:** The DMA engine presents any transfer completing this cycle;
//!    a waiting demand fill consumes it.
//! 2. **Arbitrate:** The prefetcher sees the channel busy if a transfer is in
//!    flight or a demand fill is waiting for a grant.
//! 3. **Controller:** The presented miss drives both the miss and serve interfaces.
//! 4. **Deliver:** Served lines are checked against memory and complete the access.
//! 5. **Grant:** The channel accepts the waiting demand fill, else the prefetch.
//!    A refused prefetch is reported before anything is handed to the channel.

use tracing::debug;

use crate::common::error::SimError;
use crate::config::Config;
use crate::core::signals::{CycleInputs, MissEvent, ServeRequest};
use crate::core::Controller;
use crate::sim::requester::{Completion, MissRequester};
use crate::sim::trace::Trace;
use crate::soc::arbiter::{self, Grant};
use crate::soc::{DmaEngine, LineMemory};
use crate::stats::SimStats;

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    /// Prefetch controller under test.
    pub controller: Controller,
    /// Shared DMA channel.
    pub dma: DmaEngine,
    /// Blocking cache stand-in.
    pub requester: MissRequester,
    cycle: u64,
    max_cycles: u64,
    stats: SimStats,
}

impl Simulator {
    /// Creates a simulator that will replay `trace` under `config`.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] if the configuration is invalid.
    pub fn new(config: &Config, trace: Trace) -> Result<Self, SimError> {
        config.validate()?;
        let line_bytes = config.prefetcher.line_bytes;
        let controller = Controller::new(config.prefetcher)?
            .with_transition_trace(config.general.trace_transitions);
        Ok(Self {
            controller,
            dma: DmaEngine::from_config(&config.dma, LineMemory::new(line_bytes)),
            requester: MissRequester::new(trace, line_bytes)
                .with_addr_mask(config.prefetcher.addr_mask()),
            cycle: 0,
            max_cycles: config.general.max_cycles,
            stats: SimStats::default(),
        })
    }

    /// Current cycle number (cycles elapsed so far).
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns `true` once the trace is exhausted and every component is idle.
    pub const fn is_finished(&self) -> bool {
        self.requester.is_done() && self.controller.is_idle() && !self.dma.is_busy()
    }

    /// Snapshot of the statistics, including the controller's counters.
    pub fn stats(&self) -> SimStats {
        let mut stats = self.stats.clone();
        stats.prefetcher = *self.controller.stats();
        stats
    }

    /// Advances the whole system by one cycle.
    ///
    /// # Errors
    ///
    /// * [`SimError::DataMismatch`] - a served line differs from backing memory.
    /// * [`SimError::Dma`] - a request was driven into a busy channel.
    pub fn tick(&mut self) -> Result<(), SimError> {
        let cycle = self.cycle;
        self.requester.begin_cycle(cycle);

        let response = self.dma.poll(cycle);
        if let Some(done) = self.requester.on_response(cycle, response.valid) {
            self.record(done);
        }

        let demand = self.requester.demand();
        let presented = self.requester.presented();
        let inputs = CycleInputs {
            miss: presented.map(MissEvent::at).unwrap_or_default(),
            serve: presented.map(ServeRequest::at).unwrap_or_default(),
            dma_busy: arbiter::prefetch_busy(self.dma.is_busy(), demand.is_some()),
            dma_response: response,
        };
        let outputs = self.controller.tick(&inputs);

        if let Some(addr) = presented {
            if outputs.serve.valid && outputs.serve.data != self.dma.memory().read_line(addr) {
                return Err(SimError::DataMismatch { addr, cycle });
            }
            if let Some(done) = self.requester.on_serve(cycle, outputs.serve.valid) {
                self.record(done);
            }
        }

        let prefetch = outputs.dma.request.then_some(outputs.dma.address);
        let in_flight = self.dma.in_flight().map(|t| t.addr);
        let granted = arbiter::resolve(in_flight, demand, prefetch)?;
        match granted {
            Some(Grant::Demand(addr)) => {
                let _ = self.dma.accept(cycle, addr)?;
                self.requester.on_grant();
            }
            Some(Grant::Prefetch(addr)) => {
                let _ = self.dma.accept(cycle, addr)?;
            }
            None => {}
        }

        self.stats.dma_busy_cycles += u64::from(self.dma.is_busy());
        self.cycle += 1;
        self.stats.cycles = self.cycle;
        Ok(())
    }

    /// Runs until the trace is exhausted and the system is idle.
    ///
    /// # Errors
    ///
    /// [`SimError::CycleLimit`] if the configured ceiling is reached first,
    /// or any error from [`tick`](Self::tick).
    pub fn run(&mut self) -> Result<SimStats, SimError> {
        while !self.is_finished() {
            if self.cycle >= self.max_cycles {
                return Err(SimError::CycleLimit {
                    limit: self.max_cycles,
                });
            }
            self.tick()?;
        }
        debug!(cycles = self.cycle, "simulation finished");
        Ok(self.stats())
    }

    fn record(&mut self, done: Completion) {
        self.stats.accesses += 1;
        match done {
            Completion::Prefetched { .. } => self.stats.prefetch_served += 1,
            Completion::Demand { waited, .. } => {
                self.stats.demand_fills += 1;
                self.stats.demand_wait_cycles += waited;
            }
        }
    }
}
