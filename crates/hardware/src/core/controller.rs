//! Prefetch Controller.
//!
//! The finite-state machine that owns the stream table and the prefetch
//! buffer and arbitrates the miss, DMA and cache-serve interfaces. It is
//! clocked once per cycle by [`Controller::tick`], which runs in two phases:
//! 1. **Evaluate:** Pure reads against the state committed at the end of the
//!    previous cycle. Produces this cycle's outputs and a deferred write set.
//! 2. **Commit:** Applies the write set atomically at the cycle boundary, so
//!    nothing written in cycle *n* is visible before cycle *n+1*.
//!
//! Buffer serving is evaluated every cycle regardless of control state; it
//! depends only on buffer contents. Miss tracking advances one state per cycle:
//!
//! ```text
//! IDLE --miss--> CHECK_STREAM --match--> UPDATE_STREAM --confirmed--> PREFETCH_WAIT
//!                      |                       |                        |
//!                      +--no match--> CREATE_STREAM --> IDLE <----------+ (response)
//! ```
//!
//! `PREFETCH_WAIT` is the only multi-cycle state. The pending request is held,
//! never dropped, until the first cycle the DMA channel is not busy; it is then
//! issued once and the controller waits, without timeout, for the response.

use tracing::{debug, trace};

use crate::common::error::ConfigError;
use crate::common::AddrMask;
use crate::config::PrefetcherConfig;
use crate::core::signals::{CycleInputs, CycleOutputs, DmaRequest, ServeResponse};
use crate::core::units::prefetch::{PrefetchBuffer, StreamTable};
use crate::stats::PrefetchStats;

/// Controller states.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Waiting for a miss; initial and terminal state.
    #[default]
    Idle,
    /// Running the stride detector against the latched miss.
    CheckStream,
    /// Recording a continuing miss on the matched stream.
    UpdateStream,
    /// Opening a new stream in the first free slot, if any.
    CreateStream,
    /// Holding or awaiting the single outstanding prefetch.
    PrefetchWait,
}

/// The one speculative fetch the controller may have outstanding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingPrefetch {
    /// Stream slot the line belongs to; also its prefetch-buffer slot.
    pub index: usize,
    /// Line address being fetched.
    pub target: u64,
    /// Whether the DMA channel has accepted the request.
    pub accepted: bool,
}

/// Stream-table write deferred to the commit phase.
#[derive(Clone, Copy, Debug)]
enum TableWrite {
    Hit { index: usize, addr: u64 },
    Create { index: usize, addr: u64 },
}

/// Register values and storage writes computed by the evaluate phase.
#[derive(Debug)]
struct Commit {
    state: State,
    miss_latch: u64,
    slot_latch: Option<usize>,
    pending: Option<PendingPrefetch>,
    table: Option<TableWrite>,
    invalidate: Option<usize>,
    fill: Option<(usize, u64, Vec<u8>)>,
    events: Events,
}

/// Per-cycle observations folded into [`PrefetchStats`] at commit.
#[derive(Clone, Copy, Debug, Default)]
struct Events {
    miss_observed: bool,
    miss_ignored: bool,
    dropped: bool,
    confirmed: bool,
    issued: bool,
    stalled: bool,
    serve_probe: bool,
    serve_hit: bool,
}

/// Stream prefetch controller.
#[derive(Debug)]
pub struct Controller {
    config: PrefetcherConfig,
    mask: AddrMask,
    state: State,
    /// Miss address latched in IDLE and consumed by the following states.
    miss_latch: u64,
    /// Slot chosen in CHECK_STREAM; `None` when the table was full.
    slot_latch: Option<usize>,
    table: StreamTable,
    buffer: PrefetchBuffer,
    pending: Option<PendingPrefetch>,
    trace_transitions: bool,
    stats: PrefetchStats,
}

impl Controller {
    /// Creates a controller in IDLE with an empty table and buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` fails validation.
    pub fn new(config: PrefetcherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mask: config.addr_mask(),
            state: State::Idle,
            miss_latch: 0,
            slot_latch: None,
            table: StreamTable::new(&config),
            buffer: PrefetchBuffer::new(config.table_size, config.line_bytes),
            pending: None,
            trace_transitions: false,
            stats: PrefetchStats::default(),
            config,
        })
    }

    /// Enables a `debug!` event for every state transition.
    #[must_use]
    pub fn with_transition_trace(mut self, enabled: bool) -> Self {
        self.trace_transitions = enabled;
        self
    }

    /// Returns the construction parameters.
    pub const fn config(&self) -> &PrefetcherConfig {
        &self.config
    }

    /// Returns the committed control state.
    pub const fn state(&self) -> State {
        self.state
    }

    /// Returns `true` when no miss is being processed and no prefetch is outstanding.
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Returns the stream table.
    pub const fn table(&self) -> &StreamTable {
        &self.table
    }

    /// Returns the prefetch buffer.
    pub const fn buffer(&self) -> &PrefetchBuffer {
        &self.buffer
    }

    /// Returns the outstanding prefetch, if any.
    pub const fn pending(&self) -> Option<PendingPrefetch> {
        self.pending
    }

    /// Returns the accumulated counters.
    pub const fn stats(&self) -> &PrefetchStats {
        &self.stats
    }

    /// Returns the controller to its power-on state.
    ///
    /// Table and buffer become entirely invalid and zeroed, the pending
    /// request is forgotten and the state is IDLE. Counters are kept.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.miss_latch = 0;
        self.slot_latch = None;
        self.pending = None;
        self.table.reset();
        self.buffer.reset();
    }

    /// Advances the controller by one cycle.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Interface signals sampled this cycle.
    ///
    /// # Returns
    ///
    /// The signals driven this cycle (DMA request, served line).
    pub fn tick(&mut self, inputs: &CycleInputs) -> CycleOutputs {
        let (outputs, commit) = self.evaluate(inputs);
        self.commit(commit);
        outputs
    }

    /// Computes this cycle's outputs and deferred writes from committed state.
    fn evaluate(&self, inputs: &CycleInputs) -> (CycleOutputs, Commit) {
        let mut out = CycleOutputs::default();
        let mut c = Commit {
            state: self.state,
            miss_latch: self.miss_latch,
            slot_latch: self.slot_latch,
            pending: self.pending,
            table: None,
            invalidate: None,
            fill: None,
            events: Events::default(),
        };

        if inputs.serve.valid {
            c.events.serve_probe = true;
            let addr = self.mask.apply(inputs.serve.address);
            if let Some(index) = self.buffer.probe(addr)
                && let Some(slot) = self.buffer.slot(index)
            {
                out.serve = ServeResponse::hit(slot.data.clone());
                c.invalidate = Some(index);
                c.events.serve_hit = true;
            }
        }

        if inputs.miss.valid && self.state != State::Idle {
            c.events.miss_ignored = true;
        }

        match self.state {
            State::Idle => {
                if inputs.miss.valid {
                    c.miss_latch = self.mask.apply(inputs.miss.address);
                    c.events.miss_observed = true;
                    c.state = State::CheckStream;
                }
            }
            State::CheckStream => match self.table.find_or_allocate(self.miss_latch) {
                Some((index, false)) => {
                    c.slot_latch = Some(index);
                    c.state = State::UpdateStream;
                }
                Some((index, true)) => {
                    c.slot_latch = Some(index);
                    c.state = State::CreateStream;
                }
                None => {
                    c.slot_latch = None;
                    c.state = State::CreateStream;
                }
            },
            State::UpdateStream => {
                c.state = State::Idle;
                if let Some(index) = self.slot_latch
                    && let Some(next) = self.table.preview_hit(index, self.miss_latch)
                {
                    c.table = Some(TableWrite::Hit {
                        index,
                        addr: self.miss_latch,
                    });
                    if next.is_confirmed(self.config.confirm_count) {
                        c.events.confirmed = true;
                        c.pending = Some(PendingPrefetch {
                            index,
                            target: self.mask.wrapping_add(next.last_address, next.stride),
                            accepted: false,
                        });
                        c.state = State::PrefetchWait;
                    }
                }
            }
            State::CreateStream => {
                match self.slot_latch {
                    Some(index) => {
                        c.table = Some(TableWrite::Create {
                            index,
                            addr: self.miss_latch,
                        });
                    }
                    None => c.events.dropped = true,
                }
                c.state = State::Idle;
            }
            State::PrefetchWait => match self.pending {
                Some(p) if !p.accepted => {
                    if inputs.dma_busy {
                        c.events.stalled = true;
                    } else {
                        out.dma = DmaRequest::issue(p.target);
                        c.pending = Some(PendingPrefetch {
                            accepted: true,
                            ..p
                        });
                        c.events.issued = true;
                    }
                }
                Some(p) => {
                    if inputs.dma_response.valid {
                        c.fill = Some((p.index, p.target, inputs.dma_response.data.clone()));
                        c.pending = None;
                        c.state = State::Idle;
                    }
                }
                None => c.state = State::Idle,
            },
        }

        (out, c)
    }

    /// Applies a write set at the cycle boundary.
    ///
    /// Buffer invalidation is applied before a fill so a line fetched into a
    /// slot being consumed in the same cycle survives.
    fn commit(&mut self, c: Commit) {
        let from = self.state;

        match c.table {
            Some(TableWrite::Hit { index, addr }) => {
                let confirmed = self.table.record_hit(index, addr);
                debug!(index, confirmed, "stream continued at {addr:#x}");
            }
            Some(TableWrite::Create { index, addr }) => {
                self.table.record_create(index, addr);
                debug!(index, "stream created at {addr:#x}");
            }
            None => {}
        }

        if let Some(index) = c.invalidate {
            self.buffer.invalidate(index);
            trace!(index, "prefetch buffer hit");
        }
        if let Some((index, addr, data)) = c.fill {
            if let Some(lost) = self.buffer.fill(index, addr, data) {
                self.stats.unused_overwritten += 1;
                debug!(index, "unused prefetch of {lost:#x} overwritten");
            }
            self.stats.fills += 1;
            debug!(index, "prefetch filled for {addr:#x}");
        }

        if c.events.issued
            && let Some(p) = c.pending
        {
            debug!(index = p.index, "prefetch issued for {:#x}", p.target);
        }

        self.state = c.state;
        self.miss_latch = c.miss_latch;
        self.slot_latch = c.slot_latch;
        self.pending = c.pending;

        let e = c.events;
        let s = &mut self.stats;
        s.cycles += 1;
        s.misses_observed += u64::from(e.miss_observed);
        s.misses_ignored += u64::from(e.miss_ignored);
        s.streams_dropped += u64::from(e.dropped);
        s.confirmations += u64::from(e.confirmed);
        s.prefetches_issued += u64::from(e.issued);
        s.dma_stall_cycles += u64::from(e.stalled);
        s.serve_probes += u64::from(e.serve_probe);
        s.serve_hits += u64::from(e.serve_hit);
        match c.table {
            Some(TableWrite::Hit { .. }) => s.stream_hits += 1,
            Some(TableWrite::Create { .. }) => s.streams_created += 1,
            None => {}
        }

        if self.trace_transitions && from != self.state {
            debug!(?from, to = ?self.state, "controller transition");
        }
    }
}
