//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the prefetcher model. It provides:
//! 1. **Prefetcher counters:** Misses observed, streams created and confirmed, prefetches issued.
//! 2. **DMA pressure:** Cycles a held prefetch waited on a busy channel.
//! 3. **Buffer effectiveness:** Serve probes, hits, and lines overwritten before use.
//! 4. **Harness metrics:** Cycles, accesses, demand fills and the latency they cost.

use std::time::Instant;

use serde::Serialize;

/// Counters maintained by the prefetch controller.
///
/// Every field only ever increases; [`Controller::reset`](crate::core::Controller::reset)
/// clears architectural state but leaves these intact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    /// Cycles the controller has been clocked.
    pub cycles: u64,
    /// Valid misses accepted in IDLE.
    pub misses_observed: u64,
    /// Valid misses asserted while the controller was busy and not tracked.
    pub misses_ignored: u64,
    /// Streams opened in a free slot.
    pub streams_created: u64,
    /// Unmatched misses dropped because the table was full.
    pub streams_dropped: u64,
    /// Misses that continued an existing stream.
    pub stream_hits: u64,
    /// Continuing misses that left the stream confirmed.
    pub confirmations: u64,
    /// Prefetch requests accepted by the DMA channel.
    pub prefetches_issued: u64,
    /// Cycles a held prefetch request waited on a busy channel.
    pub dma_stall_cycles: u64,
    /// Prefetched lines written into the buffer.
    pub fills: u64,
    /// Fills that overwrote a line nobody consumed.
    pub unused_overwritten: u64,
    /// Valid cache-serve probes.
    pub serve_probes: u64,
    /// Probes answered from the buffer.
    pub serve_hits: u64,
}

impl PrefetchStats {
    /// Fraction of filled lines that were consumed by the cache.
    pub fn accuracy(&self) -> f64 {
        if self.fills == 0 {
            0.0
        } else {
            self.serve_hits as f64 / self.fills as f64
        }
    }

    /// Fraction of serve probes answered from the buffer.
    pub fn coverage(&self) -> f64 {
        if self.serve_probes == 0 {
            0.0
        } else {
            self.serve_hits as f64 / self.serve_probes as f64
        }
    }
}

/// Simulation statistics for a complete harness run.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total simulated cycles.
    pub cycles: u64,
    /// Trace accesses completed.
    pub accesses: u64,
    /// Accesses satisfied by the prefetch buffer.
    pub prefetch_served: u64,
    /// Accesses satisfied by a demand DMA fill.
    pub demand_fills: u64,
    /// Cycles accesses spent blocked on demand fills.
    pub demand_wait_cycles: u64,
    /// Cycles the DMA channel had a transfer in flight.
    pub dma_busy_cycles: u64,
    /// Controller counters.
    pub prefetcher: PrefetchStats,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            accesses: 0,
            prefetch_served: 0,
            demand_fills: 0,
            demand_wait_cycles: 0,
            dma_busy_cycles: 0,
            prefetcher: PrefetchStats::default(),
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"prefetcher"`, `"buffer"`, `"dma"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "prefetcher", "buffer", "dma"];

impl SimStats {
    /// Average cycles an access spent waiting on a demand fill.
    pub fn avg_demand_latency(&self) -> f64 {
        if self.demand_fills == 0 {
            0.0
        } else {
            self.demand_wait_cycles as f64 / self.demand_fills as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1) as f64;
        let pf = &self.prefetcher;

        if want("summary") {
            let khz = if seconds > 0.0 {
                (self.cycles as f64 / seconds) / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("STREAM PREFETCHER SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_accesses             {}", self.accesses);
            println!("sim_prefetch_served      {}", self.prefetch_served);
            println!("sim_demand_fills         {}", self.demand_fills);
            println!("sim_avg_demand_latency   {:.2}", self.avg_demand_latency());
            println!("----------------------------------------------------------");
        }
        if want("prefetcher") {
            println!("PREFETCHER");
            println!("  misses.observed        {}", pf.misses_observed);
            println!("  misses.ignored         {}", pf.misses_ignored);
            println!("  streams.created        {}", pf.streams_created);
            println!("  streams.dropped        {}", pf.streams_dropped);
            println!("  streams.hits           {}", pf.stream_hits);
            println!("  streams.confirmations  {}", pf.confirmations);
            println!("  prefetch.issued        {}", pf.prefetches_issued);
            println!("----------------------------------------------------------");
        }
        if want("buffer") {
            println!("PREFETCH BUFFER");
            println!("  fills                  {}", pf.fills);
            println!("  serve.probes           {}", pf.serve_probes);
            println!("  serve.hits             {}", pf.serve_hits);
            println!("  overwritten_unused     {}", pf.unused_overwritten);
            println!("  accuracy               {:.2}%", pf.accuracy() * 100.0);
            println!("  coverage               {:.2}%", pf.coverage() * 100.0);
            println!("----------------------------------------------------------");
        }
        if want("dma") {
            println!("DMA CHANNEL");
            println!(
                "  busy                   {} ({:.2}%)",
                self.dma_busy_cycles,
                (self.dma_busy_cycles as f64 / cyc) * 100.0
            );
            println!(
                "  prefetch.stalls        {} ({:.2}%)",
                pf.dma_stall_cycles,
                (pf.dma_stall_cycles as f64 / cyc) * 100.0
            );
            println!("  demand.wait            {}", self.demand_wait_cycles);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
