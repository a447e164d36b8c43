//! # Statistics Tests
//!
//! Verifies the derived ratios and the JSON shape of the statistics.

use pfsim_core::stats::{PrefetchStats, STATS_SECTIONS, SimStats};

#[test]
fn ratios_are_zero_without_samples() {
    let pf = PrefetchStats::default();
    assert_eq!(pf.accuracy(), 0.0);
    assert_eq!(pf.coverage(), 0.0);
    assert_eq!(SimStats::default().avg_demand_latency(), 0.0);
}

#[test]
fn accuracy_is_hits_over_fills() {
    let pf = PrefetchStats {
        fills: 8,
        serve_hits: 6,
        serve_probes: 12,
        ..PrefetchStats::default()
    };
    assert!((pf.accuracy() - 0.75).abs() < 1e-9);
    assert!((pf.coverage() - 0.5).abs() < 1e-9);
}

#[test]
fn avg_demand_latency_divides_by_fills() {
    let mut stats = SimStats::default();
    stats.demand_fills = 4;
    stats.demand_wait_cycles = 90;
    assert!((stats.avg_demand_latency() - 22.5).abs() < 1e-9);
}

#[test]
fn json_contains_counters_but_not_host_time() {
    let mut stats = SimStats::default();
    stats.cycles = 100;
    stats.accesses = 3;
    stats.prefetcher.prefetches_issued = 2;
    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["cycles"], 100);
    assert_eq!(value["accesses"], 3);
    assert_eq!(value["prefetcher"]["prefetches_issued"], 2);
    assert!(value.get("start_time").is_none());
}

#[test]
fn sections_are_known() {
    assert_eq!(STATS_SECTIONS, &["summary", "prefetcher", "buffer", "dma"]);
}

#[test]
fn print_sections_accepts_subset() {
    let stats = SimStats::default();
    stats.print_sections(&["dma".to_string()]);
    stats.print();
}
