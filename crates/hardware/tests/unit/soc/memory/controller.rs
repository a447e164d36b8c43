//! Latency Model Tests.
//!
//! Verifies the fixed-latency model and the row-buffer-aware DRAM model as
//! seen by a stream of line fetches.

use pfsim_core::config::{DmaConfig, DmaController};
use pfsim_core::soc::memory::controller::{
    DramController, MemoryController, SimpleController, from_config,
};

const LINE: u64 = 64;

// ══════════════════════════════════════════════════════════
// 1. SimpleController
// ══════════════════════════════════════════════════════════

#[test]
fn simple_latency_is_address_independent() {
    let mut ctrl = SimpleController::new(20);
    assert_eq!(ctrl.access_latency(0), 20);
    assert_eq!(ctrl.access_latency(0x1000), 20);
    assert_eq!(ctrl.access_latency(u64::MAX), 20);
}

// ══════════════════════════════════════════════════════════
// 2. DramController
// ══════════════════════════════════════════════════════════

#[test]
fn dram_first_fetch_opens_row() {
    let mut ctrl = DramController::new(5, 10, 8);
    assert_eq!(ctrl.access_latency(0x1000), 15);
}

/// A unit-stride stream stays in the open row for 32 consecutive lines.
#[test]
fn dram_sequential_lines_hit_open_row() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x2000);
    for k in 1..32 {
        assert_eq!(ctrl.access_latency(0x2000 + k * LINE), 5, "line {k}");
    }
    assert_eq!(ctrl.access_latency(0x2000 + 32 * LINE), 23);
}

#[test]
fn dram_row_boundary() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x07C0);
    assert_eq!(ctrl.access_latency(0x0800), 23);
}

#[test]
fn dram_alternating_rows_always_miss() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x1000);
    for _ in 0..4 {
        assert_eq!(ctrl.access_latency(0x8000), 23);
        assert_eq!(ctrl.access_latency(0x1000), 23);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Selection from configuration
// ══════════════════════════════════════════════════════════

#[test]
fn from_config_simple() {
    let mut ctrl = from_config(&DmaConfig {
        latency: 7,
        ..DmaConfig::default()
    });
    assert_eq!(ctrl.access_latency(0x1000), 7);
}

#[test]
fn from_config_dram() {
    let mut ctrl = from_config(&DmaConfig {
        controller: DmaController::Dram,
        t_cas: 3,
        t_ras: 4,
        t_pre: 5,
        ..DmaConfig::default()
    });
    assert_eq!(ctrl.access_latency(0x1000), 7);
    assert_eq!(ctrl.access_latency(0x1040), 3);
    assert_eq!(ctrl.access_latency(0x9000), 12);
}
