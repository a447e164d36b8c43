//! Prefetch Controller Tests.
//!
//! Drives the controller cycle by cycle and checks the state sequence, the
//! DMA handshake, buffer serving and the commit ordering of same-cycle
//! buffer writes.

use pfsim_core::common::ConfigError;
use pfsim_core::config::{PrefetcherConfig, StrideBase};
use pfsim_core::core::{Controller, CycleInputs, CycleOutputs, State};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::harness::Bench;

const A: u64 = 0x1000;
const S: u64 = 64;
const LINE: usize = 64;

fn ctrl() -> Controller {
    Controller::new(PrefetcherConfig::default()).unwrap()
}

fn tick(c: &mut Controller, inputs: CycleInputs) -> CycleOutputs {
    c.tick(&inputs)
}

/// Presents a miss and clocks the two cycles needed to leave CHECK_STREAM's successor.
fn present(c: &mut Controller, addr: u64) {
    let _ = tick(c, CycleInputs::idle().with_miss(addr));
    let _ = tick(c, CycleInputs::idle());
    let _ = tick(c, CycleInputs::idle());
}

// ══════════════════════════════════════════════════════════
// 1. Construction
// ══════════════════════════════════════════════════════════

#[test]
fn starts_idle_and_empty() {
    let c = ctrl();
    assert_eq!(c.state(), State::Idle);
    assert!(c.is_idle());
    assert_eq!(c.table().occupied(), 0);
    assert_eq!(c.buffer().ready(), 0);
    assert_eq!(c.pending(), None);
    assert_eq!(c.buffer().len(), c.table().len());
}

#[test]
fn rejects_invalid_config() {
    let err = Controller::new(PrefetcherConfig {
        confirm_count: 1,
        ..PrefetcherConfig::default()
    })
    .unwrap_err();
    assert_eq!(err, ConfigError::ConfirmCount { min: 2, got: 1 });
}

// ══════════════════════════════════════════════════════════
// 2. State sequence
// ══════════════════════════════════════════════════════════

#[test]
fn new_stream_takes_three_cycles() {
    let mut c = ctrl();
    let _ = tick(&mut c, CycleInputs::idle().with_miss(A));
    assert_eq!(c.state(), State::CheckStream);
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::CreateStream);
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::Idle);

    let e = *c.table().get(0).unwrap();
    assert!(e.valid);
    assert_eq!(e.start_address, A);
    assert_eq!(e.miss_count, 1);
    assert_eq!(c.stats().streams_created, 1);
}

#[test]
fn continuing_miss_goes_through_update_to_wait() {
    let mut c = ctrl();
    present(&mut c, A);
    let _ = tick(&mut c, CycleInputs::idle().with_miss(A + S));
    assert_eq!(c.state(), State::CheckStream);
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::UpdateStream);
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::PrefetchWait);

    let p = c.pending().unwrap();
    assert_eq!(p.index, 0);
    assert_eq!(p.target, A + 2 * S);
    assert!(!p.accepted);
}

#[test]
fn idle_without_miss_stays_idle() {
    let mut c = ctrl();
    for _ in 0..10 {
        let out = tick(&mut c, CycleInputs::idle());
        assert!(!out.dma.request);
        assert!(!out.serve.valid);
    }
    assert_eq!(c.state(), State::Idle);
    assert_eq!(c.stats().cycles, 10);
}

#[test]
fn miss_while_busy_is_ignored() {
    let mut c = ctrl();
    let _ = tick(&mut c, CycleInputs::idle().with_miss(A));
    let _ = tick(&mut c, CycleInputs::idle().with_miss(0x9000));
    let _ = tick(&mut c, CycleInputs::idle());
    assert!(c.is_idle());
    assert_eq!(c.table().occupied(), 1);
    assert_eq!(c.stats().misses_observed, 1);
    assert_eq!(c.stats().misses_ignored, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Stream detection
// ══════════════════════════════════════════════════════════

#[test]
fn two_misses_request_next_line() {
    let mut b = Bench::default();
    b.misses(&[A, A + S]);
    assert_eq!(b.issued_addrs(), vec![A + 2 * S]);

    let slot = b.ctrl.buffer().slot(0).unwrap();
    assert!(slot.valid);
    assert_eq!(slot.address, A + 2 * S);
    assert_eq!(slot.data, b.memory.read_line(A + 2 * S));
}

/// A, A+S, A+2S ends with exactly one request for A+3S.
#[test]
fn third_miss_requests_a_plus_3s_once() {
    let mut b = Bench::default();
    b.misses(&[A, A + S]);
    let before = b.cycle;
    b.miss(A + 2 * S);

    let after: Vec<u64> = b
        .issued
        .iter()
        .filter(|i| i.cycle >= before)
        .map(|i| i.addr)
        .collect();
    assert_eq!(after, vec![A + 3 * S]);
    assert_eq!(b.issued_addrs().iter().filter(|&&x| x == A + 3 * S).count(), 1);
}

#[rstest]
#[case(1)]
#[case(16)]
#[case(48)]
#[case(64)]
fn stride_within_threshold_is_followed(#[case] stride: u64) {
    let mut b = Bench::default();
    b.misses(&[A, A + stride, A + 2 * stride]);
    assert_eq!(b.issued_addrs(), vec![A + 2 * stride, A + 3 * stride]);
    assert_eq!(b.ctrl.table().occupied(), 1);
}

#[rstest]
#[case(0)]
#[case(65)]
#[case(4096)]
fn delta_outside_window_opens_new_stream(#[case] delta: u64) {
    let mut b = Bench::default();
    b.misses(&[A, A + delta]);
    assert!(b.issued.is_empty());
    assert_eq!(b.ctrl.table().occupied(), 2);
}

#[test]
fn backward_miss_opens_new_stream() {
    let mut b = Bench::default();
    b.misses(&[A, A - S]);
    assert!(b.issued.is_empty());
    assert_eq!(b.ctrl.table().occupied(), 2);
}

#[test]
fn interleaved_streams_use_their_own_slots() {
    let mut b = Bench::default();
    let other = 0x8000;
    b.misses(&[A, other, A + S, other + S]);
    assert_eq!(b.issued_addrs(), vec![A + 2 * S, other + 2 * S]);
    assert_eq!(b.ctrl.buffer().slot(0).unwrap().address, A + 2 * S);
    assert_eq!(b.ctrl.buffer().slot(1).unwrap().address, other + 2 * S);
}

#[test]
fn full_table_drops_new_streams() {
    let mut b = Bench::new(PrefetcherConfig {
        table_size: 2,
        ..PrefetcherConfig::default()
    });
    b.misses(&[A, 0x9000, 0x20000]);
    assert_eq!(b.ctrl.table().occupied(), 2);
    assert_eq!(b.ctrl.stats().streams_dropped, 1);
    assert!(b.ctrl.table().entries().iter().all(|e| e.start_address != 0x20000));
    assert!(b.issued.is_empty());

    // Existing streams keep working.
    b.miss(A + S);
    assert_eq!(b.issued_addrs(), vec![A + 2 * S]);
}

#[rstest]
#[case(StrideBase::Previous, A + 3 * S)]
#[case(StrideBase::Origin, A + 4 * S)]
fn stride_base_selects_reference(#[case] base: StrideBase, #[case] target: u64) {
    let mut b = Bench::new(PrefetcherConfig {
        confirm_count: 3,
        stride_base: base,
        ..PrefetcherConfig::default()
    });
    b.misses(&[A, A + S]);
    assert!(b.issued.is_empty(), "not confirmed after two misses");
    b.miss(A + 2 * S);
    assert_eq!(b.issued_addrs(), vec![target]);
}

#[test]
fn addresses_are_masked_to_width() {
    let mut b = Bench::new(PrefetcherConfig {
        address_bits: 16,
        ..PrefetcherConfig::default()
    });
    b.miss(0x1_1000);
    assert_eq!(b.ctrl.table().get(0).unwrap().start_address, 0x1000);
}

#[test]
fn prefetch_target_wraps_at_width() {
    let mut b = Bench::new(PrefetcherConfig {
        address_bits: 16,
        ..PrefetcherConfig::default()
    });
    b.misses(&[0xFF80, 0xFFC0]);
    assert_eq!(b.issued_addrs(), vec![0x0000]);
}

// ══════════════════════════════════════════════════════════
// 4. DMA handshake
// ══════════════════════════════════════════════════════════

#[test]
fn request_held_while_busy() {
    let mut b = Bench::default();
    b.miss(A);
    b.hold_busy = true;
    let _ = b.step(Some(A + S), None);
    let _ = b.idle();
    let _ = b.idle();
    assert_eq!(b.ctrl.state(), State::PrefetchWait);

    for _ in 0..5 {
        let out = b.idle();
        assert!(!out.dma.request);
    }
    assert_eq!(b.ctrl.stats().dma_stall_cycles, 5);
    assert!(b.issued.is_empty());

    b.hold_busy = false;
    let out = b.idle();
    assert!(out.dma.request);
    assert_eq!(out.dma.address, A + 2 * S);
    assert!(b.ctrl.pending().unwrap().accepted);
    b.settle();
    assert_eq!(b.issued.len(), 1);
    assert_eq!(b.ctrl.stats().dma_stall_cycles, 5);
}

#[test]
fn request_is_a_single_cycle_pulse() {
    let mut b = Bench::default().with_latency(10);
    b.miss(A);
    let _ = b.step(Some(A + S), None);
    let mut pulses = 0;
    while !b.ctrl.is_idle() {
        if b.idle().dma.request {
            pulses += 1;
        }
    }
    assert_eq!(pulses, 1);
    assert_eq!(b.ctrl.stats().prefetches_issued, 1);
}

#[test]
fn waits_without_timeout_for_response() {
    let mut b = Bench::default().with_latency(500);
    b.miss(A);
    let _ = b.step(Some(A + S), None);
    for _ in 0..400 {
        let _ = b.idle();
    }
    assert_eq!(b.ctrl.state(), State::PrefetchWait);
    b.settle();
    assert_eq!(b.ctrl.buffer().ready(), 1);
}

#[test]
fn response_ignored_before_acceptance() {
    let mut c = ctrl();
    present(&mut c, A);
    present(&mut c, A + S);
    assert_eq!(c.state(), State::PrefetchWait);

    let _ = tick(
        &mut c,
        CycleInputs::idle()
            .with_busy(true)
            .with_response(vec![1; LINE]),
    );
    assert_eq!(c.state(), State::PrefetchWait);
    assert_eq!(c.buffer().ready(), 0);
    assert!(!c.pending().unwrap().accepted);

    let out = tick(&mut c, CycleInputs::idle());
    assert!(out.dma.request);
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::PrefetchWait);

    let _ = tick(&mut c, CycleInputs::idle().with_response(vec![2; LINE]));
    assert!(c.is_idle());
    assert_eq!(c.pending(), None);
    let slot = c.buffer().slot(0).unwrap();
    assert_eq!(slot.address, A + 2 * S);
    assert_eq!(slot.data, vec![2; LINE]);
}

// ══════════════════════════════════════════════════════════
// 5. Buffer serving
// ══════════════════════════════════════════════════════════

#[test]
fn serve_hit_is_single_use() {
    let mut b = Bench::default();
    b.misses(&[A, A + S]);
    let out = b.step(None, Some(A + 2 * S));
    assert!(out.serve.valid);
    assert_eq!(out.serve.data, b.memory.read_line(A + 2 * S));

    let out = b.step(None, Some(A + 2 * S));
    assert!(!out.serve.valid);
    assert_eq!(b.ctrl.stats().serve_hits, 1);
    assert_eq!(b.ctrl.stats().serve_probes, 2);
}

#[test]
fn serve_miss_for_other_address() {
    let mut b = Bench::default();
    b.misses(&[A, A + S]);
    assert!(!b.step(None, Some(A + 3 * S)).serve.valid);
    assert_eq!(b.ctrl.buffer().ready(), 1);
}

#[test]
fn serve_works_in_any_state() {
    let mut b = Bench::default();
    b.misses(&[A, A + S]);
    b.hold_busy = true;
    let other = 0x8000;
    let _ = b.step(Some(other), None);
    let _ = b.idle();
    let _ = b.idle();
    let _ = b.step(Some(other + S), None);
    let _ = b.idle();
    let _ = b.idle();
    assert_eq!(b.ctrl.state(), State::PrefetchWait);

    let out = b.step(None, Some(A + 2 * S));
    assert!(out.serve.valid);
    assert_eq!(b.ctrl.state(), State::PrefetchWait);

    b.hold_busy = false;
    b.settle();
}

#[test]
fn streamed_access_hits_buffer() {
    let mut b = Bench::default();
    assert_eq!(b.access(A), None);
    assert_eq!(b.access(A + S), None);
    assert_eq!(b.access(A + 2 * S), Some(b.memory.read_line(A + 2 * S)));
    assert_eq!(b.access(A + 3 * S), Some(b.memory.read_line(A + 3 * S)));
}

// ══════════════════════════════════════════════════════════
// 6. Same-cycle buffer writes
// ══════════════════════════════════════════════════════════

/// Builds a controller with slot 0 holding `A+2S` (payload 0xAA) and a
/// request for `A+3S` issued into the same slot.
fn slot_busy_with_next_request() -> Controller {
    let mut c = ctrl();
    present(&mut c, A);
    present(&mut c, A + S);
    let _ = tick(&mut c, CycleInputs::idle());
    let _ = tick(&mut c, CycleInputs::idle().with_response(vec![0xAA; LINE]));
    assert_eq!(c.buffer().slot(0).unwrap().address, A + 2 * S);

    present(&mut c, A + 2 * S);
    let out = tick(&mut c, CycleInputs::idle());
    assert_eq!(out.dma.address, A + 3 * S);
    c
}

#[test]
fn invalidate_applies_before_fill() {
    let mut c = slot_busy_with_next_request();
    let out = tick(
        &mut c,
        CycleInputs::idle()
            .with_serve(A + 2 * S)
            .with_response(vec![0xBB; LINE]),
    );
    assert!(out.serve.valid);
    assert_eq!(out.serve.data, vec![0xAA; LINE]);

    let slot = c.buffer().slot(0).unwrap();
    assert!(slot.valid);
    assert_eq!(slot.address, A + 3 * S);
    assert_eq!(slot.data, vec![0xBB; LINE]);
    assert_eq!(c.stats().unused_overwritten, 0);
}

#[test]
fn unconsumed_line_overwrite_is_counted() {
    let mut c = slot_busy_with_next_request();
    let _ = tick(&mut c, CycleInputs::idle().with_response(vec![0xBB; LINE]));
    assert_eq!(c.buffer().slot(0).unwrap().address, A + 3 * S);
    assert_eq!(c.stats().unused_overwritten, 1);
    assert_eq!(c.stats().fills, 2);
}

// ══════════════════════════════════════════════════════════
// 7. Reset
// ══════════════════════════════════════════════════════════

#[test]
fn reset_clears_state_but_keeps_counters() {
    let mut c = ctrl();
    present(&mut c, A);
    present(&mut c, A + S);
    assert_eq!(c.state(), State::PrefetchWait);

    c.reset();
    assert!(c.is_idle());
    assert_eq!(c.pending(), None);
    assert_eq!(c.table().occupied(), 0);
    assert_eq!(c.buffer().ready(), 0);
    assert_eq!(c.stats().streams_created, 1);
    assert_eq!(c.stats().confirmations, 1);

    // A late response after reset is not consumed.
    let _ = tick(&mut c, CycleInputs::idle().with_response(vec![1; LINE]));
    assert_eq!(c.buffer().ready(), 0);
}

#[test]
fn reset_is_idempotent() {
    let mut c = ctrl();
    present(&mut c, A);
    c.reset();
    c.reset();
    assert!(c.table().entries().iter().all(|e| !e.valid));

    let _ = tick(&mut c, CycleInputs::idle().with_miss(A + S));
    let _ = tick(&mut c, CycleInputs::idle());
    assert_eq!(c.state(), State::CreateStream);
}

#[test]
fn transition_trace_does_not_change_behaviour() {
    let mut plain = Bench::default();
    let mut traced = Bench::default();
    traced.ctrl = Controller::new(PrefetcherConfig::default())
        .unwrap()
        .with_transition_trace(true);
    for b in [&mut plain, &mut traced] {
        b.misses(&[A, A + S, A + 2 * S]);
    }
    assert_eq!(plain.issued, traced.issued);
    assert_eq!(plain.ctrl.stats(), traced.ctrl.stats());
}
