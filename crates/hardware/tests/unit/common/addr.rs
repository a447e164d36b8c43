//! Address Arithmetic Tests.
//!
//! Verifies width masking, wrapping addition within the address width, and
//! line alignment.

use pfsim_core::common::{AddrMask, line_align};
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Mask construction
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1, 0x1)]
#[case(16, 0xFFFF)]
#[case(32, 0xFFFF_FFFF)]
#[case(63, 0x7FFF_FFFF_FFFF_FFFF)]
#[case(64, u64::MAX)]
fn mask_selects_low_bits(#[case] bits: u32, #[case] expected: u64) {
    assert_eq!(AddrMask::new(bits).val(), expected);
}

#[test]
fn apply_truncates_high_bits() {
    let mask = AddrMask::new(32);
    assert_eq!(mask.apply(0x1_2345_6789), 0x2345_6789);
    assert_eq!(mask.apply(0x1000), 0x1000);
}

// ══════════════════════════════════════════════════════════
// 2. Wrapping addition
// ══════════════════════════════════════════════════════════

#[test]
fn wrapping_add_wraps_at_width() {
    let mask = AddrMask::new(16);
    assert_eq!(mask.wrapping_add(0xFFC0, 0x40), 0x0000);
    assert_eq!(mask.wrapping_add(0xFFC0, 0x80), 0x0040);
}

#[test]
fn wrapping_add_full_width() {
    let mask = AddrMask::new(64);
    assert_eq!(mask.wrapping_add(u64::MAX, 1), 0);
}

proptest! {
    #[test]
    fn wrapping_add_stays_in_range(bits in 1u32..64, addr: u64, offset: u64) {
        let mask = AddrMask::new(bits);
        prop_assert!(mask.wrapping_add(addr, offset) < (1u64 << bits));
    }
}

// ══════════════════════════════════════════════════════════
// 3. Line alignment
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0x1000, 64, 0x1000)]
#[case(0x103F, 64, 0x1000)]
#[case(0x1040, 64, 0x1040)]
#[case(0x10FF, 128, 0x1080)]
#[case(0x7, 1, 0x7)]
fn line_align_rounds_down(#[case] addr: u64, #[case] line: u64, #[case] expected: u64) {
    assert_eq!(line_align(addr, line), expected);
}
