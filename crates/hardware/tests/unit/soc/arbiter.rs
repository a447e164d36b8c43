//! Arbiter Tests.

use pfsim_core::common::DmaError;
use pfsim_core::soc::arbiter::{Grant, grant, prefetch_busy, resolve};
use rstest::rstest;

#[rstest]
#[case(false, false, false)]
#[case(true, false, true)]
#[case(false, true, true)]
#[case(true, true, true)]
fn prefetcher_sees_busy(#[case] channel: bool, #[case] demand: bool, #[case] expected: bool) {
    assert_eq!(prefetch_busy(channel, demand), expected);
}

#[rstest]
#[case(false, None, None, None)]
#[case(false, Some(0x40), None, Some(Grant::Demand(0x40)))]
#[case(false, None, Some(0x80), Some(Grant::Prefetch(0x80)))]
#[case(false, Some(0x40), Some(0x80), Some(Grant::Demand(0x40)))]
#[case(true, Some(0x40), Some(0x80), None)]
fn demand_first(
    #[case] busy: bool,
    #[case] demand: Option<u64>,
    #[case] prefetch: Option<u64>,
    #[case] expected: Option<Grant>,
) {
    assert_eq!(grant(busy, demand, prefetch), expected);
}

#[test]
fn grant_addr() {
    assert_eq!(Grant::Demand(0x40).addr(), 0x40);
    assert_eq!(Grant::Prefetch(0x80).addr(), 0x80);
}

#[rstest]
#[case(None, None, Some(0x80), Some(Grant::Prefetch(0x80)))]
#[case(None, Some(0x40), None, Some(Grant::Demand(0x40)))]
#[case(Some(0x40), None, None, None)]
fn resolve_accepts_grantable(
    #[case] in_flight: Option<u64>,
    #[case] demand: Option<u64>,
    #[case] prefetch: Option<u64>,
    #[case] expected: Option<Grant>,
) {
    assert_eq!(resolve(in_flight, demand, prefetch), Ok(expected));
}

#[rstest]
#[case(Some(0x40), None, 0x40)]
#[case(None, Some(0xC0), 0xC0)]
fn resolve_refuses_prefetch_before_grant(
    #[case] in_flight: Option<u64>,
    #[case] demand: Option<u64>,
    #[case] holder: u64,
) {
    assert_eq!(
        resolve(in_flight, demand, Some(0x80)),
        Err(DmaError::Busy {
            addr: 0x80,
            in_flight: holder,
        })
    );
}
