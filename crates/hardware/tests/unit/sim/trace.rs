//! # Trace Tests

use pfsim_core::sim::{Access, Trace};
use pretty_assertions::assert_eq;

#[test]
fn synthetic_stream_advances_by_stride() {
    let t = Trace::synthetic_stream(0x1000, 0x40, 4, 3);
    assert_eq!(t.len(), 4);
    assert_eq!(
        t.accesses,
        vec![
            Access { addr: 0x1000, gap: 3 },
            Access { addr: 0x1040, gap: 3 },
            Access { addr: 0x1080, gap: 3 },
            Access { addr: 0x10C0, gap: 3 },
        ]
    );
}

#[test]
fn empty_stream() {
    assert!(Trace::synthetic_stream(0, 64, 0, 0).is_empty());
}

#[test]
fn interleaved_round_robin() {
    let t = Trace::interleaved(&[(0x1000, 0x40), (0x8000, 0x80)], 2, 0);
    let addrs: Vec<u64> = t.accesses.iter().map(|a| a.addr).collect();
    assert_eq!(addrs, vec![0x1000, 0x8000, 0x1040, 0x8080]);
}

#[test]
fn gap_defaults_to_zero() {
    let t: Trace = serde_json::from_str(r#"{"accesses":[{"addr":4096},{"addr":4160,"gap":9}]}"#)
        .unwrap();
    assert_eq!(t.accesses[0].gap, 0);
    assert_eq!(t.accesses[1].gap, 9);
}
