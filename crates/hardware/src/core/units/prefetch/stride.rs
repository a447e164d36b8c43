//! Stride Detector.
//!
//! Decides whether a newly valid miss continues one of the streams already
//! held in the stream table. A miss continues an entry when the entry is
//! valid and the miss lies strictly ahead of the entry's last miss by no more
//! than the continuation threshold:
//!
//! ```text
//! 0 < new_address - last_address <= threshold
//! ```
//!
//! The scan runs in ascending slot order and the first match wins, so two
//! overlapping candidate streams resolve deterministically to the lower index.
//!
//! # Performance
//!
//! - **Time Complexity:** O(T) where T is the table capacity (8 by default)
//! - **Hardware Cost:** T parallel subtract-and-compare units plus a priority encoder

use super::table::StreamEntry;

/// Returns the forward delta from `entry` to `addr` if `addr` continues it.
///
/// # Arguments
///
/// * `entry` - Candidate stream entry.
/// * `addr` - Masked miss address.
/// * `threshold` - Largest delta that still continues the stream.
///
/// # Returns
///
/// `Some(delta)` when the entry is valid and `0 < delta <= threshold`.
#[inline]
pub fn continuation(entry: &StreamEntry, addr: u64, threshold: u64) -> Option<u64> {
    if !entry.valid {
        return None;
    }
    match addr.checked_sub(entry.last_address) {
        Some(delta) if delta > 0 && delta <= threshold => Some(delta),
        _ => None,
    }
}

/// Scans `entries` for the first stream continued by `addr`.
///
/// # Arguments
///
/// * `entries` - Stream table contents, indexed by slot.
/// * `addr` - Masked miss address.
/// * `threshold` - Continuation threshold.
///
/// # Returns
///
/// The lowest matching slot index, or `None` to signal "create new stream".
pub fn detect(entries: &[StreamEntry], addr: u64, threshold: u64) -> Option<usize> {
    entries
        .iter()
        .position(|entry| continuation(entry, addr, threshold).is_some())
}
