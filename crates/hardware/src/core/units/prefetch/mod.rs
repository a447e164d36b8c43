//! Stream prefetcher storage and detection units.
//!
//! This module contains the data structures the prefetch controller owns:
//! the stream table, the prefetch buffer, and the stride detector that
//! decides whether a miss continues a tracked stream. The table and the
//! buffer always have the same capacity and are addressed by the same slot
//! index.

/// Prefetch buffer (one speculative line per stream slot).
pub mod buffer;

/// Stride detector (continuation test over the stream table).
pub mod stride;

/// Stream table (fixed-capacity candidate/confirmed streams).
pub mod table;

pub use self::buffer::{PrefetchBuffer, PrefetchSlot};
pub use self::table::{StreamEntry, StreamTable};
