//! Global constants.
//!
//! Reference hardware parameters for the prefetcher and its collaborators.
//! The configurable values here are the defaults picked up by
//! [`crate::config`]; the rest are fixed by the design.

/// Reference address bus width in bits.
pub const ADDRESS_BITS: u32 = 32;

/// Reference cache line size in bytes.
pub const LINE_BYTES: usize = 64;

/// Reference stream-table capacity (also the prefetch-buffer capacity).
pub const STREAM_TABLE_SIZE: usize = 8;

/// Largest forward delta, in address units, that still continues a stream.
pub const STRIDE_THRESHOLD: u64 = 64;

/// Number of misses (including the opening one) that confirm a stream.
pub const CONFIRM_COUNT: u8 = 2;

/// Smallest legal confirmation count: one miss opens a stream, one more is
/// needed before a delta exists.
pub const MIN_CONFIRM_COUNT: u8 = 2;

/// Minimum latency of any DMA transfer in cycles.
///
/// A response can never arrive in the cycle its request was accepted.
pub const MIN_DMA_LATENCY: u64 = 1;

/// Default safety ceiling on simulated cycles for a single run.
pub const MAX_CYCLES: u64 = 10_000_000;
