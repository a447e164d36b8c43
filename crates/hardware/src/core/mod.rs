//! Prefetcher core.
//!
//! This module contains the stream prefetcher proper: the controller state
//! machine, the interface signal bundles it samples and drives, and the
//! storage units it owns (stream table, prefetch buffer, stride detector).

/// Prefetch controller (finite-state machine, evaluate/commit per cycle).
pub mod controller;

/// Interface signal bundles (miss, DMA, cache-serve).
pub mod signals;

/// Storage and detection units owned by the controller.
pub mod units;

pub use self::controller::{Controller, PendingPrefetch, State};
pub use self::signals::{CycleInputs, CycleOutputs};
