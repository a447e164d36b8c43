//! Stream prefetcher simulator library.
//!
//! This crate implements a cycle-stepped model of a hardware stream prefetcher:
//! 1. **Core:** The prefetch controller FSM, its stream table, stride detector and prefetch buffer.
//! 2. **SoC:** A single-channel DMA engine, demand-first arbitration and memory latency models.
//! 3. **Simulation:** A trace-driven blocking cache, trace and configuration loading.
//! 4. **Stats:** Counters for the controller and the harness, with text and JSON reporting.

/// Common types and constants (address masking, defaults, errors).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Prefetch controller, interface signals and storage units.
pub mod core;
/// Trace-driven harness and file loaders.
pub mod sim;
/// DMA engine, arbitration and memory models.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Stream prefetch controller; clock it with `Controller::tick`.
pub use crate::core::Controller;
/// Complete harness; construct with `Simulator::new`.
pub use crate::sim::Simulator;
