//! System-on-Chip (SoC) Components.
//!
//! Models of the collaborators on the far side of the prefetcher's
//! interfaces: the backing memory and its latency models, the single shared
//! DMA channel, and the arbiter that orders demand fills ahead of prefetches.

/// Demand-first arbitration of the shared DMA channel.
pub mod arbiter;

/// Single-channel DMA engine.
pub mod dma;

/// Backing memory and latency models.
pub mod memory;

pub use dma::DmaEngine;
pub use memory::LineMemory;
