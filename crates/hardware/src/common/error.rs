//! Error definitions.
//!
//! The prefetcher core itself never fails: table exhaustion, serve misses and
//! a stalled DMA channel are absorbed as silent no-ops. Errors exist only at
//! the edges of the model:
//! 1. **Construction:** invalid configuration parameters ([`ConfigError`]).
//! 2. **DMA model:** protocol violations on the shared channel ([`DmaError`]).
//! 3. **Simulation:** trace/config loading, data verification and run limits ([`SimError`]).

use thiserror::Error;

/// Invalid construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Address width outside `1..=64` bits.
    #[error("address width must be within 1..=64 bits, got {0}")]
    AddressBits(u32),

    /// Cache line size is zero or not a power of two.
    #[error("line size must be a non-zero power of two, got {0} bytes")]
    LineBytes(usize),

    /// Stream table sized to zero entries.
    #[error("stream table must hold at least one entry")]
    EmptyTable,

    /// Continuation threshold of zero can never match any miss.
    #[error("stride threshold must be non-zero")]
    ZeroThreshold,

    /// Confirmation count too small to ever observe a delta.
    #[error("confirmation count must be at least {min}, got {got}")]
    ConfirmCount {
        /// Smallest accepted value.
        min: u8,
        /// Configured value.
        got: u8,
    },
}

/// Protocol violations on the DMA channel model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DmaError {
    /// A request was driven while a transfer was still in flight.
    #[error("DMA request for {addr:#x} while channel busy with {in_flight:#x}")]
    Busy {
        /// Address of the rejected request.
        addr: u64,
        /// Address of the transfer occupying the channel.
        in_flight: u64,
    },
}

/// Errors raised by the simulation harness.
#[derive(Debug, Error)]
pub enum SimError {
    /// Reading a trace or config file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A trace or config file is not valid JSON for its schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File being parsed.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The DMA channel protocol was violated.
    #[error(transparent)]
    Dma(#[from] DmaError),

    /// A line served from the prefetch buffer differs from backing memory.
    #[error("line served for {addr:#x} at cycle {cycle} does not match memory")]
    DataMismatch {
        /// Served address.
        addr: u64,
        /// Cycle of the serve.
        cycle: u64,
    },

    /// The run did not finish within the cycle ceiling.
    #[error("simulation exceeded {limit} cycles")]
    CycleLimit {
        /// Ceiling that was hit.
        limit: u64,
    },
}
