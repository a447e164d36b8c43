//! Configuration system for the prefetcher model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the model. It provides:
//! 1. **Defaults:** Reference hardware constants (table size, threshold, line width, DMA timing).
//! 2. **Structures:** Hierarchical config for general, prefetcher, and DMA settings.
//! 3. **Enums:** Stride base policy and DMA latency model.
//!
//! Configuration is fixed at construction. Supply it as JSON (CLI `--config`) or use
//! `Config::default()`.

use serde::{Deserialize, Serialize};

use crate::common::constants;
use crate::common::error::ConfigError;
use crate::common::AddrMask;

/// Default configuration constants.
///
/// These values define the reference hardware when not explicitly overridden.
mod defaults {
    use crate::common::constants;

    /// Reference address width in bits.
    pub const ADDRESS_BITS: u32 = constants::ADDRESS_BITS;

    /// Reference cache line size in bytes.
    pub const LINE_BYTES: usize = constants::LINE_BYTES;

    /// Reference stream-table capacity.
    pub const TABLE_SIZE: usize = constants::STREAM_TABLE_SIZE;

    /// Reference continuation threshold in address units.
    pub const THRESHOLD: u64 = constants::STRIDE_THRESHOLD;

    /// Reference confirmation count.
    pub const CONFIRM_COUNT: u8 = constants::CONFIRM_COUNT;

    /// Fixed DMA latency in cycles for the simple controller.
    pub const DMA_LATENCY: u64 = 20;

    /// CAS (Column Access Strobe) latency in DRAM cycles.
    pub const T_CAS: u64 = 14;

    /// RAS (Row Access Strobe) latency in DRAM cycles.
    pub const T_RAS: u64 = 14;

    /// Precharge latency in DRAM cycles.
    pub const T_PRE: u64 = 14;

    /// Cycle ceiling for a simulation run.
    pub const MAX_CYCLES: u64 = constants::MAX_CYCLES;
}

/// Reference point used when a stream's stride is computed at confirmation.
///
/// The surveyed designs disagree here; `Previous` is the reference policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum StrideBase {
    /// Stride is the delta between the two most recent misses.
    #[default]
    Previous,
    /// Stride is the delta from the miss that opened the stream.
    Origin,
}

/// DMA latency model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum DmaController {
    /// Every transfer takes the same number of cycles.
    #[default]
    Simple,
    /// Row-buffer-aware DRAM timing (CAS, RAS, precharge).
    #[serde(alias = "DRAM")]
    Dram,
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use pfsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.prefetcher.table_size, 8);
/// assert_eq!(config.prefetcher.threshold, 64);
/// ```
///
/// Deserializing from JSON; omitted fields take their defaults:
///
/// ```
/// use pfsim_core::config::{Config, DmaController, StrideBase};
///
/// let json = r#"{
///     "prefetcher": { "table_size": 4, "stride_base": "Origin" },
///     "dma": { "controller": "Dram" }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.prefetcher.table_size, 4);
/// assert_eq!(config.prefetcher.line_bytes, 64);
/// assert_eq!(config.prefetcher.stride_base, StrideBase::Origin);
/// assert_eq!(config.dma.controller, DmaController::Dram);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Prefetcher core parameters
    #[serde(default)]
    pub prefetcher: PrefetcherConfig,
    /// DMA channel model parameters
    #[serde(default)]
    pub dma: DmaConfig,
}

impl Config {
    /// Validates every section that has construction constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.prefetcher.validate()
    }
}

/// General simulation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Emit a `debug!` event for every controller state transition.
    #[serde(default)]
    pub trace_transitions: bool,

    /// Cycle ceiling after which a run is aborted.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default cycle ceiling.
    fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_transitions: false,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Prefetcher core parameters, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PrefetcherConfig {
    /// Address bus width in bits
    #[serde(default = "PrefetcherConfig::default_address_bits")]
    pub address_bits: u32,

    /// Cache line size in bytes (power of two)
    #[serde(default = "PrefetcherConfig::default_line_bytes")]
    pub line_bytes: usize,

    /// Stream-table capacity; the prefetch buffer has the same capacity
    #[serde(default = "PrefetcherConfig::default_table_size")]
    pub table_size: usize,

    /// Largest forward delta that continues a stream
    #[serde(default = "PrefetcherConfig::default_threshold")]
    pub threshold: u64,

    /// Misses needed to confirm a stream, counting the one that opened it
    #[serde(default = "PrefetcherConfig::default_confirm_count")]
    pub confirm_count: u8,

    /// Reference point for the stride computed at confirmation
    #[serde(default)]
    pub stride_base: StrideBase,
}

impl PrefetcherConfig {
    /// Returns the default address width.
    fn default_address_bits() -> u32 {
        defaults::ADDRESS_BITS
    }

    /// Returns the default line size.
    fn default_line_bytes() -> usize {
        defaults::LINE_BYTES
    }

    /// Returns the default table capacity.
    fn default_table_size() -> usize {
        defaults::TABLE_SIZE
    }

    /// Returns the default continuation threshold.
    fn default_threshold() -> u64 {
        defaults::THRESHOLD
    }

    /// Returns the default confirmation count.
    fn default_confirm_count() -> u8 {
        defaults::CONFIRM_COUNT
    }

    /// Checks the construction constraints.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::AddressBits`] - width outside `1..=64`.
    /// * [`ConfigError::LineBytes`] - line size zero or not a power of two.
    /// * [`ConfigError::EmptyTable`] - table capacity zero.
    /// * [`ConfigError::ZeroThreshold`] - threshold zero.
    /// * [`ConfigError::ConfirmCount`] - confirmation count below two.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address_bits == 0 || self.address_bits > 64 {
            return Err(ConfigError::AddressBits(self.address_bits));
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::LineBytes(self.line_bytes));
        }
        if self.table_size == 0 {
            return Err(ConfigError::EmptyTable);
        }
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.confirm_count < constants::MIN_CONFIRM_COUNT {
            return Err(ConfigError::ConfirmCount {
                min: constants::MIN_CONFIRM_COUNT,
                got: self.confirm_count,
            });
        }
        Ok(())
    }

    /// Returns the address mask for the configured width.
    pub const fn addr_mask(&self) -> AddrMask {
        AddrMask::new(self.address_bits)
    }
}

impl Default for PrefetcherConfig {
    fn default() -> Self {
        Self {
            address_bits: defaults::ADDRESS_BITS,
            line_bytes: defaults::LINE_BYTES,
            table_size: defaults::TABLE_SIZE,
            threshold: defaults::THRESHOLD,
            confirm_count: defaults::CONFIRM_COUNT,
            stride_base: StrideBase::Previous,
        }
    }
}

/// DMA channel model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DmaConfig {
    /// Latency model
    #[serde(default)]
    pub controller: DmaController,

    /// Fixed latency for the simple model
    #[serde(default = "DmaConfig::default_latency")]
    pub latency: u64,

    /// CAS latency (column access strobe)
    #[serde(default = "DmaConfig::default_t_cas")]
    pub t_cas: u64,

    /// RAS latency (row access strobe)
    #[serde(default = "DmaConfig::default_t_ras")]
    pub t_ras: u64,

    /// Precharge latency
    #[serde(default = "DmaConfig::default_t_pre")]
    pub t_pre: u64,
}

impl DmaConfig {
    /// Returns the default fixed latency.
    fn default_latency() -> u64 {
        defaults::DMA_LATENCY
    }

    /// Returns the default CAS latency in DRAM cycles.
    fn default_t_cas() -> u64 {
        defaults::T_CAS
    }

    /// Returns the default RAS latency in DRAM cycles.
    fn default_t_ras() -> u64 {
        defaults::T_RAS
    }

    /// Returns the default precharge latency in DRAM cycles.
    fn default_t_pre() -> u64 {
        defaults::T_PRE
    }
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self {
            controller: DmaController::Simple,
            latency: defaults::DMA_LATENCY,
            t_cas: defaults::T_CAS,
            t_ras: defaults::T_RAS,
            t_pre: defaults::T_PRE,
        }
    }
}
