//! Common utilities and types shared across the prefetcher model.
//!
//! 1. **Addresses:** Width masking and line alignment.
//! 2. **Constants:** Reference hardware parameters.
//! 3. **Errors:** Configuration, DMA protocol and simulation errors.

/// Address-width masking and line alignment.
pub mod addr;

/// Reference hardware parameters.
pub mod constants;

/// Error types.
pub mod error;

pub use addr::{AddrMask, line_align};
pub use error::{ConfigError, DmaError, SimError};
