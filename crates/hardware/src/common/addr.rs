//! Address-width and line-alignment helpers.
//!
//! The prefetcher is parameterised over an address width `W` (1..=64 bits).
//! Every address entering the core is truncated to `W` bits and every address
//! the core produces (prefetch targets) wraps modulo `2^W`, the way a `W`-bit
//! hardware adder would.

/// Mask selecting the low `W` bits of an address.
///
/// Constructed once from the configured address width and then applied to
/// every address crossing one of the prefetcher's interfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddrMask(u64);

impl AddrMask {
    /// Creates a mask for an address bus `bits` wide.
    ///
    /// Widths of 64 or more select the whole `u64`; a width of 0 is rejected
    /// earlier by config validation and yields an all-zero mask here.
    #[inline]
    pub const fn new(bits: u32) -> Self {
        if bits >= 64 {
            Self(u64::MAX)
        } else {
            Self((1u64 << bits) - 1)
        }
    }

    /// Returns the raw mask value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Truncates `addr` to the address width.
    #[inline(always)]
    pub const fn apply(self, addr: u64) -> u64 {
        addr & self.0
    }

    /// Adds `offset` to `addr`, wrapping within the address width.
    #[inline(always)]
    pub const fn wrapping_add(self, addr: u64, offset: u64) -> u64 {
        addr.wrapping_add(offset) & self.0
    }
}

/// Aligns `addr` down to the start of its cache line.
///
/// `line_bytes` must be a power of two.
#[inline(always)]
pub const fn line_align(addr: u64, line_bytes: u64) -> u64 {
    addr & !(line_bytes - 1)
}
