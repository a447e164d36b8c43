//! DMA channel arbitration between demand fills and prefetches.
//!
//! The cache's ordinary miss fills and the prefetcher share one DMA channel.
//! Demand fills always win: the prefetcher is told the channel is busy while
//! a transfer is in flight *or* a demand fill is waiting to be granted, so it
//! only ever drives a request into a channel that will accept it.

use crate::common::error::DmaError;

/// Who a grant went to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    /// A demand fill for the cache.
    Demand(u64),
    /// A speculative fetch for the prefetcher.
    Prefetch(u64),
}

impl Grant {
    /// Line address of the granted request.
    pub const fn addr(self) -> u64 {
        match self {
            Self::Demand(addr) | Self::Prefetch(addr) => addr,
        }
    }
}

/// Busy flag presented to the prefetcher.
///
/// # Arguments
///
/// * `channel_busy` - A transfer is in flight.
/// * `demand_waiting` - The cache has a demand fill waiting for the channel.
#[inline]
pub const fn prefetch_busy(channel_busy: bool, demand_waiting: bool) -> bool {
    channel_busy || demand_waiting
}

/// Picks the request the channel accepts this cycle.
///
/// # Arguments
///
/// * `channel_busy` - A transfer is in flight after this cycle's response.
/// * `demand` - Address of a waiting demand fill.
/// * `prefetch` - Address of the prefetcher's request, if driven this cycle.
///
/// # Returns
///
/// The granted request, or `None` if nothing can be accepted.
pub const fn grant(channel_busy: bool, demand: Option<u64>, prefetch: Option<u64>) -> Option<Grant> {
    if channel_busy {
        return None;
    }
    match (demand, prefetch) {
        (Some(addr), _) => Some(Grant::Demand(addr)),
        (None, Some(addr)) => Some(Grant::Prefetch(addr)),
        (None, None) => None,
    }
}

/// Picks the grant and rejects a driven prefetch that cannot be accepted.
///
/// Nothing is modified; callers apply the grant only on `Ok`.
///
/// # Arguments
///
/// * `in_flight` - Address of the transfer occupying the channel, if any.
/// * `demand` - Address of a waiting demand fill.
/// * `prefetch` - Address of the prefetcher's request, if driven this cycle.
///
/// # Errors
///
/// [`DmaError::Busy`] if `prefetch` was driven but the channel goes to
/// another transfer this cycle.
pub fn resolve(
    in_flight: Option<u64>,
    demand: Option<u64>,
    prefetch: Option<u64>,
) -> Result<Option<Grant>, DmaError> {
    let granted = grant(in_flight.is_some(), demand, prefetch);
    match prefetch {
        Some(addr) if granted != Some(Grant::Prefetch(addr)) => Err(DmaError::Busy {
            addr,
            in_flight: in_flight.or(demand).unwrap_or(addr),
        }),
        _ => Ok(granted),
    }
}
