//! Interface signals sampled and driven once per cycle.
//!
//! The prefetcher talks to its collaborators over three synchronous
//! boundaries. Each is modelled as a plain `{payload, valid}` bundle the way
//! the wires look in hardware:
//! 1. **Miss interface (in):** [`MissEvent`] from the cache.
//! 2. **DMA interface:** [`DmaRequest`] out; busy flag and [`DmaResponse`] in.
//!    The response carries no address tag.
//! 3. **Cache-serve interface:** [`ServeRequest`] in, [`ServeResponse`] out.

/// Miss address presented by the cache; there is no acknowledge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MissEvent {
    /// Missing address.
    pub address: u64,
    /// Whether a miss is asserted this cycle.
    pub valid: bool,
}

impl MissEvent {
    /// A valid miss at `address`.
    pub const fn at(address: u64) -> Self {
        Self {
            address,
            valid: true,
        }
    }
}

/// Address probe from the cache against the prefetch buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServeRequest {
    /// Requested line address.
    pub address: u64,
    /// Whether a probe is asserted this cycle.
    pub valid: bool,
}

impl ServeRequest {
    /// A valid probe for `address`.
    pub const fn at(address: u64) -> Self {
        Self {
            address,
            valid: true,
        }
    }
}

/// Line returned to the cache when a probe hits the prefetch buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServeResponse {
    /// Line payload; meaningful only when `valid`.
    pub data: Vec<u8>,
    /// Asserted in the same cycle the matching probe was seen.
    pub valid: bool,
}

impl ServeResponse {
    /// A hit carrying `data`.
    pub fn hit(data: Vec<u8>) -> Self {
        Self { data, valid: true }
    }
}

/// Fetch request driven towards the DMA channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DmaRequest {
    /// Asserted for exactly the cycle the request is handed to an idle channel.
    pub request: bool,
    /// Line address to fetch.
    pub address: u64,
}

impl DmaRequest {
    /// A request for `address`.
    pub const fn issue(address: u64) -> Self {
        Self {
            request: true,
            address,
        }
    }
}

/// Line data returned by the DMA channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DmaResponse {
    /// Line payload; meaningful only when `valid`.
    pub data: Vec<u8>,
    /// Whether a transfer completes this cycle.
    pub valid: bool,
}

impl DmaResponse {
    /// A completed transfer carrying `data`.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self { data, valid: true }
    }
}

/// Everything the controller samples in one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleInputs {
    /// Miss interface.
    pub miss: MissEvent,
    /// Cache-serve probe.
    pub serve: ServeRequest,
    /// DMA channel busy flag.
    pub dma_busy: bool,
    /// DMA data return.
    pub dma_response: DmaResponse,
}

impl CycleInputs {
    /// Inputs with nothing asserted and the channel idle.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Asserts a miss at `address`.
    #[must_use]
    pub fn with_miss(mut self, address: u64) -> Self {
        self.miss = MissEvent::at(address);
        self
    }

    /// Asserts a cache-serve probe for `address`.
    #[must_use]
    pub fn with_serve(mut self, address: u64) -> Self {
        self.serve = ServeRequest::at(address);
        self
    }

    /// Drives the DMA busy flag.
    #[must_use]
    pub fn with_busy(mut self, busy: bool) -> Self {
        self.dma_busy = busy;
        self
    }

    /// Presents a DMA response carrying `data`.
    #[must_use]
    pub fn with_response(mut self, data: Vec<u8>) -> Self {
        self.dma_response = DmaResponse::with_data(data);
        self
    }
}

/// Everything the controller drives in one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleOutputs {
    /// DMA request.
    pub dma: DmaRequest,
    /// Cache-serve data return.
    pub serve: ServeResponse,
}
