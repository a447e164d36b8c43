//! Miss traces.
//!
//! A trace is the ordered list of cache misses the blocking cache will
//! present, each followed by a number of idle cycles before the next one.
//! Traces are loaded from JSON or generated here.
//!
//! ```json
//! { "accesses": [ { "addr": 4096, "gap": 4 }, { "addr": 4160 } ] }
//! ```

use serde::{Deserialize, Serialize};

/// One cache miss and the idle time that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Access {
    /// Missing address; aligned down to its line before use.
    pub addr: u64,
    /// Idle cycles after this access completes.
    #[serde(default)]
    pub gap: u64,
}

/// An ordered miss trace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Trace {
    /// Accesses in program order.
    pub accesses: Vec<Access>,
}

impl Trace {
    /// Number of accesses.
    pub fn len(&self) -> usize {
        self.accesses.len()
    }

    /// Returns `true` if the trace has no accesses.
    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }

    /// A single stream: `count` misses from `base` advancing by `stride`.
    pub fn synthetic_stream(base: u64, stride: u64, count: usize, gap: u64) -> Self {
        let accesses = (0..count as u64)
            .map(|k| Access {
                addr: base.wrapping_add(stride.wrapping_mul(k)),
                gap,
            })
            .collect();
        Self { accesses }
    }

    /// Several streams interleaved round-robin, `count` misses each.
    ///
    /// # Arguments
    ///
    /// * `streams` - `(base, stride)` per stream.
    /// * `count` - Misses per stream.
    /// * `gap` - Idle cycles after every access.
    pub fn interleaved(streams: &[(u64, u64)], count: usize, gap: u64) -> Self {
        let mut accesses = Vec::with_capacity(streams.len() * count);
        for k in 0..count as u64 {
            for &(base, stride) in streams {
                accesses.push(Access {
                    addr: base.wrapping_add(stride.wrapping_mul(k)),
                    gap,
                });
            }
        }
        Self { accesses }
    }
}
