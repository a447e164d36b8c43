//! Simulation harness.
//!
//! Wires the prefetch controller to a trace-driven blocking cache, a
//! single-channel DMA engine and a line-granular memory, and provides the
//! loaders for traces and configuration files.

pub mod loader;
pub mod requester;
pub mod simulator;
pub mod trace;

pub use self::loader::{load_config, load_trace};
pub use self::requester::{Completion, MissRequester, Phase};
pub use self::simulator::Simulator;
pub use self::trace::{Access, Trace};
