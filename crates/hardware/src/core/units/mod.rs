//! Functional units owned by the prefetch controller.
//!
//! The controller is the only client of these units; nothing outside the
//! core reads or writes the stream table or the prefetch buffer directly.

/// Stream table, prefetch buffer, and stride detector.
pub mod prefetch;
