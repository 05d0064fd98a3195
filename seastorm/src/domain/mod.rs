//! Domain logic
//!
//! - `trace` - Per-process log parsing and causal trace reconstruction

pub mod trace;

pub use trace::{Ordering, Trace, TraceError, ordering_from_logs};
