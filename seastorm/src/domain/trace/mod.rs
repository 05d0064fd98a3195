//! Trace reconstruction pipeline
//!
//! - `parse` - Stage 1: Parse one process log into typed events
//! - `assemble` - Stage 2: Merge process logs into a `Trace`
//! - `order` - Stage 3: Resolve a `Trace` into a causally linked `Ordering`
//! - `codec` - JSON interchange for saved traces and orderings
//! - `collect` - Read harvested logs and aliases from disk
//!
//! Stages 1-3 are pure and synchronous. Every batch of logs is run through
//! the whole pipeline again; nothing is cached between runs.

mod assemble;
mod codec;
pub mod collect;
mod error;
mod order;
mod parse;
mod types;

pub use assemble::{AssemblyReport, assemble_with_report, trace_from_logs};
pub use error::{ErrorKind, TraceError};
pub use order::{OrderReport, ordering_from_trace, ordering_with_report};
pub use parse::parse_log;
pub use types::{
    Event, LogEvent, Ordering, OrderingSummary, ProcessEntry, ProcessMap, ReceiveEvent,
    SendEvent, Trace,
};

/// Run the full pipeline: logs -> trace -> ordering
pub fn ordering_from_logs(
    logs: &ProcessMap,
    aliases: Option<&ProcessMap>,
) -> Result<Ordering, TraceError> {
    let trace = trace_from_logs(logs, aliases)?;
    ordering_from_trace(&trace)
}
