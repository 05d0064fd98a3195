//! Trace assembly from per-process logs

use super::error::TraceError;
use super::parse::parse_log;
use super::types::{Event, ProcessMap, Trace};

/// What assembly kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub processes: usize,
    pub events: usize,
    /// Sends addressed to processes outside the registry
    pub dropped_sends: usize,
}

/// Build a trace from raw logs (process id -> log text).
///
/// The registry is `aliases` verbatim when given, otherwise every log's id
/// names itself. Sends to processes outside the registry are dropped.
pub fn trace_from_logs(
    logs: &ProcessMap,
    aliases: Option<&ProcessMap>,
) -> Result<Trace, TraceError> {
    assemble_with_report(logs, aliases).map(|(trace, _)| trace)
}

/// Same as [`trace_from_logs`], also reporting what was dropped
pub fn assemble_with_report(
    logs: &ProcessMap,
    aliases: Option<&ProcessMap>,
) -> Result<(Trace, AssemblyReport), TraceError> {
    let processes = match aliases {
        Some(aliases) => aliases.clone(),
        None => logs.keys().map(|id| (id.clone(), id.clone())).collect(),
    };

    let mut events = Vec::new();
    for (process, log) in logs {
        events.extend(parse_log(process, log)?);
    }

    let parsed = events.len();
    events.retain(|event| match event {
        Event::Send(send) => processes.contains_key(&send.recipient),
        _ => true,
    });

    let report = AssemblyReport {
        processes: processes.len(),
        events: events.len(),
        dropped_sends: parsed - events.len(),
    };

    tracing::debug!(
        processes = report.processes,
        events = report.events,
        dropped_sends = report.dropped_sends,
        "Assembled trace"
    );

    Ok((Trace { processes, events }, report))
}
