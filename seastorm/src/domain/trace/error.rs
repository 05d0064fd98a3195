//! Trace pipeline errors
//!
//! Every variant aborts the whole pipeline invocation. Conditions that are
//! expected with asynchronously harvested logs (sends to unmonitored processes,
//! receives whose send has not been harvested yet) are not errors and never
//! reach this type.

use thiserror::Error;

/// Broad category of a [`TraceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A process log does not follow the log grammar
    MalformedLog,
    /// The combined logs describe something that cannot have happened
    CausalViolation,
    /// An imported trace or ordering document is unusable
    InvalidDocument,
}

/// Trace pipeline error
#[derive(Error, Debug)]
pub enum TraceError {
    /// Log line starts with something other than send/receive/log
    #[error("Unknown event type '{event_type}' in log of process {process} (line {line}): {text}")]
    UnknownEventType {
        process: String,
        line: usize,
        event_type: String,
        text: String,
    },

    /// Wrong field count, bad integer or undecodable payload
    #[error("Malformed line {line} in log of process {process}: {reason}: {text}")]
    MalformedLine {
        process: String,
        line: usize,
        reason: String,
        text: String,
    },

    /// Two lines of one log share a local timestamp
    #[error(
        "Log of process {process} contains duplicate local timestamp {time} (lines {first_line} and {line})"
    )]
    DuplicateTimestamp {
        process: String,
        time: u64,
        first_line: usize,
        line: usize,
    },

    /// Two events of one process share a timestamp in an assembled trace
    #[error("Two events in process {process} have the same timestamp {time}")]
    DuplicateEventTime { process: String, time: u64 },

    /// Event owned by a process outside the registry
    #[error("Event at time {time} belongs to unknown process {process}")]
    UnknownProcess { process: String, time: u64 },

    /// Receive names a sender outside the registry
    #[error("Process {process} received a message from unknown process {sender} at time {time}")]
    UnknownSender {
        process: String,
        sender: String,
        time: u64,
    },

    /// Receive is not strictly later than its send
    #[error(
        "Process {process} received a message at time {time} before it was sent by {sender} at time {sent_at}"
    )]
    ReceivedBeforeSent {
        process: String,
        sender: String,
        time: u64,
        sent_at: u64,
    },

    /// Departure timestamp names a log or receive event
    #[error(
        "Process {process} received a message from {sender} departing at time {departure}, but that event is a {found} event"
    )]
    NotASend {
        process: String,
        sender: String,
        departure: u64,
        found: &'static str,
    },

    /// One send matched by two receives
    #[error(
        "Message sent by {sender} at time {departure} was received twice (by {process} at time {time})"
    )]
    DuplicateReceive {
        process: String,
        sender: String,
        departure: u64,
        time: u64,
    },

    /// Imported ordering with unresolved sends or one-sided links
    #[error("Invalid ordering: {0}")]
    InvalidOrdering(String),

    /// Imported trace already carries resolved links
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),

    /// Document is not valid JSON for the expected shape

    #[error("Invalid trace document: {0}")]
    Json(#[from] serde_json::Error),
}

impl TraceError {
    /// Create a malformed line error
    pub fn malformed(process: &str, line: usize, text: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            process: process.to_string(),
            line,
            reason: reason.into(),
            text: text.to_string(),
        }
    }

    /// Category used to report the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownEventType { .. }
            | Self::MalformedLine { .. }
            | Self::DuplicateTimestamp { .. }
            | Self::DuplicateEventTime { .. } => ErrorKind::MalformedLog,
            Self::UnknownProcess { .. }
            | Self::UnknownSender { .. }
            | Self::ReceivedBeforeSent { .. }
            | Self::NotASend { .. }
            | Self::DuplicateReceive { .. } => ErrorKind::CausalViolation,
            Self::InvalidOrdering(_) | Self::InvalidTrace(_) | Self::Json(_) => {
                ErrorKind::InvalidDocument
            },
        }
    }

    /// Process whose log or events triggered the error, if any
    pub fn process(&self) -> Option<&str> {
        match self {
            Self::UnknownEventType { process, .. }
            | Self::MalformedLine { process, .. }
            | Self::DuplicateTimestamp { process, .. }
            | Self::DuplicateEventTime { process, .. }
            | Self::UnknownProcess { process, .. }
            | Self::UnknownSender { process, .. }
            | Self::ReceivedBeforeSent { process, .. }
            | Self::NotASend { process, .. }
            | Self::DuplicateReceive { process, .. } => Some(process),
            Self::InvalidOrdering(_) | Self::InvalidTrace(_) | Self::Json(_) => None,
        }
    }
}
