//! Trace data model
//!
//! `Trace` is the unresolved collection of processes and events gathered from
//! logs. `Ordering` is the same data after resolution: events sorted into the
//! canonical global order, with send/receive pairs linked by position.
//!
//! Both serialize to the interchange document used for trace export:
//!
//! ```json
//! {
//!   "processes": { "A": "A", "B": "B" },
//!   "events": [
//!     { "type": "send", "time": 1, "process": "A", "recipient": "B", "data": "*", "arrival": 1 },
//!     { "type": "receive", "time": 2, "process": "B", "sender": "A", "departure": 0, "data": "*" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Process registry: process id -> display name
pub type ProcessMap = BTreeMap<String, String>;

// =============================================================================
// Events
// =============================================================================

/// A message handed to another process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEvent {
    pub time: u64,
    pub process: String,
    pub recipient: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: String,
    /// Position of the matching receive.
    ///
    /// `None` before resolution (omitted from JSON), `Some(None)` for a
    /// message that was never observed as received (`null`), and
    /// `Some(Some(i))` once linked.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "resolved_position"
    )]
    pub arrival: Option<Option<usize>>,
}

/// A message taken from another process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveEvent {
    pub time: u64,
    pub process: String,
    pub sender: String,
    /// Sender's local timestamp of the send before resolution, position of
    /// the matching send afterwards.
    pub departure: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Copied from the matching send during resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A local annotation with no linkage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub time: u64,
    pub process: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub data: String,
}

/// One entry of a process log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Send(SendEvent),
    Receive(ReceiveEvent),
    Log(LogEvent),
}

impl Event {
    /// Local timestamp in the owning process
    pub fn time(&self) -> u64 {
        match self {
            Event::Send(e) => e.time,
            Event::Receive(e) => e.time,
            Event::Log(e) => e.time,
        }
    }

    /// Id of the owning process
    pub fn process(&self) -> &str {
        match self {
            Event::Send(e) => &e.process,
            Event::Receive(e) => &e.process,
            Event::Log(e) => &e.process,
        }
    }

    /// Tag used in logs and the interchange document
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Send(_) => "send",
            Event::Receive(_) => "receive",
            Event::Log(_) => "log",
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Event::Send(e) => e.title.as_deref(),
            Event::Receive(e) => e.title.as_deref(),
            Event::Log(e) => e.title.as_deref(),
        }
    }

    pub fn data(&self) -> Option<&str> {
        match self {
            Event::Send(e) => Some(&e.data),
            Event::Receive(e) => e.data.as_deref(),
            Event::Log(e) => Some(&e.data),
        }
    }

    /// Short text for display: the title, falling back to the payload
    pub fn label(&self) -> &str {
        self.title().or_else(|| self.data()).unwrap_or_default()
    }

    /// Canonical sort key: local time, then process id
    pub(crate) fn sort_key(&self) -> (u64, &str) {
        (self.time(), self.process())
    }
}

// =============================================================================
// Trace / Ordering
// =============================================================================

/// Unresolved processes and events, as gathered from logs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub processes: ProcessMap,
    pub events: Vec<Event>,
}

/// Resolved trace: canonical order, linked by position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub processes: ProcessMap,
    pub events: Vec<Event>,
}

/// A process with its display position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub id: String,
    pub name: String,
    pub number: usize,
}

/// Event counts for a resolved trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderingSummary {
    pub processes: usize,
    pub sends: usize,
    pub receives: usize,
    pub logs: usize,
    /// Sends with no observed receive
    pub undelivered: usize,
}

impl Ordering {
    /// Position of the event linked to the one at `index`
    pub fn counterpart(&self, index: usize) -> Option<usize> {
        match self.events.get(index)? {
            Event::Send(send) => send.arrival.flatten(),
            Event::Receive(receive) => usize::try_from(receive.departure).ok(),
            Event::Log(_) => None,
        }
    }

    /// Whether the event at `index` is a message end with no counterpart
    pub fn is_unmatched(&self, index: usize) -> bool {
        match self.events.get(index) {
            Some(Event::Log(_)) | None => false,
            Some(_) => self.counterpart(index).is_none(),
        }
    }

    /// Processes sorted by id, numbered for layout
    pub fn process_list(&self) -> Vec<ProcessEntry> {
        self.processes
            .iter()
            .enumerate()
            .map(|(number, (id, name))| ProcessEntry {
                id: id.clone(),
                name: name.clone(),
                number,
            })
            .collect()
    }

    pub fn summary(&self) -> OrderingSummary {
        let mut summary = OrderingSummary {
            processes: self.processes.len(),
            ..Default::default()
        };
        for (index, event) in self.events.iter().enumerate() {
            match event {
                Event::Send(_) => {
                    summary.sends += 1;
                    if self.is_unmatched(index) {
                        summary.undelivered += 1;
                    }
                }
                Event::Receive(_) => summary.receives += 1,
                Event::Log(_) => summary.logs += 1,
            }
        }
        summary
    }
}

/// Serde adapter telling an absent `arrival` apart from an explicit `null`
mod resolved_position {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<usize>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(position) => position.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<usize>>, D::Error> {
        Option::<usize>::deserialize(deserializer).map(Some)
    }
}
