//! Process log parsing
//!
//! Each non-blank line of a process log is one comma-separated event record:
//!
//! ```text
//! send,<time>,<recipient>,<data_b64>
//! send,<time>,<recipient>,<title_b64>,<data_b64>
//! receive,<time>,<departure_time>,<sender>
//! log,<time>,<data_b64>
//! log,<time>,<title_b64>,<data_b64>
//! ```
//!
//! Payloads and titles are base64-encoded UTF-8 and are decoded here. Any
//! malformed line rejects the whole log.

use std::collections::HashMap;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::error::TraceError;
use super::types::{Event, LogEvent, ReceiveEvent, SendEvent};

/// Standard alphabet; remote programs are not consistent about padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parse one process's raw log into events, in log order.
pub fn parse_log(process: &str, text: &str) -> Result<Vec<Event>, TraceError> {
    let mut events = Vec::new();
    let mut seen: HashMap<u64, usize> = HashMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = index + 1;
        let event = parse_line(process, line_no, line)?;

        if let Some(first_line) = seen.insert(event.time(), line_no) {
            return Err(TraceError::DuplicateTimestamp {
                process: process.to_string(),
                time: event.time(),
                first_line,
                line: line_no,
            });
        }
        events.push(event);
    }

    tracing::trace!(process, events = events.len(), "Parsed process log");
    Ok(events)
}

fn parse_line(process: &str, line_no: usize, line: &str) -> Result<Event, TraceError> {
    let fields: Vec<&str> = line.split(',').collect();
    let field = LineFields {
        process,
        line_no,
        line,
    };

    match fields.as_slice() {
        ["send", time, recipient, data] => Ok(Event::Send(SendEvent {
            time: field.number("time", time)?,
            process: process.to_string(),
            recipient: recipient.to_string(),
            title: None,
            data: field.text("data", data)?,
            arrival: None,
        })),
        ["send", time, recipient, title, data] => Ok(Event::Send(SendEvent {
            time: field.number("time", time)?,
            process: process.to_string(),
            recipient: recipient.to_string(),
            title: Some(field.text("title", title)?),
            data: field.text("data", data)?,
            arrival: None,
        })),
        ["send", ..] => Err(field.arity("send", "4 or 5", fields.len())),
        ["receive", time, departure, sender] => Ok(Event::Receive(ReceiveEvent {
            time: field.number("time", time)?,
            process: process.to_string(),
            sender: sender.to_string(),
            departure: field.number("departure time", departure)?,
            title: None,
            data: None,
        })),
        ["receive", ..] => Err(field.arity("receive", "4", fields.len())),
        ["log", time, data] => Ok(Event::Log(LogEvent {
            time: field.number("time", time)?,
            process: process.to_string(),
            title: None,
            data: field.text("data", data)?,
        })),
        ["log", time, title, data] => Ok(Event::Log(LogEvent {
            time: field.number("time", time)?,
            process: process.to_string(),
            title: Some(field.text("title", title)?),
            data: field.text("data", data)?,
        })),
        ["log", ..] => Err(field.arity("log", "3 or 4", fields.len())),
        [event_type, ..] => Err(TraceError::UnknownEventType {
            process: process.to_string(),
            line: line_no,
            event_type: event_type.to_string(),
            text: line.to_string(),
        }),
        [] => Err(field.malformed("empty record")),
    }
}

/// Field decoding with the line context needed for error reports
struct LineFields<'a> {
    process: &'a str,
    line_no: usize,
    line: &'a str,
}

impl LineFields<'_> {
    fn malformed(&self, reason: impl Into<String>) -> TraceError {
        TraceError::malformed(self.process, self.line_no, self.line, reason)
    }

    fn arity(&self, event_type: &str, expected: &str, found: usize) -> TraceError {
        self.malformed(format!(
            "{} expects {} fields, found {}",
            event_type, expected, found
        ))
    }

    fn number(&self, name: &str, value: &str) -> Result<u64, TraceError> {
        value
            .parse()
            .map_err(|_| self.malformed(format!("invalid {} '{}'", name, value)))
    }

    fn text(&self, name: &str, value: &str) -> Result<String, TraceError> {
        let bytes = PAYLOAD_ENGINE
            .decode(value)
            .map_err(|e| self.malformed(format!("invalid base64 in {}: {}", name, e)))?;
        String::from_utf8(bytes).map_err(|_| self.malformed(format!("{} is not valid UTF-8", name)))
    }
}
