//! JSON interchange for traces and orderings
//!
//! Saved traces are plain documents; loading one and resolving it again
//! reproduces the same ordering. Imported orderings are checked so the
//! renderer never follows a dangling or one-sided link.

use super::error::TraceError;
use super::types::{Event, Ordering, Trace};

impl Trace {
    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a saved trace, rejecting documents that were already resolved
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let trace: Self = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Check that no event carries resolution output. A resolved receive's
    /// `departure` is a position, not the sender's local time.
    pub fn validate(&self) -> Result<(), TraceError> {
        for (index, event) in self.events.iter().enumerate() {
            let resolved = match event {
                Event::Send(send) => send.arrival.is_some(),
                Event::Receive(receive) => receive.data.is_some(),
                Event::Log(_) => false,
            };
            if resolved {
                return Err(TraceError::InvalidTrace(format!(
                    "{} at position {} is already resolved; load it as an ordering",
                    event.kind(),
                    index
                )));
            }
        }
        Ok(())
    }
}

impl Ordering {
    pub fn to_json(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TraceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a saved ordering, rejecting broken links
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let ordering: Self = serde_json::from_str(json)?;
        ordering.validate()?;
        Ok(ordering)
    }

    /// Check that every send is resolved and every link is in range and
    /// points back at its origin.
    pub fn validate(&self) -> Result<(), TraceError> {
        let invalid =
            |msg: String| -> Result<(), TraceError> { Err(TraceError::InvalidOrdering(msg)) };

        for (index, event) in self.events.iter().enumerate() {
            match event {
                Event::Send(send) => match send.arrival {
                    None => return invalid(format!("send at position {} is unresolved", index)),
                    Some(None) => {}
                    Some(Some(arrival)) => match self.events.get(arrival) {
                        Some(Event::Receive(receive)) if receive.departure == index as u64 => {}
                        _ => {
                            return invalid(format!(
                                "arrival {} of send at position {} does not link back",
                                arrival, index
                            ));
                        }
                    },
                },
                Event::Receive(receive) => {
                    let linked = usize::try_from(receive.departure)
                        .ok()
                        .and_then(|departure| self.events.get(departure));
                    match linked {
                        Some(Event::Send(send)) if send.arrival == Some(Some(index)) => {}
                        _ => {
                            return invalid(format!(
                                "departure {} of receive at position {} does not link back",
                                receive.departure, index
                            ));
                        }
                    }
                }
                Event::Log(_) => {}
            }
        }
        Ok(())
    }
}
