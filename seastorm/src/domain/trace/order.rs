//! Causal ordering of a trace
//!
//! Resolution turns an unresolved [`Trace`] into an [`Ordering`]:
//!
//! 1. Sort events by `(time, process id)`. Ties between processes are broken
//!    by plain byte-wise comparison of the ids, so the order never depends on
//!    the input order.
//! 2. Index every event by `(process, time)`.
//! 3. Drop receives whose send has not been harvested yet.
//! 4. Link every remaining receive to its send by final position and copy the
//!    message payload onto the receive.
//!
//! The input trace is never modified; the ordering is built from a copy.

use std::collections::HashMap;

use super::error::TraceError;
use super::types::{Event, Ordering, Trace};

/// What resolution dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderReport {
    /// Receives whose matching send is not (yet) in the sender's log
    pub dropped_receives: usize,
}

/// Resolve a trace into its canonical ordering.
pub fn ordering_from_trace(trace: &Trace) -> Result<Ordering, TraceError> {
    ordering_with_report(trace).map(|(ordering, _)| ordering)
}

/// Same as [`ordering_from_trace`], also reporting what was dropped
pub fn ordering_with_report(trace: &Trace) -> Result<(Ordering, OrderReport), TraceError> {
    let mut sorted = trace.events.clone();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let timeline = Timeline::build(trace, &sorted)?;

    // Final position of each sorted event, `None` when dropped
    let mut positions: Vec<Option<usize>> = Vec::with_capacity(sorted.len());
    let mut events: Vec<Event> = Vec::with_capacity(sorted.len());
    let mut report = OrderReport::default();

    for event in sorted {
        if let Event::Receive(receive) = &event
            && timeline.is_unsent(&receive.sender, receive.departure)
        {
            tracing::trace!(
                process = %receive.process,
                sender = %receive.sender,
                time = receive.time,
                departure = receive.departure,
                "Dropping receive without a matching send"
            );
            report.dropped_receives += 1;
            positions.push(None);
            continue;
        }
        positions.push(Some(events.len()));
        events.push(event);
    }

    for event in &mut events {
        if let Event::Send(send) = event {
            send.arrival = Some(None);
        }
    }

    for index in 0..events.len() {
        let Event::Receive(receive) = &events[index] else {
            continue;
        };
        let (process, sender, time, departure) = (
            receive.process.clone(),
            receive.sender.clone(),
            receive.time,
            receive.departure,
        );

        let Some(times) = timeline.times(&sender) else {
            return Err(TraceError::UnknownSender {
                process,
                sender,
                time,
            });
        };
        let Some(&sorted_index) = times.get(&departure) else {
            continue;
        };
        // Only receives are ever dropped, so a dropped match is not a send
        let Some(send_index) = positions[sorted_index] else {
            return Err(TraceError::NotASend {
                process,
                sender,
                departure,
                found: "receive",
            });
        };

        let (data, title) = match &mut events[send_index] {
            Event::Send(send) => {
                if send.arrival.flatten().is_some() {
                    return Err(TraceError::DuplicateReceive {
                        process,
                        sender,
                        departure,
                        time,
                    });
                }
                if send.time >= time {
                    return Err(TraceError::ReceivedBeforeSent {
                        process,
                        sender,
                        time,
                        sent_at: send.time,
                    });
                }
                send.arrival = Some(Some(index));
                (send.data.clone(), send.title.clone())
            }
            other => {
                return Err(TraceError::NotASend {
                    process,
                    sender,
                    departure,
                    found: other.kind(),
                });
            }
        };

        if let Event::Receive(receive) = &mut events[index] {
            receive.departure = send_index as u64;
            receive.data = Some(data);
            if title.is_some() {
                receive.title = title;
            }
        }
    }

    tracing::debug!(
        events = events.len(),
        dropped_receives = report.dropped_receives,
        "Resolved ordering"
    );

    let ordering = Ordering {
        processes: trace.processes.clone(),
        events,
    };
    Ok((ordering, report))
}

/// Per-process index of sorted events by local time
struct Timeline<'a> {
    by_process: HashMap<&'a str, HashMap<u64, usize>>,
}

impl<'a> Timeline<'a> {
    fn build(trace: &'a Trace, sorted: &[Event]) -> Result<Self, TraceError> {
        let mut by_process: HashMap<&'a str, HashMap<u64, usize>> = trace
            .processes
            .keys()
            .map(|id| (id.as_str(), HashMap::new()))
            .collect();

        for (index, event) in sorted.iter().enumerate() {
            let Some(times) = by_process.get_mut(event.process()) else {
                return Err(TraceError::UnknownProcess {
                    process: event.process().to_string(),
                    time: event.time(),
                });
            };
            if times.insert(event.time(), index).is_some() {
                return Err(TraceError::DuplicateEventTime {
                    process: event.process().to_string(),
                    time: event.time(),
                });
            }
        }

        Ok(Self { by_process })
    }

    /// Known sender, but nothing logged at `departure`
    fn is_unsent(&self, sender: &str, departure: u64) -> bool {
        self.by_process
            .get(sender)
            .is_some_and(|times| !times.contains_key(&departure))
    }

    /// Local time -> sorted index for a registered process
    fn times(&self, process: &str) -> Option<&HashMap<u64, usize>> {
        self.by_process.get(process)
    }
}

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;
