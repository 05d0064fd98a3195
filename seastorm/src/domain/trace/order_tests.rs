//! Tests for causal ordering

use super::*;
use crate::domain::trace::types::{LogEvent, ProcessMap, ReceiveEvent, SendEvent};
use crate::domain::trace::{ErrorKind, trace_from_logs};

// ============================================================================
// HELPERS
// ============================================================================

fn send(time: u64, process: &str, recipient: &str) -> Event {
    Event::Send(SendEvent {
        time,
        process: process.to_string(),
        recipient: recipient.to_string(),
        title: None,
        data: "*".to_string(),
        arrival: None,
    })
}

fn titled_send(time: u64, process: &str, recipient: &str, title: &str) -> Event {
    Event::Send(SendEvent {
        time,
        process: process.to_string(),
        recipient: recipient.to_string(),
        title: Some(title.to_string()),
        data: "*".to_string(),
        arrival: None,
    })
}

fn receive(time: u64, process: &str, sender: &str, departure: u64) -> Event {
    Event::Receive(ReceiveEvent {
        time,
        process: process.to_string(),
        sender: sender.to_string(),
        departure,
        title: None,
        data: None,
    })
}

fn log(time: u64, process: &str) -> Event {
    Event::Log(LogEvent {
        time,
        process: process.to_string(),
        title: None,
        data: "note".to_string(),
    })
}

fn sent(time: u64, process: &str, recipient: &str, arrival: Option<usize>) -> Event {
    Event::Send(SendEvent {
        time,
        process: process.to_string(),
        recipient: recipient.to_string(),
        title: None,
        data: "*".to_string(),
        arrival: Some(arrival),
    })
}

fn received(time: u64, process: &str, sender: &str, departure: u64) -> Event {
    Event::Receive(ReceiveEvent {
        time,
        process: process.to_string(),
        sender: sender.to_string(),
        departure,
        title: None,
        data: Some("*".to_string()),
    })
}

/// Trace whose registry holds every process that owns an event
fn trace_of(events: Vec<Event>) -> Trace {
    let processes = events
        .iter()
        .map(|e| (e.process().to_string(), e.process().to_string()))
        .collect();
    Trace { processes, events }
}

fn registry(ids: &[&str]) -> ProcessMap {
    ids.iter().map(|id| (id.to_string(), id.to_string())).collect()
}

fn assert_links_symmetric(ordering: &Ordering) {
    for (index, event) in ordering.events.iter().enumerate() {
        match event {
            Event::Send(send) => {
                if let Some(Some(arrival)) = send.arrival {
                    let Event::Receive(receive) = &ordering.events[arrival] else {
                        panic!("arrival {arrival} of event {index} is not a receive");
                    };
                    assert_eq!(receive.departure, index as u64);
                }
            }
            Event::Receive(receive) => {
                let departure = receive.departure as usize;
                let Event::Send(send) = &ordering.events[departure] else {
                    panic!("departure {departure} of event {index} is not a send");
                };
                assert_eq!(send.arrival, Some(Some(index)));
                assert!(send.time < receive.time);
            }
            Event::Log(_) => {}
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_received_message() {
    let trace = trace_of(vec![send(1, "A", "B"), receive(2, "B", "A", 1)]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", Some(1)), received(2, "B", "A", 0)]
    );
}

#[test]
fn test_unordered_events() {
    let trace = trace_of(vec![receive(2, "B", "A", 1), send(1, "A", "B")]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", Some(1)), received(2, "B", "A", 0)]
    );
}

#[test]
fn test_non_existing_recipient_kept_undelivered() {
    let trace = trace_of(vec![send(1, "A", "999.999.999.999")]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(ordering.events, vec![sent(1, "A", "999.999.999.999", None)]);
}

#[test]
fn test_message_to_self() {
    let trace = trace_of(vec![send(1, "A", "A"), receive(2, "A", "A", 1)]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "A", Some(1)), received(2, "A", "A", 0)]
    );
}

#[test]
fn test_message_to_self_and_other_message_with_same_departure_time() {
    let trace = trace_of(vec![
        send(1, "A", "A"),
        send(1, "B", "A"),
        receive(2, "A", "A", 1),
        receive(3, "A", "B", 1),
    ]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![
            sent(1, "A", "A", Some(2)),
            sent(1, "B", "A", Some(3)),
            received(2, "A", "A", 0),
            received(3, "A", "B", 1),
        ]
    );
}

#[test]
fn test_equal_timestamps_lower_process_first() {
    let expected = vec![sent(1, "A", "B", None), sent(1, "B", "A", None)];

    let trace = trace_of(vec![send(1, "A", "B"), send(1, "B", "A")]);
    assert_eq!(ordering_from_trace(&trace).unwrap().events, expected);

    let trace = trace_of(vec![send(1, "B", "A"), send(1, "A", "B")]);
    assert_eq!(ordering_from_trace(&trace).unwrap().events, expected);
}

#[test]
fn test_tie_break_is_lexicographic_not_numeric() {
    let trace = trace_of(vec![log(1, "10.0.0.9"), log(1, "10.0.0.10")]);
    let ordering = ordering_from_trace(&trace).unwrap();
    let processes: Vec<&str> = ordering.events.iter().map(Event::process).collect();
    assert_eq!(processes, vec!["10.0.0.10", "10.0.0.9"]);
}

#[test]
fn test_received_message_title() {
    let trace = trace_of(vec![
        titled_send(1, "A", "B", "title"),
        receive(2, "B", "A", 1),
    ]);
    let ordering = ordering_from_trace(&trace).unwrap();
    let Event::Receive(receive) = &ordering.events[1] else {
        panic!("expected receive, got {:?}", ordering.events[1]);
    };
    assert_eq!(receive.title.as_deref(), Some("title"));
    assert_eq!(receive.data.as_deref(), Some("*"));
    assert_eq!(ordering.events[1].label(), "title");
}

#[test]
fn test_log_events_untouched() {
    let trace = trace_of(vec![log(3, "A"), send(1, "A", "B"), receive(2, "B", "A", 1)]);
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(ordering.events[2], log(3, "A"));
    assert_eq!(ordering.counterpart(2), None);
}

#[test]
fn test_input_trace_not_modified() {
    let trace = trace_of(vec![receive(2, "B", "A", 1), send(1, "A", "B")]);
    let before = trace.clone();
    let _ = ordering_from_trace(&trace).unwrap();
    assert_eq!(trace, before);
}

#[test]
fn test_empty_trace() {
    let trace = Trace {
        processes: registry(&["A"]),
        events: Vec::new(),
    };
    let ordering = ordering_from_trace(&trace).unwrap();
    assert!(ordering.events.is_empty());
    assert_eq!(ordering.processes, registry(&["A"]));
}

// ============================================================================
// SILENT DROPS
// ============================================================================

#[test]
fn test_unsent_message_received() {
    let trace = Trace {
        processes: registry(&["A", "B"]),
        events: vec![
            send(1, "A", "B"),
            receive(2, "B", "A", 1),
            receive(3, "B", "A", 2),
        ],
    };
    let (ordering, report) = ordering_with_report(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", Some(1)), received(2, "B", "A", 0)]
    );
    assert_eq!(report.dropped_receives, 1);
}

#[test]
fn test_positions_account_for_dropped_receives() {
    // The dropped receive sorts before the matched pair
    let trace = Trace {
        processes: registry(&["A", "B", "C"]),
        events: vec![
            receive(1, "C", "A", 7),
            send(2, "A", "B"),
            receive(3, "B", "A", 2),
        ],
    };
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(2, "A", "B", Some(1)), received(3, "B", "A", 0)]
    );
    assert_links_symmetric(&ordering);
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_arrival_before_departure() {
    let trace = trace_of(vec![send(1, "A", "B"), receive(0, "B", "A", 1)]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(
        err,
        TraceError::ReceivedBeforeSent {
            time: 0,
            sent_at: 1,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::CausalViolation);
}

#[test]
fn test_arrival_at_same_time_as_departure() {
    let trace = trace_of(vec![send(1, "A", "B"), receive(1, "B", "A", 1)]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(err, TraceError::ReceivedBeforeSent { .. }));
}

#[test]
fn test_duplicate_local_timestamps() {
    let trace = trace_of(vec![send(1, "A", "B"), send(1, "A", "B")]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(err, TraceError::DuplicateEventTime { time: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::MalformedLog);
}

#[test]
fn test_receive_from_unknown_process() {
    let trace = trace_of(vec![receive(2, "A", "X", 1)]);
    let err = ordering_from_trace(&trace).unwrap_err();
    match err {
        TraceError::UnknownSender {
            ref process,
            ref sender,
            time,
        } => {
            assert_eq!(process, "A");
            assert_eq!(sender, "X");
            assert_eq!(time, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_event_from_unregistered_process() {
    let trace = Trace {
        processes: registry(&["A"]),
        events: vec![log(1, "Z")],
    };
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(err, TraceError::UnknownProcess { time: 1, .. }));
}

#[test]
fn test_departure_pointing_at_log_event() {
    let trace = trace_of(vec![log(1, "A"), receive(2, "B", "A", 1)]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(err, TraceError::NotASend { found: "log", .. }));
}

#[test]
fn test_departure_pointing_at_receive_event() {
    let trace = trace_of(vec![
        send(1, "B", "A"),
        receive(2, "A", "B", 1),
        receive(3, "B", "A", 2),
    ]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(err, TraceError::NotASend { found: "receive", .. }));
}

#[test]
fn test_departure_pointing_at_dropped_receive() {
    // A's receive waits on an unharvested send from C and is dropped
    let trace = Trace {
        processes: registry(&["A", "B", "C"]),
        events: vec![receive(2, "A", "C", 9), receive(3, "B", "A", 2)],
    };
    let err = ordering_from_trace(&trace).unwrap_err();
    match err {
        TraceError::NotASend {
            ref process,
            ref sender,
            departure,
            found,
        } => {
            assert_eq!(process, "B");
            assert_eq!(sender, "A");
            assert_eq!(departure, 2);
            assert_eq!(found, "receive");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_message_received_twice() {
    let trace = trace_of(vec![
        send(1, "A", "B"),
        receive(2, "B", "A", 1),
        receive(3, "C", "A", 1),
    ]);
    let err = ordering_from_trace(&trace).unwrap_err();
    assert!(matches!(
        err,
        TraceError::DuplicateReceive {
            departure: 1,
            time: 3,
            ..
        }
    ));
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn conversation() -> Vec<Event> {
    vec![
        send(1, "A", "B"),
        send(1, "B", "C"),
        log(2, "A"),
        receive(2, "C", "B", 1),
        receive(3, "B", "A", 1),
        send(3, "C", "A"),
        receive(5, "A", "C", 3),
        send(6, "B", "A"),
        receive(7, "C", "A", 9),
    ]
}

#[test]
fn test_resolution_is_order_independent() {
    let events = conversation();
    let expected = ordering_from_trace(&trace_of(events.clone())).unwrap();

    let mut reversed = events.clone();
    reversed.reverse();
    assert_eq!(ordering_from_trace(&trace_of(reversed)).unwrap(), expected);

    for shift in 1..events.len() {
        let mut rotated = events.clone();
        rotated.rotate_left(shift);
        assert_eq!(
            ordering_from_trace(&trace_of(rotated)).unwrap(),
            expected,
            "rotation by {shift}"
        );
    }
}

#[test]
fn test_links_are_symmetric() {
    let ordering = ordering_from_trace(&trace_of(conversation())).unwrap();
    assert_links_symmetric(&ordering);

    // receive(7, C, A, 9) has no matching send and is dropped
    assert_eq!(ordering.events.len(), 8);
    let summary = ordering.summary();
    assert_eq!(summary.sends, 4);
    assert_eq!(summary.receives, 3);
    assert_eq!(summary.undelivered, 1);
}

#[test]
fn test_canonical_order_is_sorted() {
    let ordering = ordering_from_trace(&trace_of(conversation())).unwrap();
    let keys: Vec<(u64, &str)> = ordering
        .events
        .iter()
        .map(|e| (e.time(), e.process()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

// ============================================================================
// FROM LOGS
// ============================================================================

fn logs(pairs: &[(&str, &str)]) -> ProcessMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_logs_matched_message() {
    let trace = trace_from_logs(&logs(&[("A", "send,1,B,Kg=="), ("B", "receive,2,1,A")]), None)
        .unwrap();
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", Some(1)), received(2, "B", "A", 0)]
    );
}

#[test]
fn test_logs_mutual_concurrent_sends() {
    let trace =
        trace_from_logs(&logs(&[("B", "send,1,A,Kg=="), ("A", "send,1,B,Kg==")]), None).unwrap();
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", None), sent(1, "B", "A", None)]
    );
}

#[test]
fn test_logs_unmatched_receive_dropped() {
    let trace = trace_from_logs(
        &logs(&[("A", "send,1,B,Kg=="), ("B", "receive,2,1,A\nreceive,3,2,A")]),
        None,
    )
    .unwrap();
    let ordering = ordering_from_trace(&trace).unwrap();
    assert_eq!(
        ordering.events,
        vec![sent(1, "A", "B", Some(1)), received(2, "B", "A", 0)]
    );
}

#[test]
fn test_logs_causal_violation() {
    let trace = trace_from_logs(&logs(&[("A", "send,1,B,Kg=="), ("B", "receive,0,1,A")]), None)
        .unwrap();
    let err = ordering_from_trace(&trace).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CausalViolation);
}
