//! Integration tests for streaming monitor sessions

use hyperwatch_debug::{TraceEvent, TracerConfig};
use hyperwatch_foundation::{ErrorKind, PropId, Value, ValueKind, VarId, VarRegistry};
use hyperwatch_language::Formula;
use hyperwatch_runtime::{Monitor, MonitorConfig};
use hyperwatch_storage::TraceStore;

fn handshake() -> (VarRegistry, PropId, PropId, VarId) {
    let mut registry = VarRegistry::new();
    let req = registry.add_prop("req");
    let ack = registry.add_prop("ack");
    let data = registry.add_term("data", ValueKind::Vector).unwrap();
    (registry, req, ack, data)
}

// =============================================================================
// Streaming
// =============================================================================

#[test]
fn properties_are_evaluated_per_step() {
    let (registry, req, ack, _) = handshake();
    let mut monitor = Monitor::with_config(registry, 2, MonitorConfig::strict());
    // Whenever trace 0 requests, trace 1 acknowledges in the same cycle.
    monitor
        .add_property(
            "mirrored-ack",
            &Formula::always_future(Formula::implies(
                Formula::prop(req, 0),
                Formula::prop(ack, 1),
            )),
        )
        .unwrap();

    let requests = [false, true, false, true, false];
    let acks = [false, true, false, false, false];
    let mut holds = Vec::new();
    for cycle in 0..5u32 {
        let i = cycle as usize;
        monitor.update_prop(0, req, cycle, requests[i]).unwrap();
        monitor.update_prop(0, ack, cycle, false).unwrap();
        monitor.update_prop(1, req, cycle, false).unwrap();
        monitor.update_prop(1, ack, cycle, acks[i]).unwrap();
        let verdicts = monitor.step(cycle).unwrap();
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].0, "mirrored-ack");
        holds.push(verdicts[0].1.holds);
    }
    assert_eq!(holds, vec![true, true, true, false, false]);

    let final_verdicts = monitor.close().unwrap();
    assert!(!final_verdicts[0].1.holds);
    assert!(!final_verdicts[0].1.provisional);
}

#[test]
fn signals_hold_between_writes() {
    let (registry, req, _, data) = handshake();
    let mut monitor = Monitor::new(registry, 2);
    monitor
        .add_property("same-data", &Formula::always_future(Formula::term_eq(data)))
        .unwrap();

    for slot in 0..2 {
        monitor.update_prop(slot, req, 0, false).unwrap();
        monitor
            .update_term(slot, data, 0, Value::from(vec![1, 2]))
            .unwrap();
    }
    monitor.step(0).unwrap();
    monitor.step(10).unwrap();
    assert!(monitor.verdict("same-data").unwrap().holds);

    monitor
        .update_term(1, data, 11, Value::from(vec![1, 3]))
        .unwrap();
    monitor.step(11).unwrap();
    let verdict = monitor.verdict("same-data").unwrap();
    assert!(!verdict.holds);
    assert_eq!(verdict.horizon, 11);
}

#[test]
fn snapshots_are_isolated_from_later_writes() {
    let (registry, req, _, _) = handshake();
    let mut monitor = Monitor::new(registry, 1);
    monitor.update_prop(0, req, 0, true).unwrap();
    monitor.step(0).unwrap();
    let snapshot = monitor.assignment();

    monitor.update_prop(0, req, 1, false).unwrap();
    monitor.step(1).unwrap();

    assert_eq!(snapshot.horizon(), 0);
    assert_eq!(monitor.assignment().horizon(), 1);
    assert!(!monitor.assignment().prop_at(0, req, 1).unwrap());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn stepped_cycles_are_final() {
    let (registry, req, _, _) = handshake();
    let mut monitor = Monitor::new(registry, 1);
    monitor.update_prop(0, req, 0, true).unwrap();
    monitor.step(3).unwrap();

    let err = monitor.update_prop(0, req, 3, false).unwrap_err();
    assert!(err.is_ordering());
    assert!(monitor.step(2).unwrap_err().is_ordering());
    monitor.update_prop(0, req, 4, false).unwrap();
}

#[test]
fn bad_writes_are_reported() {
    let (registry, req, _, data) = handshake();
    let mut monitor = Monitor::new(registry, 2);

    assert!(monitor.update_prop(2, req, 0, true).unwrap_err().is_index());
    assert!(monitor
        .update_prop(0, PropId::new(7), 0, true)
        .unwrap_err()
        .is_index());
    assert!(monitor
        .update_term(0, data, 0, Value::from(4))
        .unwrap_err()
        .is_type_mismatch());
}

#[test]
fn step_reading_unwritten_signal_changes_nothing() {
    let (registry, req, ack, _) = handshake();
    let mut monitor = Monitor::new(registry, 1);
    monitor
        .add_property("acked", &Formula::prop(ack, 0))
        .unwrap();
    monitor.update_prop(0, req, 0, true).unwrap();

    let err = monitor.step(0).unwrap_err();
    assert!(err.to_string().contains("no value recorded"));
    let source = err.context.and_then(|c| c.source);
    assert_eq!(source.as_deref(), Some("property 'acked'"));
    assert_eq!(monitor.horizon(), None);

    monitor.update_prop(0, ack, 0, true).unwrap();
    assert!(monitor.step(0).unwrap()[0].1.holds);
}

#[test]
fn step_rejects_term_kinds_that_differ_between_traces() {
    let data = VarId::new(0);
    let mut monitor = Monitor::from_traces(
        VarRegistry::new(),
        [TraceStore::new(0, 1), TraceStore::new(0, 1)],
        MonitorConfig::new().with_registry_required(false),
    );
    monitor
        .add_property("same-data", &Formula::always_future(Formula::term_eq(data)))
        .unwrap();

    monitor.update_term(0, data, 0, Value::from(7)).unwrap();
    monitor.update_term(1, data, 0, Value::from(vec![7])).unwrap();

    assert!(monitor.step(0).unwrap_err().is_type_mismatch());
    assert_eq!(monitor.horizon(), None);
    assert_eq!(monitor.verdict("same-data"), None);
}

#[test]
fn property_validation() {
    let (registry, req, _, _) = handshake();
    let mut monitor = Monitor::new(registry, 2);

    monitor.add_property("p", &Formula::prop(req, 1)).unwrap();
    let dup = monitor.add_property("p", &Formula::prop(req, 0)).unwrap_err();
    assert!(dup.to_string().contains("already defined"));

    let unbound = monitor
        .add_property("q", &Formula::prop(req, 2))
        .unwrap_err();
    assert!(unbound.is_configuration());

    let undeclared = monitor
        .add_property("r", &Formula::term_eq(VarId::new(3)))
        .unwrap_err();
    assert!(undeclared.is_configuration());

    assert_eq!(monitor.property_names().collect::<Vec<_>>(), vec!["p"]);
}

#[test]
fn closing_ends_the_session() {
    let (registry, req, _, _) = handshake();
    let mut monitor = Monitor::new(registry, 1);
    monitor.add_property("req", &Formula::prop(req, 0)).unwrap();
    monitor.update_prop(0, req, 0, true).unwrap();
    monitor.close().unwrap();

    assert!(monitor.is_closed());
    let closed = |e: hyperwatch_foundation::Error| matches!(e.kind, ErrorKind::SessionClosed);
    assert!(closed(monitor.close().unwrap_err()));
    assert!(closed(monitor.step(1).unwrap_err()));
    assert!(closed(monitor.update_prop(0, req, 1, true).unwrap_err()));
    assert!(closed(
        monitor
            .add_property("late", &Formula::prop(req, 0))
            .unwrap_err()
    ));
}

// =============================================================================
// Tracing
// =============================================================================

#[test]
fn tracer_records_the_session() {
    let (registry, req, _, _) = handshake();
    let config = MonitorConfig::new().with_tracer(TracerConfig::new().enabled());
    let mut monitor = Monitor::with_config(registry, 1, config);
    monitor
        .add_property("always-req", &Formula::always_future(Formula::prop(req, 0)))
        .unwrap();

    monitor.update_prop(0, req, 0, true).unwrap();
    monitor.step(0).unwrap();
    monitor.update_prop(0, req, 1, false).unwrap();
    monitor.step(1).unwrap();

    let buffer = monitor.tracer().buffer();
    assert_eq!(buffer.by_event_type("cycle-start").count(), 2);
    assert_eq!(buffer.by_event_type("trace-updated").count(), 2);
    assert_eq!(buffer.by_event_type("provisional-invalidated").count(), 1);

    let added: Vec<_> = buffer.by_event_type("property-added").collect();
    assert!(matches!(
        &added[0].event,
        TraceEvent::PropertyAdded { formula, .. } if formula == "(G+ req.0)"
    ));

    let changes: Vec<bool> = buffer
        .for_property("always-req")
        .filter_map(|r| match r.event {
            TraceEvent::VerdictChanged { holds, .. } => Some(holds),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![true, false]);
}

#[test]
fn filtered_tracer_keeps_only_selected_events() {
    let (registry, req, _, _) = handshake();
    let tracer = TracerConfig::new()
        .enabled()
        .filter_events(["verdict-changed"]);
    let mut monitor = Monitor::with_config(registry, 1, MonitorConfig::new().with_tracer(tracer));
    monitor.add_property("req", &Formula::prop(req, 0)).unwrap();
    monitor.update_prop(0, req, 0, true).unwrap();
    monitor.step(0).unwrap();

    let buffer = monitor.tracer().buffer();
    assert_eq!(buffer.len(), 1);
    assert!(buffer.iter().all(|r| r.event.event_type() == "verdict-changed"));
}
