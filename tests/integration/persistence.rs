//! Traces recorded by one session, saved, and checked again by another.

use hyperwatch::foundation::{PropId, Value, ValueKind, VarId, VarRegistry};
use hyperwatch::language::Formula;
use hyperwatch::runtime::{Monitor, MonitorConfig, decode, encode, load_from_file, save_to_file};

fn registry() -> (VarRegistry, PropId, VarId) {
    let mut registry = VarRegistry::new();
    let valid = registry.add_prop("valid");
    let bus = registry.add_term("bus", ValueKind::Vector).unwrap();
    (registry, valid, bus)
}

fn record(monitor: &mut Monitor, valid: PropId, bus: VarId) {
    for cycle in 0..64u32 {
        for slot in 0..monitor.arity() {
            let word = if slot == 1 && cycle == 40 { 7 } else { cycle / 8 };
            monitor
                .update_prop(slot, valid, cycle, cycle % 8 == 0)
                .unwrap();
            monitor
                .update_term(slot, bus, cycle, Value::from(vec![word, 0]))
                .unwrap();
        }
        monitor.step(cycle).unwrap();
    }
}

#[test]
fn reloaded_traces_give_the_same_verdicts() {
    let (registry, valid, bus) = registry();
    let same_bus = Formula::always_future(Formula::term_eq(bus));
    let valid_agrees = Formula::always_future(Formula::implies(
        Formula::prop(valid, 0),
        Formula::prop(valid, 1),
    ));

    let mut live = Monitor::with_config(registry.clone(), 2, MonitorConfig::strict());
    live.add_property("same-bus", &same_bus).unwrap();
    live.add_property("valid-agrees", &valid_agrees).unwrap();
    record(&mut live, valid, bus);
    let live_verdicts = live.close().unwrap();

    let dir = std::env::temp_dir();
    let pid = std::process::id();
    let paths: Vec<_> = (0..2)
        .map(|slot| dir.join(format!("hyperwatch-{pid}-session-{slot}.trace")))
        .collect();
    let snapshot = live.assignment();
    for (trace, path) in snapshot.traces().iter().zip(&paths) {
        save_to_file(trace, path).unwrap();
    }

    let loaded: Vec<_> = paths
        .iter()
        .map(|path| load_from_file(path).unwrap())
        .collect();
    for path in &paths {
        let _ = std::fs::remove_file(path);
    }

    let mut replay = Monitor::from_traces(registry, loaded, MonitorConfig::strict());
    replay.add_property("same-bus", &same_bus).unwrap();
    replay.add_property("valid-agrees", &valid_agrees).unwrap();
    let replay_verdicts = replay.close().unwrap();

    assert_eq!(live_verdicts, replay_verdicts);
    assert!(!replay.verdict("same-bus").unwrap().holds);
    assert!(replay.verdict("valid-agrees").unwrap().holds);
    assert_eq!(replay.horizon(), Some(63));
}

#[test]
fn recorded_traces_encode_compactly() {
    let (registry, valid, bus) = registry();
    let mut monitor = Monitor::new(registry, 2);
    record(&mut monitor, valid, bus);

    let snapshot = monitor.assignment();
    let trace = &snapshot.traces()[0];
    let bytes = encode(trace).unwrap();
    assert_eq!(decode(&bytes).unwrap(), **trace);
    // 16 valid toggles and 8 bus words over 64 cycles.
    assert_eq!(trace.change_point_count(), 24);
}

#[test]
fn loaded_traces_keep_streaming() {
    let (registry, valid, bus) = registry();
    let mut monitor = Monitor::new(registry.clone(), 1);
    monitor.update_prop(0, valid, 0, true).unwrap();
    monitor
        .update_term(0, bus, 0, Value::from(vec![1, 2]))
        .unwrap();
    monitor.step(9).unwrap();

    let bytes = encode(&monitor.assignment().traces()[0]).unwrap();
    let restored = decode(&bytes).unwrap();
    let mut resumed = Monitor::from_traces(registry, [restored], MonitorConfig::new());
    resumed
        .add_property("valid-once", &Formula::once_past(Formula::prop(valid, 0)))
        .unwrap();

    // Cycles up to the restored horizon are sealed.
    assert!(resumed.update_prop(0, valid, 9, false).unwrap_err().is_ordering());
    resumed.update_prop(0, valid, 10, false).unwrap();
    let verdicts = resumed.step(10).unwrap();
    assert!(verdicts[0].1.holds);
    assert_eq!(verdicts[0].1.horizon, 10);
}
