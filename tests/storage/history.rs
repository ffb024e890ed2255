//! Integration tests for change-point histories

use hyperwatch_storage::{History, PointsDefect};

// =============================================================================
// Recording
// =============================================================================

#[test]
fn stores_only_value_changes() {
    let mut h = History::new();
    for (cycle, value) in [(0, 1u32), (1, 1), (2, 1), (3, 2), (4, 2), (5, 1)] {
        assert!(h.accepts(cycle));
        h.record(cycle, value);
    }

    let points: Vec<(u32, u32)> = h.change_points().copied().collect();
    assert_eq!(points, vec![(0, 1), (3, 2), (5, 1)]);
    assert_eq!(h.last_written(), Some(5));
    assert_eq!(h.last_change(), Some(5));
}

#[test]
fn record_reports_whether_a_point_was_stored() {
    let mut h = History::new();
    assert!(h.record(0, true));
    assert!(!h.record(1, true));
    assert!(h.record(2, false));
    assert_eq!(h.len(), 2);
}

#[test]
fn ordering_contract() {
    let mut h: History<u32> = History::new();
    assert!(!h.accepts(1));
    assert!(h.accepts(0));
    h.record(0, 9);
    assert!(!h.accepts(0));
    assert!(h.accepts(1));
    assert!(h.accepts(100));
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn value_holds_between_change_points() {
    let mut h = History::new();
    h.record(0, 10u32);
    h.record(4, 20);
    h.record(9, 30);

    assert_eq!(h.value_at(0), Some(&10));
    assert_eq!(h.value_at(3), Some(&10));
    assert_eq!(h.value_at(4), Some(&20));
    assert_eq!(h.value_at(8), Some(&20));
    assert_eq!(h.value_at(9), Some(&30));
    assert_eq!(h.value_at(1_000), Some(&30));
}

#[test]
fn empty_history_has_no_values() {
    let h: History<bool> = History::new();
    assert!(h.is_empty());
    assert_eq!(h.value_at(0), None);
    assert_eq!(h.last_written(), None);
    assert_eq!(h.last_change(), None);
}

// =============================================================================
// Restoring
// =============================================================================

#[test]
fn from_points_accepts_compacted_points() {
    let h = History::from_points(vec![(0, false), (7, true), (8, false)]).unwrap();
    assert_eq!(h.len(), 3);
    assert_eq!(h.value_at(7), Some(&true));
    assert_eq!(h.last_written(), Some(8));
    assert!(h.accepts(9));
}

#[test]
fn from_points_reports_each_defect() {
    assert_eq!(
        History::from_points(vec![(2, 1u32)]).unwrap_err(),
        PointsDefect::FirstNotZero(2)
    );
    assert_eq!(
        History::from_points(vec![(0, 1u32), (5, 2), (5, 3)]).unwrap_err(),
        PointsDefect::NotIncreasing { prev: 5, next: 5 }
    );
    assert_eq!(
        History::from_points(vec![(0, 1u32), (3, 1)]).unwrap_err(),
        PointsDefect::Redundant(3)
    );
}

#[test]
fn defects_describe_themselves() {
    assert_eq!(
        PointsDefect::Redundant(4).to_string(),
        "change point at cycle 4 repeats the previous value"
    );
    assert_eq!(
        PointsDefect::BeyondLastCycle {
            cycle: 9,
            last_cycle: 5
        }
        .to_string(),
        "change point at cycle 9 is past the last cycle 5"
    );
}

#[test]
fn equal_histories_compare_equal() {
    let mut a = History::new();
    a.record(0, 1u32);
    a.record(3, 2);
    let b = History::from_points(vec![(0, 1u32), (3, 2)]).unwrap();
    assert_eq!(a, b);

    let c = History::from_points(vec![(0, 1u32), (4, 2)]).unwrap();
    assert_ne!(a, c);
}

#[test]
fn clones_are_independent() {
    let mut a = History::new();
    a.record(0, 1u32);
    let snapshot = a.clone();
    a.record(1, 2);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.value_at(1), Some(&1));
    assert_eq!(a.value_at(1), Some(&2));
}
