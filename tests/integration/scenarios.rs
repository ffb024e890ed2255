//! End-to-end verification scenarios, each checked in batch and streaming
//! mode.

use hyperwatch::engine::{
    BatchEvaluator, FormulaPlan, IncrementalEvaluator, TraceAssignment, evaluate_batch,
};
use hyperwatch::foundation::{PropId, Value, ValueKind, VarId, VarRegistry};
use hyperwatch::language::{Formula, FormulaRef, render_with_registry};
use hyperwatch::runtime::{Monitor, MonitorConfig};

fn term_registry() -> (VarRegistry, VarId) {
    let mut registry = VarRegistry::new();
    let x = registry.add_term("x", ValueKind::Scalar).unwrap();
    (registry, x)
}

fn prop_registry() -> (VarRegistry, PropId) {
    let mut registry = VarRegistry::new();
    let x = registry.add_prop("x");
    (registry, x)
}

/// Streams two scalar columns through a monitor and returns it closed,
/// with the final verdict of `formula`.
fn monitor_terms(
    registry: VarRegistry,
    x: VarId,
    formula: &FormulaRef,
    columns: [&[u32]; 2],
) -> (Monitor, bool) {
    let mut monitor = Monitor::with_config(registry, 2, MonitorConfig::strict());
    monitor.add_property("property", formula).unwrap();
    for cycle in 0..columns[0].len() {
        for (slot, column) in columns.iter().enumerate() {
            monitor
                .update_term(slot, x, cycle as u32, Value::from(column[cycle]))
                .unwrap();
        }
        monitor.step(cycle as u32).unwrap();
    }
    let verdicts = monitor.close().unwrap();
    let holds = verdicts[0].1.holds;
    (monitor, holds)
}

// =============================================================================
// G+ (EQ x)
// =============================================================================

#[test]
fn equal_terms_for_thirty_cycles() {
    let (registry, x) = term_registry();
    let formula = Formula::always_future(Formula::term_eq(x));
    assert_eq!(render_with_registry(&formula, &registry), "(G+ (EQ x))");

    let values: Vec<u32> = (0..30).map(|c| c * 3).collect();
    let (monitor, holds) = monitor_terms(registry, x, &formula, [&values, &values]);

    assert!(holds);
    assert!(evaluate_batch(&formula, &monitor.assignment()).unwrap());
    assert_eq!(monitor.horizon(), Some(29));
}

#[test]
fn flip_on_second_trace_at_cycle_fifteen() {
    let (registry, x) = term_registry();
    let formula = Formula::always_future(Formula::term_eq(x));

    let first: Vec<u32> = (0..30).map(|c| c * 3).collect();
    let mut second = first.clone();
    second[15] += 1;

    let (monitor, holds) = monitor_terms(registry, x, &formula, [&first, &second]);
    assert!(!holds);
    assert!(!evaluate_batch(&formula, &monitor.assignment()).unwrap());
}

#[test]
fn flip_is_seen_the_cycle_it_happens() {
    let (registry, x) = term_registry();
    let formula = Formula::always_future(Formula::term_eq(x));
    let mut monitor = Monitor::new(registry, 2);
    monitor.add_property("same-x", &formula).unwrap();

    for cycle in 0..30u32 {
        let flipped = if cycle == 15 { 1 } else { 0 };
        monitor.update_term(0, x, cycle, Value::from(0)).unwrap();
        monitor
            .update_term(1, x, cycle, Value::from(flipped))
            .unwrap();
        let verdict = monitor.step(cycle).unwrap()[0].1;
        assert_eq!(verdict.holds, cycle < 15, "verdict at cycle {cycle}");
        assert!(verdict.provisional);
    }
}

// =============================================================================
// G+ (IMPLIES x.0 x.1)
// =============================================================================

fn implication(x: PropId) -> FormulaRef {
    Formula::always_future(Formula::implies(Formula::prop(x, 0), Formula::prop(x, 1)))
}

fn monitor_props(columns: [&[bool]; 2]) -> (bool, bool) {
    let (registry, x) = prop_registry();
    let formula = implication(x);
    assert_eq!(
        render_with_registry(&formula, &registry),
        "(G+ (IMPLIES x.0 x.1))"
    );

    let mut monitor = Monitor::with_config(registry, 2, MonitorConfig::strict());
    monitor.add_property("implies", &formula).unwrap();
    for cycle in 0..columns[0].len() {
        for (slot, column) in columns.iter().enumerate() {
            monitor
                .update_prop(slot, x, cycle as u32, column[cycle])
                .unwrap();
        }
        monitor.step(cycle as u32).unwrap();
    }
    let streamed = monitor.close().unwrap()[0].1.holds;
    let batch = evaluate_batch(&formula, &monitor.assignment()).unwrap();
    (streamed, batch)
}

#[test]
fn implication_holds_every_cycle() {
    let antecedent: Vec<bool> = (0..40).map(|c| c % 3 == 0).collect();
    let consequent: Vec<bool> = (0..40).map(|c| c % 3 == 0 || c % 5 == 0).collect();
    assert_eq!(monitor_props([&antecedent, &consequent]), (true, true));
}

#[test]
fn one_violating_cycle_fails_the_implication() {
    let antecedent: Vec<bool> = (0..40).map(|c| c % 3 == 0).collect();
    let mut consequent = antecedent.clone();
    consequent[27] = false;
    assert_eq!(monitor_props([&antecedent, &consequent]), (false, false));
}

// =============================================================================
// F- (EQ x)
// =============================================================================

#[test]
fn once_equal_from_cycle_ten() {
    let x = VarId::new(0);
    let mut a = hyperwatch::storage::TraceStore::new(0, 1);
    let mut b = hyperwatch::storage::TraceStore::new(0, 1);
    for cycle in 0..25u32 {
        a.update_term(x, cycle, Value::from(cycle)).unwrap();
        let other = if cycle == 10 { cycle } else { cycle + 100 };
        b.update_term(x, cycle, Value::from(other)).unwrap();
    }
    let assignment = TraceAssignment::from_stores([a, b]);

    let formula = Formula::once_past(Formula::term_eq(x));
    let plan = FormulaPlan::prepare(&formula, &assignment, None).unwrap();
    let root = plan.root();

    let batch = BatchEvaluator::new(&plan).evaluate_table(&assignment).unwrap();
    let mut streaming = IncrementalEvaluator::new(plan.clone());
    for cycle in 0..25u32 {
        streaming.advance(&assignment, cycle).unwrap();
        let expected = cycle >= 10;
        assert_eq!(batch.value(root, cycle), Some(expected), "batch at {cycle}");
        assert_eq!(streaming.value_at(root, cycle), Some(expected), "stream at {cycle}");
    }

    // The verdict reads cycle 0, before the values ever matched.
    assert!(!evaluate_batch(&formula, &assignment).unwrap());
}
