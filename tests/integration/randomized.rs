//! Seeded random traces and formulas: batch and incremental evaluation
//! must agree on every prefix.

use hyperwatch::engine::{
    BatchEvaluator, FormulaPlan, IncrementalEvaluator, TraceAssignment, eval_incremental,
    evaluate_batch,
};
use hyperwatch::foundation::{PropId, Value, VarId};
use hyperwatch::language::{Formula, FormulaRef, FormulaStats};
use hyperwatch::storage::TraceStore;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SLOTS: usize = 3;

fn random_trace(rng: &mut ChaCha8Rng, cycles: u32) -> TraceStore {
    let mut trace = TraceStore::new(2, 1);
    let mut props = [rng.gen_bool(0.5), rng.gen_bool(0.5)];
    let mut term = rng.gen_range(0..3u32);
    for cycle in 0..cycles {
        for (id, value) in props.iter_mut().enumerate() {
            if rng.gen_bool(0.3) {
                *value = !*value;
            }
            trace
                .update_prop(PropId::new(id as u32), cycle, *value)
                .unwrap();
        }
        if rng.gen_bool(0.2) {
            term = rng.gen_range(0..3);
        }
        trace
            .update_term(VarId::new(0), cycle, Value::from(term))
            .unwrap();
    }
    trace
}

fn random_formula(rng: &mut ChaCha8Rng, depth: u32) -> FormulaRef {
    if depth == 0 || rng.gen_bool(0.25) {
        return if rng.gen_bool(0.8) {
            Formula::prop(PropId::new(rng.gen_range(0..2)), rng.gen_range(0..SLOTS))
        } else {
            Formula::term_eq(VarId::new(0))
        };
    }
    let d = depth - 1;
    match rng.gen_range(0..9) {
        0 => Formula::not(random_formula(rng, d)),
        1 => Formula::and(random_formula(rng, d), random_formula(rng, d)),
        2 => Formula::or(random_formula(rng, d), random_formula(rng, d)),
        3 => Formula::implies(random_formula(rng, d), random_formula(rng, d)),
        4 => Formula::next_future(random_formula(rng, d)),
        5 => Formula::next_past(random_formula(rng, d)),
        6 => Formula::always_future(random_formula(rng, d)),
        7 => Formula::once_past(random_formula(rng, d)),
        _ => {
            // Reuse one sub-formula on both sides.
            let shared = random_formula(rng, d);
            Formula::and(Formula::always_future(shared.clone()), Formula::once_past(shared))
        }
    }
}

fn random_case(seed: u64) -> (FormulaRef, TraceAssignment) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cycles = rng.gen_range(1..40);
    let traces: Vec<TraceStore> = (0..SLOTS).map(|_| random_trace(&mut rng, cycles)).collect();
    let formula = random_formula(&mut rng, 5);
    (formula, TraceAssignment::from_stores(traces))
}

#[test]
fn modes_agree_on_every_prefix() {
    for seed in 0..200 {
        let (formula, assignment) = random_case(seed);
        let plan = FormulaPlan::prepare(&formula, &assignment, None).unwrap();
        let batch = BatchEvaluator::new(&plan);
        let mut streaming = IncrementalEvaluator::new(plan.clone());

        for cycle in 0..=assignment.horizon() {
            let verdict = streaming.advance(&assignment, cycle).unwrap();
            let expected = batch.evaluate_table_to(&assignment, cycle).unwrap();
            for node in plan.node_ids() {
                assert_eq!(
                    streaming.tables().column(node),
                    expected.column(node),
                    "seed {seed}: {formula} node {} at horizon {cycle}",
                    node.index()
                );
            }
            assert_eq!(verdict.holds, expected.column(plan.root())[0]);
            assert_eq!(
                verdict.provisional,
                FormulaStats::of(&formula).has_future
            );
        }
    }
}

#[test]
fn final_verdicts_agree() {
    for seed in 1_000..1_300 {
        let (formula, assignment) = random_case(seed);
        let streamed = eval_incremental(&formula, &assignment, assignment.horizon()).unwrap();
        let batch = evaluate_batch(&formula, &assignment).unwrap();
        assert_eq!(streamed.holds, batch, "seed {seed}: {formula}");
        assert_eq!(streamed.provisional, FormulaStats::of(&formula).has_future);
        assert_eq!(streamed.horizon, assignment.horizon());
    }
}

#[test]
fn once_past_is_monotone() {
    for seed in 2_000..2_100 {
        let (formula, assignment) = random_case(seed);
        let once = Formula::once_past(formula);
        let plan = FormulaPlan::prepare(&once, &assignment, None).unwrap();
        let tables = BatchEvaluator::new(&plan).evaluate_table(&assignment).unwrap();
        let column = tables.column(plan.root());
        assert!(
            column.windows(2).all(|w| w[0] <= w[1]),
            "seed {seed}: {once} is not monotone"
        );
    }
}

#[test]
fn always_future_of_past_formula_never_recovers() {
    for seed in 3_000..3_300 {
        let (formula, assignment) = random_case(seed);
        if FormulaStats::of(&formula).has_future {
            continue;
        }
        let always = Formula::always_future(formula);
        let plan = FormulaPlan::prepare(&always, &assignment, None).unwrap();
        let batch = BatchEvaluator::new(&plan);

        let mut previous = true;
        for cycle in 0..=assignment.horizon() {
            let tables = batch.evaluate_table_to(&assignment, cycle).unwrap();
            let holds = tables.column(plan.root())[0];
            assert!(previous || !holds, "seed {seed}: {always} recovered at {cycle}");
            previous = holds;
        }
    }
}
