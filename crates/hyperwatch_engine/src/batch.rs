//! Full-horizon evaluation.
//!
//! Each plan node's column is computed once, operands first: atoms and
//! connectives pointwise, `G+` in one backward sweep from the horizon, and
//! `F-` in one forward sweep from cycle 0. The cost is linear in the
//! horizon times the number of distinct nodes.

use hyperwatch_foundation::{Cycle, Error, ErrorKind, Result};
use hyperwatch_language::FormulaRef;
use log::trace;

use crate::assignment::TraceAssignment;
use crate::plan::{FormulaPlan, NodeId, PlanNode};
use crate::table::TruthTables;

/// Reads the value of an atom node at `cycle`.
pub(crate) fn atom_value(
    node: &PlanNode,
    assignment: &TraceAssignment,
    cycle: Cycle,
) -> Result<bool> {
    match *node {
        PlanNode::Prop { id, slot } => assignment.prop_at(slot, id, cycle),
        PlanNode::TermEq(id) => assignment.terms_equal(id, cycle),
        _ => Err(Error::new(ErrorKind::Internal(format!(
            "operator node {node:?} read as an atom"
        )))),
    }
}

/// Evaluates a compiled plan over a whole assignment.
#[derive(Clone, Copy, Debug)]
pub struct BatchEvaluator<'p> {
    plan: &'p FormulaPlan,
}

impl<'p> BatchEvaluator<'p> {
    /// Creates an evaluator for `plan`.
    #[must_use]
    pub fn new(plan: &'p FormulaPlan) -> Self {
        Self { plan }
    }

    /// Returns the verdict at the assignment's horizon.
    ///
    /// # Errors
    ///
    /// Returns an index or missing value error if an atom cannot be read.
    pub fn evaluate(&self, assignment: &TraceAssignment) -> Result<bool> {
        let tables = self.evaluate_table(assignment)?;
        Ok(tables.column(self.plan.root())[0])
    }

    /// Computes every node's column up to the assignment's horizon.
    ///
    /// # Errors
    ///
    /// Returns an index or missing value error if an atom cannot be read.
    pub fn evaluate_table(&self, assignment: &TraceAssignment) -> Result<TruthTables> {
        self.evaluate_table_to(assignment, assignment.horizon())
    }

    /// Computes every node's column as if the traces ended at `horizon`.
    ///
    /// # Errors
    ///
    /// Returns a beyond-horizon error if `horizon` exceeds the
    /// assignment's horizon, or an index or missing value error if an atom
    /// cannot be read.
    pub fn evaluate_table_to(
        &self,
        assignment: &TraceAssignment,
        horizon: Cycle,
    ) -> Result<TruthTables> {
        let available = assignment.horizon();
        if horizon > available {
            return Err(Error::beyond_horizon(horizon, available));
        }

        let len = horizon as usize + 1;
        let mut columns: Vec<Vec<bool>> = Vec::with_capacity(self.plan.len());
        for node in self.plan.nodes() {
            let column = if node.is_atom() {
                (0..=horizon)
                    .map(|cycle| atom_value(node, assignment, cycle))
                    .collect::<Result<Vec<_>>>()?
            } else {
                operator_column(node, &columns, len)
            };
            columns.push(column);
        }

        trace!(
            "batch evaluated {} node(s) over {len} cycle(s)",
            columns.len()
        );
        Ok(TruthTables::from_columns(columns))
    }
}

fn operator_column(node: &PlanNode, columns: &[Vec<bool>], len: usize) -> Vec<bool> {
    let col = |id: NodeId| &columns[id.index()];
    match *node {
        PlanNode::Prop { .. } | PlanNode::TermEq(_) => unreachable!("atoms handled by caller"),
        PlanNode::Not(a) => col(a).iter().map(|v| !v).collect(),
        PlanNode::And(a, b) => pointwise(col(a), col(b), |x, y| x && y),
        PlanNode::Or(a, b) => pointwise(col(a), col(b), |x, y| x || y),
        PlanNode::Implies(a, b) => pointwise(col(a), col(b), |x, y| !x || y),
        PlanNode::NextFuture(a) => {
            let child = col(a);
            (0..len).map(|c| c + 1 < len && child[c + 1]).collect()
        }
        PlanNode::NextPast(a) => {
            let child = col(a);
            (0..len).map(|c| c > 0 && child[c - 1]).collect()
        }
        PlanNode::AlwaysFuture(a) => {
            let child = col(a);
            let mut column = vec![false; len];
            let mut acc = true;
            for c in (0..len).rev() {
                acc = acc && child[c];
                column[c] = acc;
            }
            column
        }
        PlanNode::OncePast(a) => {
            let child = col(a);
            let mut acc = false;
            child
                .iter()
                .map(|v| {
                    acc = acc || *v;
                    acc
                })
                .collect()
        }
    }
}

fn pointwise(a: &[bool], b: &[bool], op: impl Fn(bool, bool) -> bool) -> Vec<bool> {
    a.iter().zip(b).map(|(x, y)| op(*x, *y)).collect()
}

/// Checks `formula` against `assignment` and evaluates it at the
/// assignment's horizon.
///
/// # Errors
///
/// Returns a configuration error if the formula does not fit the
/// assignment, or an index or missing value error if an atom cannot be
/// read.
pub fn evaluate_batch(formula: &FormulaRef, assignment: &TraceAssignment) -> Result<bool> {
    let plan = FormulaPlan::prepare(formula, assignment, None)?;
    BatchEvaluator::new(&plan).evaluate(assignment)
}
