//! Read-only formula traversal.
//!
//! [`walk_formula`] visits a formula as a tree: a shared sub-formula is
//! visited once per occurrence.
//!
//! # Example
//!
//! ```
//! use hyperwatch_foundation::PropId;
//! use hyperwatch_language::{Formula, FormulaVisitor, walk_formula};
//!
//! struct SlotCollector(Vec<usize>);
//!
//! impl FormulaVisitor for SlotCollector {
//!     fn visit_prop(&mut self, _id: PropId, slot: usize) {
//!         self.0.push(slot);
//!     }
//! }
//!
//! let x = PropId::new(0);
//! let f = Formula::implies(Formula::prop(x, 0), Formula::prop(x, 1));
//! let mut slots = SlotCollector(Vec::new());
//! walk_formula(&mut slots, &f);
//! assert_eq!(slots.0, vec![0, 1]);
//! ```

use hyperwatch_foundation::{PropId, VarId};

use crate::formula::Formula;

/// Trait for read-only formula visitors.
///
/// Implement the methods of interest; the defaults do nothing.
#[allow(unused_variables)]
pub trait FormulaVisitor {
    /// Called when entering any node, before its children.
    fn enter_node(&mut self, formula: &Formula) {}

    /// Called when leaving any node, after its children.
    fn leave_node(&mut self, formula: &Formula) {}

    /// Visit a proposition atom.
    fn visit_prop(&mut self, id: PropId, slot: usize) {}

    /// Visit a term-equality atom.
    fn visit_term_eq(&mut self, id: VarId) {}
}

/// Walks `formula` depth-first, left to right.
pub fn walk_formula<V: FormulaVisitor + ?Sized>(visitor: &mut V, formula: &Formula) {
    visitor.enter_node(formula);
    match formula {
        Formula::Prop { id, slot } => visitor.visit_prop(*id, *slot),
        Formula::TermEq(id) => visitor.visit_term_eq(*id),
        _ => {
            for child in formula.children() {
                walk_formula(visitor, child);
            }
        }
    }
    visitor.leave_node(formula);
}

/// Summary statistics of a formula tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormulaStats {
    /// Number of nodes, counting shared sub-formulas per occurrence.
    pub node_count: usize,
    /// Number of proposition atoms.
    pub prop_count: usize,
    /// Number of term-equality atoms.
    pub term_eq_count: usize,
    /// Deepest nesting of temporal operators.
    pub temporal_depth: usize,
    /// Whether an `X+` or `G+` occurs.
    pub has_future: bool,
    /// Whether an `X-` or `F-` occurs.
    pub has_past: bool,
    /// Highest slot read by a proposition atom.
    pub max_slot: Option<usize>,
}

impl FormulaStats {
    /// Collects statistics for `formula`.
    #[must_use]
    pub fn of(formula: &Formula) -> Self {
        let mut collector = StatsCollector::default();
        walk_formula(&mut collector, formula);
        collector.stats
    }
}

#[derive(Default)]
struct StatsCollector {
    stats: FormulaStats,
    depth: usize,
}

impl FormulaVisitor for StatsCollector {
    fn enter_node(&mut self, formula: &Formula) {
        self.stats.node_count += 1;
        if formula.is_future_operator() {
            self.stats.has_future = true;
        }
        if formula.is_past_operator() {
            self.stats.has_past = true;
        }
        if formula.is_future_operator() || formula.is_past_operator() {
            self.depth += 1;
            self.stats.temporal_depth = self.stats.temporal_depth.max(self.depth);
        }
    }

    fn leave_node(&mut self, formula: &Formula) {
        if formula.is_future_operator() || formula.is_past_operator() {
            self.depth -= 1;
        }
    }

    fn visit_prop(&mut self, _id: PropId, slot: usize) {
        self.stats.prop_count += 1;
        self.stats.max_slot = Some(self.stats.max_slot.map_or(slot, |m| m.max(slot)));
    }

    fn visit_term_eq(&mut self, _id: VarId) {
        self.stats.term_eq_count += 1;
    }
}
