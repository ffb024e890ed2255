//! Compiled formula plans.
//!
//! A [`FormulaPlan`] flattens a formula tree into a node list in which
//! every operand precedes the node that reads it. Sub-formulas shared by
//! `Arc` become a single node, so their truth values are computed once.

use std::collections::HashMap;

use hyperwatch_foundation::{PropId, Result, VarId, VarRegistry};
use hyperwatch_language::{Formula, FormulaRef};
use log::debug;

use crate::assignment::TraceAssignment;

/// Index of a node in a [`FormulaPlan`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the position of this node in the plan.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One operator of a compiled plan, with operands referenced by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanNode {
    /// Proposition of one trace.
    Prop {
        /// The proposition read.
        id: PropId,
        /// The trace slot.
        slot: usize,
    },
    /// Term equality across all traces.
    TermEq(VarId),
    /// Negation.
    Not(NodeId),
    /// Conjunction.
    And(NodeId, NodeId),
    /// Disjunction.
    Or(NodeId, NodeId),
    /// Implication.
    Implies(NodeId, NodeId),
    /// `X+`.
    NextFuture(NodeId),
    /// `X-`.
    NextPast(NodeId),
    /// `G+`.
    AlwaysFuture(NodeId),
    /// `F-`.
    OncePast(NodeId),
}

impl PlanNode {
    /// Returns true for `Prop` and `TermEq`.
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Self::Prop { .. } | Self::TermEq(_))
    }

    /// Returns true for nodes whose value depends on later cycles.
    #[must_use]
    pub const fn is_future(&self) -> bool {
        matches!(self, Self::NextFuture(_) | Self::AlwaysFuture(_))
    }
}

/// A formula compiled for evaluation.
#[derive(Clone, Debug)]
pub struct FormulaPlan {
    formula: FormulaRef,
    nodes: Vec<PlanNode>,
    root: NodeId,
    has_future: bool,
}

impl FormulaPlan {
    /// Compiles `formula` without checking it against any scope.
    ///
    /// # Panics
    ///
    /// Panics if the formula has more than `u32::MAX` distinct nodes.
    #[must_use]
    pub fn compile(formula: &FormulaRef) -> Self {
        let mut compiler = Compiler::default();
        let root = compiler.lower(formula);
        let has_future = compiler.nodes.iter().any(PlanNode::is_future);
        debug!(
            "compiled {} into {} node(s), future operators: {has_future}",
            formula,
            compiler.nodes.len()
        );
        Self {
            formula: FormulaRef::clone(formula),
            nodes: compiler.nodes,
            root,
            has_future,
        }
    }

    /// Checks `formula` against `assignment` (and `registry`, if given),
    /// then compiles it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the formula reads an unbound slot,
    /// refers to an undeclared id, or compares a term whose kind differs
    /// across the scope.
    pub fn prepare(
        formula: &FormulaRef,
        assignment: &TraceAssignment,
        registry: Option<&VarRegistry>,
    ) -> Result<Self> {
        match registry {
            Some(registry) => assignment.scope_with_registry(registry).check(formula)?,
            None => assignment.scope().check(formula)?,
        }
        Ok(Self::compile(formula))
    }

    /// Returns the source formula.
    #[must_use]
    pub fn formula(&self) -> &FormulaRef {
        &self.formula
    }

    /// Returns the nodes, operands first.
    #[must_use]
    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Returns the number of distinct nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the plan has no nodes. A compiled plan always has
    /// at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node at `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &PlanNode {
        &self.nodes[id.index()]
    }

    /// Iterates over every node id, operands first.
    #[allow(clippy::cast_possible_truncation)]
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        // Compilation caps the node count at u32::MAX.
        (0..self.nodes.len()).map(|idx| NodeId(idx as u32))
    }

    /// Returns the root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns true if the formula contains `X+` or `G+`.
    #[must_use]
    pub fn has_future(&self) -> bool {
        self.has_future
    }
}

#[derive(Default)]
struct Compiler {
    nodes: Vec<PlanNode>,
    seen: HashMap<*const Formula, NodeId>,
}

impl Compiler {
    fn lower(&mut self, formula: &FormulaRef) -> NodeId {
        let key = std::sync::Arc::as_ptr(formula);
        if let Some(&id) = self.seen.get(&key) {
            return id;
        }

        let node = match formula.as_ref() {
            Formula::Prop { id, slot } => PlanNode::Prop {
                id: *id,
                slot: *slot,
            },
            Formula::TermEq(id) => PlanNode::TermEq(*id),
            Formula::Not(f) => PlanNode::Not(self.lower(f)),
            Formula::And(a, b) => {
                let a = self.lower(a);
                PlanNode::And(a, self.lower(b))
            }
            Formula::Or(a, b) => {
                let a = self.lower(a);
                PlanNode::Or(a, self.lower(b))
            }
            Formula::Implies(a, b) => {
                let a = self.lower(a);
                PlanNode::Implies(a, self.lower(b))
            }
            Formula::NextFuture(f) => PlanNode::NextFuture(self.lower(f)),
            Formula::NextPast(f) => PlanNode::NextPast(self.lower(f)),
            Formula::AlwaysFuture(f) => PlanNode::AlwaysFuture(self.lower(f)),
            Formula::OncePast(f) => PlanNode::OncePast(self.lower(f)),
        };

        let id = NodeId(u32::try_from(self.nodes.len()).expect("formula too large"));
        self.nodes.push(node);
        self.seen.insert(key, id);
        id
    }
}
