//! Formula trees.
//!
//! A formula is an immutable tree. Nodes are shared through [`FormulaRef`],
//! so a sub-formula used in several places is stored once and can be
//! recognised by pointer identity during compilation.
//!
//! # Example
//!
//! ```
//! use hyperwatch_foundation::{PropId, VarId};
//! use hyperwatch_language::Formula;
//!
//! // G+ (IMPLIES x.0 x.1)
//! let x = PropId::new(0);
//! let f = Formula::always_future(Formula::implies(Formula::prop(x, 0), Formula::prop(x, 1)));
//! assert!(f.has_future());
//! assert_eq!(f.to_string(), "(G+ (IMPLIES p0.0 p0.1))");
//!
//! // F- (EQ y)
//! let g = Formula::once_past(Formula::term_eq(VarId::new(0)));
//! assert!(!g.has_future());
//! ```

use std::fmt;
use std::sync::Arc;

use hyperwatch_foundation::{PropId, VarId};

/// Shared handle to a formula node.
pub type FormulaRef = Arc<Formula>;

/// A hyperproperty formula node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    /// Proposition `id` of the trace bound to `slot`.
    Prop {
        /// The proposition read.
        id: PropId,
        /// The trace slot it is read from.
        slot: usize,
    },
    /// Term variable equal across every trace of the assignment.
    TermEq(VarId),
    /// Negation.
    Not(FormulaRef),
    /// Conjunction.
    And(FormulaRef, FormulaRef),
    /// Disjunction.
    Or(FormulaRef, FormulaRef),
    /// Implication.
    Implies(FormulaRef, FormulaRef),
    /// `X+`: holds at the next cycle, false past the horizon.
    NextFuture(FormulaRef),
    /// `X-`: held at the previous cycle, false at cycle 0.
    NextPast(FormulaRef),
    /// `G+`: holds from this cycle through the horizon.
    AlwaysFuture(FormulaRef),
    /// `F-`: held at some cycle up to and including this one.
    OncePast(FormulaRef),
}

impl Formula {
    /// `Prop(id, slot)`.
    #[must_use]
    pub fn prop(id: PropId, slot: usize) -> FormulaRef {
        Arc::new(Self::Prop { id, slot })
    }

    /// `EQ id`.
    #[must_use]
    pub fn term_eq(id: VarId) -> FormulaRef {
        Arc::new(Self::TermEq(id))
    }

    /// `NOT f`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(f: FormulaRef) -> FormulaRef {
        Arc::new(Self::Not(f))
    }

    /// `AND a b`.
    #[must_use]
    pub fn and(a: FormulaRef, b: FormulaRef) -> FormulaRef {
        Arc::new(Self::And(a, b))
    }

    /// `OR a b`.
    #[must_use]
    pub fn or(a: FormulaRef, b: FormulaRef) -> FormulaRef {
        Arc::new(Self::Or(a, b))
    }

    /// `IMPLIES a b`.
    #[must_use]
    pub fn implies(a: FormulaRef, b: FormulaRef) -> FormulaRef {
        Arc::new(Self::Implies(a, b))
    }

    /// `X+ f`.
    #[must_use]
    pub fn next_future(f: FormulaRef) -> FormulaRef {
        Arc::new(Self::NextFuture(f))
    }

    /// `X- f`.
    #[must_use]
    pub fn next_past(f: FormulaRef) -> FormulaRef {
        Arc::new(Self::NextPast(f))
    }

    /// `G+ f`.
    #[must_use]
    pub fn always_future(f: FormulaRef) -> FormulaRef {
        Arc::new(Self::AlwaysFuture(f))
    }

    /// `F- f`.
    #[must_use]
    pub fn once_past(f: FormulaRef) -> FormulaRef {
        Arc::new(Self::OncePast(f))
    }

    /// Returns the operator name used in s-expression notation.
    ///
    /// Atoms return `"prop"` and `"EQ"`.
    #[must_use]
    pub const fn operator(&self) -> &'static str {
        match self {
            Self::Prop { .. } => "prop",
            Self::TermEq(_) => "EQ",
            Self::Not(_) => "NOT",
            Self::And(..) => "AND",
            Self::Or(..) => "OR",
            Self::Implies(..) => "IMPLIES",
            Self::NextFuture(_) => "X+",
            Self::NextPast(_) => "X-",
            Self::AlwaysFuture(_) => "G+",
            Self::OncePast(_) => "F-",
        }
    }

    /// Iterates over the direct operands of this node.
    pub fn children(&self) -> impl Iterator<Item = &FormulaRef> {
        let operands = match self {
            Self::Prop { .. } | Self::TermEq(_) => [None, None],
            Self::Not(f)
            | Self::NextFuture(f)
            | Self::NextPast(f)
            | Self::AlwaysFuture(f)
            | Self::OncePast(f) => [Some(f), None],
            Self::And(a, b) | Self::Or(a, b) | Self::Implies(a, b) => [Some(a), Some(b)],
        };
        operands.into_iter().flatten()
    }

    /// Returns true for `Prop` and `TermEq`.
    #[must_use]
    pub const fn is_atom(&self) -> bool {
        matches!(self, Self::Prop { .. } | Self::TermEq(_))
    }

    /// Returns true for the future operators `X+` and `G+`.
    #[must_use]
    pub const fn is_future_operator(&self) -> bool {
        matches!(self, Self::NextFuture(_) | Self::AlwaysFuture(_))
    }

    /// Returns true for the past operators `X-` and `F-`.
    #[must_use]
    pub const fn is_past_operator(&self) -> bool {
        matches!(self, Self::NextPast(_) | Self::OncePast(_))
    }

    /// Returns true if any node of this formula is a future operator.
    ///
    /// The value of such a formula at a cycle may change as the horizon
    /// grows.
    #[must_use]
    pub fn has_future(&self) -> bool {
        self.is_future_operator() || self.children().any(|c| c.has_future())
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::pretty::render(self))
    }
}
