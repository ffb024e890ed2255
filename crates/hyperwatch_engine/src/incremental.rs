//! Cycle-by-cycle evaluation.
//!
//! The incremental evaluator keeps the same per-node tables as batch
//! evaluation and extends them one cycle at a time. When cycle `n`
//! arrives every node gains a cell at `n`; earlier cells are revisited
//! only where a future operator's value can change:
//!
//! - `X+` at `n - 1` now sees its operand at `n`;
//! - `G+` is re-swept backward from `n` until a cell keeps its value
//!   below the lowest changed operand cell.
//!
//! Each node reports the lowest cycle whose value changed, and the nodes
//! reading it recompute from there. Formulas without future operators
//! never revisit old cells.
//!
//! Cycles already processed are assumed final: the traces must not
//! receive writes at or before the last advanced cycle. Extending every
//! trace to a cycle before advancing to it guarantees this.

use hyperwatch_foundation::{Cycle, Error, ErrorKind, Result, SignalRef, VarRegistry};
use hyperwatch_language::FormulaRef;
use log::{debug, trace};

use crate::assignment::TraceAssignment;
use crate::batch::atom_value;
use crate::plan::{FormulaPlan, NodeId, PlanNode};
use crate::table::TruthTables;
use crate::verdict::Verdict;

/// Streaming evaluator for one formula.
#[derive(Clone, Debug)]
pub struct IncrementalEvaluator {
    plan: FormulaPlan,
    tables: TruthTables,
    /// The last processed cycle.
    horizon: Option<Cycle>,
    closed: bool,
    /// Lowest changed cycle per node, reused across steps.
    dirty: Vec<usize>,
}

impl IncrementalEvaluator {
    /// Creates an evaluator for a compiled plan.
    #[must_use]
    pub fn new(plan: FormulaPlan) -> Self {
        let nodes = plan.len();
        Self {
            plan,
            tables: TruthTables::with_nodes(nodes),
            horizon: None,
            closed: false,
            dirty: vec![0; nodes],
        }
    }

    /// Checks `formula` against `assignment` (and `registry`, if given) and
    /// creates an evaluator for it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the formula does not fit the scope.
    pub fn prepare(
        formula: &FormulaRef,
        assignment: &TraceAssignment,
        registry: Option<&VarRegistry>,
    ) -> Result<Self> {
        FormulaPlan::prepare(formula, assignment, registry).map(Self::new)
    }

    /// Processes every cycle up to and including `cycle`.
    ///
    /// Advancing to the last processed cycle again returns the current
    /// verdict. On error nothing changes.
    ///
    /// # Errors
    ///
    /// - `SessionClosed` after [`close`](Self::close);
    /// - `BeyondHorizon` if some trace does not reach `cycle`;
    /// - `Ordering` if `cycle` precedes the last processed cycle;
    /// - index or missing value errors if an atom cannot be read.
    pub fn advance(&mut self, assignment: &TraceAssignment, cycle: Cycle) -> Result<Verdict> {
        let Some(start) = self.first_pending(assignment, cycle)? else {
            return Ok(self.current());
        };

        // Read every atom first so a failed read leaves the tables intact.
        let atoms: Vec<&PlanNode> = self.plan.nodes().iter().filter(|n| n.is_atom()).collect();
        let mut rows = Vec::with_capacity((cycle - start) as usize + 1);
        for n in start..=cycle {
            let row = atoms
                .iter()
                .map(|node| atom_value(node, assignment, n))
                .collect::<Result<Vec<bool>>>()?;
            rows.push(row);
        }

        let before = self.horizon.map(|_| self.current().holds);
        for row in rows {
            let n = self.horizon.map_or(0, |h| h as usize + 1);
            self.step(n, &row);
            self.horizon = Some(self.horizon.map_or(0, |h| h + 1));
        }

        let verdict = self.current();
        trace!("advanced to cycle {cycle}: {verdict}");
        if before.is_some_and(|held| held != verdict.holds) {
            debug!("verdict of {} changed at cycle {cycle}", self.plan.formula());
        }
        Ok(verdict)
    }

    /// Checks that [`advance`](Self::advance) to `cycle` would succeed,
    /// without changing anything.
    ///
    /// # Errors
    ///
    /// Returns the error [`advance`](Self::advance) would report.
    pub fn check_advance(&self, assignment: &TraceAssignment, cycle: Cycle) -> Result<()> {
        let Some(start) = self.first_pending(assignment, cycle)? else {
            return Ok(());
        };
        // Signals are defined from their first write onward and a term's
        // kind is fixed by that write, so an atom readable at `start` is
        // readable at every later cycle.
        for node in self.plan.nodes().iter().filter(|n| n.is_atom()) {
            atom_value(node, assignment, start)?;
        }
        Ok(())
    }

    /// Returns the first cycle an advance to `cycle` must process, or
    /// `None` if `cycle` was the last one processed.
    fn first_pending(&self, assignment: &TraceAssignment, cycle: Cycle) -> Result<Option<Cycle>> {
        if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        let available = assignment.horizon();
        if cycle > available {
            return Err(Error::beyond_horizon(cycle, available));
        }
        match self.horizon {
            Some(last) if cycle < last => Err(Error::ordering(SignalRef::Horizon, cycle, Some(last))),
            Some(last) if cycle == last => Ok(None),
            Some(last) => Ok(Some(last + 1)),
            None => Ok(Some(0)),
        }
    }

    /// Advances to the assignment's horizon and ends the session. The
    /// returned verdict is final.
    ///
    /// # Errors
    ///
    /// Returns `SessionClosed` if already closed, or any error
    /// [`advance`](Self::advance) reports.
    pub fn close(&mut self, assignment: &TraceAssignment) -> Result<Verdict> {
        let horizon = assignment.horizon();
        if self.horizon.is_none_or(|h| h < horizon) {
            self.advance(assignment, horizon)?;
        } else if self.closed {
            return Err(Error::new(ErrorKind::SessionClosed));
        }
        self.closed = true;
        Ok(self.current())
    }

    /// Returns the verdict at the last processed cycle, if any.
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        self.horizon.map(|_| self.current())
    }

    /// Returns the value of `node` at `cycle`, if processed.
    #[must_use]
    pub fn value_at(&self, node: NodeId, cycle: Cycle) -> Option<bool> {
        self.tables.value(node, cycle)
    }

    /// Returns the last processed cycle.
    #[must_use]
    pub fn horizon(&self) -> Option<Cycle> {
        self.horizon
    }

    /// Returns true once [`close`](Self::close) has succeeded.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the compiled plan.
    #[must_use]
    pub fn plan(&self) -> &FormulaPlan {
        &self.plan
    }

    /// Returns the tables computed so far.
    #[must_use]
    pub fn tables(&self) -> &TruthTables {
        &self.tables
    }

    fn current(&self) -> Verdict {
        Verdict {
            holds: self.tables.column(self.plan.root())[0],
            horizon: self.horizon.unwrap_or(0),
            provisional: self.plan.has_future() && !self.closed,
        }
    }

    /// Adds cycle `n` to every column. `atoms` holds the atom values at
    /// `n` in plan order.
    fn step(&mut self, n: usize, atoms: &[bool]) {
        let mut atoms = atoms.iter().copied();
        for idx in 0..self.plan.len() {
            let node = self.plan.nodes()[idx];
            let changed = match node {
                PlanNode::Prop { .. } | PlanNode::TermEq(_) => {
                    let value = atoms.next().unwrap_or(false);
                    self.tables.columns_mut()[idx].push(value);
                    n
                }
                PlanNode::Not(a) => {
                    let from = self.dirty[a.index()];
                    self.pointwise(idx, from, n, |t, c| !t[a.index()][c])
                }
                PlanNode::And(a, b) => {
                    let from = self.dirty[a.index()].min(self.dirty[b.index()]);
                    self.pointwise(idx, from, n, |t, c| t[a.index()][c] && t[b.index()][c])
                }
                PlanNode::Or(a, b) => {
                    let from = self.dirty[a.index()].min(self.dirty[b.index()]);
                    self.pointwise(idx, from, n, |t, c| t[a.index()][c] || t[b.index()][c])
                }
                PlanNode::Implies(a, b) => {
                    let from = self.dirty[a.index()].min(self.dirty[b.index()]);
                    self.pointwise(idx, from, n, |t, c| !t[a.index()][c] || t[b.index()][c])
                }
                PlanNode::NextPast(a) => {
                    let from = (self.dirty[a.index()] + 1).min(n);
                    self.pointwise(idx, from, n, |t, c| c > 0 && t[a.index()][c - 1])
                }
                PlanNode::NextFuture(a) => {
                    let from = self.dirty[a.index()].min(n).saturating_sub(1);
                    self.pointwise(idx, from, n, |t, c| c < n && t[a.index()][c + 1])
                }
                PlanNode::OncePast(a) => self.once_past(idx, a, n),
                PlanNode::AlwaysFuture(a) => self.always_future(idx, a, n),
            };
            self.dirty[idx] = changed;
        }
    }

    /// Recomputes cells `from..=n` of node `idx` with `f`, pushing the cell
    /// at `n`. Returns the lowest cycle whose value changed.
    fn pointwise(
        &mut self,
        idx: usize,
        from: usize,
        n: usize,
        f: impl Fn(&[Vec<bool>], usize) -> bool,
    ) -> usize {
        let columns = self.tables.columns_mut();
        let mut changed = n;
        for c in from..n {
            let value = f(&*columns, c);
            if columns[idx][c] != value {
                columns[idx][c] = value;
                changed = changed.min(c);
            }
        }
        let value = f(&*columns, n);
        columns[idx].push(value);
        changed
    }

    fn once_past(&mut self, idx: usize, a: NodeId, n: usize) -> usize {
        let from = self.dirty[a.index()];
        let columns = self.tables.columns_mut();
        let mut changed = n;
        let mut acc = from > 0 && columns[idx][from - 1];
        for c in from..n {
            acc = acc || columns[a.index()][c];
            if columns[idx][c] != acc {
                columns[idx][c] = acc;
                changed = changed.min(c);
            }
        }
        acc = acc || columns[a.index()][n];
        columns[idx].push(acc);
        changed
    }

    fn always_future(&mut self, idx: usize, a: NodeId, n: usize) -> usize {
        let child_dirty = self.dirty[a.index()];
        let columns = self.tables.columns_mut();
        let mut acc = columns[a.index()][n];
        columns[idx].push(acc);

        let mut changed = n;
        for c in (0..n).rev() {
            acc = acc && columns[a.index()][c];
            if columns[idx][c] == acc {
                if c <= child_dirty {
                    break;
                }
                continue;
            }
            columns[idx][c] = acc;
            changed = c;
        }
        changed
    }
}

/// Checks `formula` against `assignment` and streams every cycle up to and
/// including `cycle` through a fresh [`IncrementalEvaluator`].
///
/// The verdict is the one a streaming driver would see after advancing to
/// `cycle`, so it is provisional if the formula looks into the future. Use
/// [`IncrementalEvaluator::close`] for a final verdict.
///
/// # Errors
///
/// Returns a configuration error if the formula does not fit the
/// assignment, `BeyondHorizon` if some trace does not reach `cycle`, or an
/// index, missing value or type mismatch error if an atom cannot be read.
pub fn eval_incremental(
    formula: &FormulaRef,
    assignment: &TraceAssignment,
    cycle: Cycle,
) -> Result<Verdict> {
    let mut evaluator = IncrementalEvaluator::prepare(formula, assignment, None)?;
    for n in 0..=cycle {
        evaluator.advance(assignment, n)?;
    }
    Ok(evaluator.current())
}
