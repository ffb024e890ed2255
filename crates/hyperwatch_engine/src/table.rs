//! Per-node, per-cycle truth tables.

use hyperwatch_foundation::Cycle;

use crate::plan::NodeId;

/// The truth value of every plan node at every evaluated cycle.
///
/// Column `i` belongs to the node with index `i`. All columns have the
/// same length: the number of evaluated cycles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TruthTables {
    columns: Vec<Vec<bool>>,
}

impl TruthTables {
    pub(crate) fn from_columns(columns: Vec<Vec<bool>>) -> Self {
        debug_assert!(columns.windows(2).all(|w| w[0].len() == w[1].len()));
        Self { columns }
    }

    pub(crate) fn with_nodes(count: usize) -> Self {
        Self {
            columns: vec![Vec::new(); count],
        }
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Vec<bool>] {
        &mut self.columns
    }

    /// Returns the value of `node` at `cycle`, if both are in range.
    #[must_use]
    pub fn value(&self, node: NodeId, cycle: Cycle) -> Option<bool> {
        self.columns
            .get(node.index())
            .and_then(|col| col.get(cycle as usize))
            .copied()
    }

    /// Returns the column of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not part of the plan these tables belong to.
    #[must_use]
    pub fn column(&self, node: NodeId) -> &[bool] {
        &self.columns[node.index()]
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the number of evaluated cycles.
    #[must_use]
    pub fn cycles(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }
}
