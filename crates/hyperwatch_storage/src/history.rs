//! Change-point encoded signal histories.
//!
//! A history stores only the cycles at which a signal's value changed.
//! Entries are strictly increasing by cycle and no two consecutive entries
//! hold equal values, so storage grows with the number of distinct value
//! changes rather than with trace length.

use hyperwatch_foundation::Cycle;
use im::Vector;
use thiserror::Error;

/// A reason a list of change points cannot form a [`History`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PointsDefect {
    /// The first change point is not at cycle 0.
    #[error("first change point is at cycle {0}, expected 0")]
    FirstNotZero(Cycle),
    /// Cycles are not strictly increasing.
    #[error("change point at cycle {next} does not follow cycle {prev}")]
    NotIncreasing {
        /// The earlier cycle.
        prev: Cycle,
        /// The offending cycle.
        next: Cycle,
    },
    /// A change point repeats the previous value.
    #[error("change point at cycle {0} repeats the previous value")]
    Redundant(Cycle),
    /// A change point lies past the trace's last cycle.
    #[error("change point at cycle {cycle} is past the last cycle {last_cycle}")]
    BeyondLastCycle {
        /// The offending cycle.
        cycle: Cycle,
        /// The trace's last cycle.
        last_cycle: Cycle,
    },
}

/// The change-point history of a single signal.
///
/// Backed by a persistent vector, so cloning a history (and therefore a
/// whole trace) shares storage with the original.
#[derive(Clone, Debug)]
pub struct History<T: Clone> {
    /// `(cycle, value)` change points, strictly increasing by cycle.
    points: Vector<(Cycle, T)>,
    /// The last cycle a write was accepted for, stored or not.
    last_written: Option<Cycle>,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self {
            points: Vector::new(),
            last_written: None,
        }
    }
}

impl<T: Clone + PartialEq> History<T> {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from already-compacted change points.
    ///
    /// # Errors
    ///
    /// Returns the first defect found if the points violate the
    /// change-point invariants.
    pub fn from_points(points: Vec<(Cycle, T)>) -> Result<Self, PointsDefect> {
        let mut prev: Option<&(Cycle, T)> = None;
        for point in &points {
            match prev {
                None if point.0 != 0 => return Err(PointsDefect::FirstNotZero(point.0)),
                Some(p) if point.0 <= p.0 => {
                    return Err(PointsDefect::NotIncreasing {
                        prev: p.0,
                        next: point.0,
                    });
                }
                Some(p) if point.1 == p.1 => return Err(PointsDefect::Redundant(point.0)),
                _ => {}
            }
            prev = Some(point);
        }

        let last_written = points.last().map(|p| p.0);
        Ok(Self {
            points: points.into_iter().collect(),
            last_written,
        })
    }

    /// Returns true if a write at `cycle` respects the ordering contract:
    /// the first write is at cycle 0 and later writes strictly increase.
    #[must_use]
    pub fn accepts(&self, cycle: Cycle) -> bool {
        match self.last_written {
            None => cycle == 0,
            Some(last) => cycle > last,
        }
    }

    /// Records a value written at `cycle`.
    ///
    /// Returns true if a new change point was stored, false if the value
    /// equals the current one and the write was compacted away. Callers
    /// check [`accepts`](Self::accepts) first.
    pub fn record(&mut self, cycle: Cycle, value: T) -> bool {
        debug_assert!(self.accepts(cycle), "write at cycle {cycle} out of order");
        self.last_written = Some(cycle);

        if self.points.last().is_some_and(|(_, last)| *last == value) {
            return false;
        }
        self.points.push_back((cycle, value));
        true
    }

    /// Returns the value in effect at `cycle`.
    ///
    /// Returns `None` if `cycle` precedes the first change point.
    #[must_use]
    pub fn value_at(&self, cycle: Cycle) -> Option<&T> {
        let idx = match self.points.binary_search_by(|(c, _)| c.cmp(&cycle)) {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        self.points.get(idx).map(|(_, v)| v)
    }

    /// Returns the cycle of the last accepted write.
    #[must_use]
    pub fn last_written(&self) -> Option<Cycle> {
        self.last_written
    }

    /// Marks writes up to `cycle` as already seen.
    ///
    /// Used when a trace is extended past its last write, and when
    /// restoring a history whose exact last write is unknown. Has no
    /// effect on an empty history.
    pub(crate) fn seal(&mut self, cycle: Cycle) {
        if !self.points.is_empty() {
            self.last_written = Some(self.last_written.map_or(cycle, |c| c.max(cycle)));
        }
    }

    /// Returns the number of stored change points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the cycle of the last stored change point.
    #[must_use]
    pub fn last_change(&self) -> Option<Cycle> {
        self.points.last().map(|(c, _)| *c)
    }

    /// Iterates over the stored change points in cycle order.
    pub fn change_points(&self) -> impl Iterator<Item = &(Cycle, T)> {
        self.points.iter()
    }
}

impl<T: Clone + PartialEq> PartialEq for History<T> {
    /// Histories are equal when their change points are equal.
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}
