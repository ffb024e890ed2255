//! Evaluation verdicts.

use std::fmt;

use hyperwatch_foundation::Cycle;

/// The outcome of evaluating a formula at cycle 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Verdict {
    /// Whether the formula holds.
    pub holds: bool,
    /// The last cycle taken into account.
    pub horizon: Cycle,
    /// True while a future operator may still change the outcome as the
    /// traces grow.
    pub provisional: bool,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.holds { "holds" } else { "fails" };
        write!(f, "{outcome} at horizon {}", self.horizon)?;
        if self.provisional {
            write!(f, " (provisional)")?;
        }
        Ok(())
    }
}
