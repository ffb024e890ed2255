//! Value kind descriptors.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The shape of a term value.
///
/// A term variable keeps a single kind for its whole lifetime: the kind is
/// fixed either when the variable is declared or by its first write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValueKind {
    /// A single unsigned integer.
    Scalar,
    /// An ordered sequence of unsigned integers.
    Vector,
}

impl ValueKind {
    /// Returns the kind's one-byte wire tag.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Scalar => 1,
            Self::Vector => 2,
        }
    }

    /// Looks up a kind by its wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Scalar),
            2 => Some(Self::Vector),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector => write!(f, "vector"),
        }
    }
}
