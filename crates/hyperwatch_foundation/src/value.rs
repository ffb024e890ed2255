//! Signal values carried by term variables.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::ValueKind;

/// A term variable's value at one cycle.
///
/// Values are immutable and cheaply cloneable: vectors share their
/// backing storage. Equality is structural, and values of different kinds
/// are never equal.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    /// A single unsigned integer.
    Scalar(u32),
    /// An ordered sequence of unsigned integers.
    Vector(Arc<[u32]>),
}

impl Value {
    /// Returns the kind (tag) of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Vector(_) => ValueKind::Vector,
        }
    }

    /// Returns true if this is a scalar.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns true if this is a vector.
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// Attempts to extract a scalar.
    #[must_use]
    pub const fn as_scalar(&self) -> Option<u32> {
        match self {
            Self::Scalar(n) => Some(*n),
            Self::Vector(_) => None,
        }
    }

    /// Attempts to extract the elements of a vector.
    #[must_use]
    pub fn as_vector(&self) -> Option<&[u32]> {
        match self {
            Self::Vector(v) => Some(v),
            Self::Scalar(_) => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(n) => write!(f, "Scalar({n})"),
            Self::Vector(v) => write!(f, "Vector({v:?})"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(n) => write!(f, "{n}"),
            Self::Vector(v) => {
                write!(f, "[")?;
                for (i, item) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// Convenience From implementations

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Scalar(n)
    }
}

impl From<Vec<u32>> for Value {
    fn from(v: Vec<u32>) -> Self {
        Self::Vector(v.into())
    }
}

impl From<&[u32]> for Value {
    fn from(v: &[u32]) -> Self {
        Self::Vector(v.into())
    }
}
