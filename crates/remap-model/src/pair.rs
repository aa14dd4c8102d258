//! Source/destination type pairs, the key of every registry entry.

use std::fmt;

use crate::shape::Mappable;
use crate::types::ValueType;

/// Registry key: the (source, destination) type pair of a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapePair {
    pub source: ValueType,
    pub destination: ValueType,
}

impl ShapePair {
    pub fn new(source: ValueType, destination: ValueType) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn of<S: Mappable, D: Mappable>() -> Self {
        Self::new(S::value_type(), D::value_type())
    }

    /// The same pair with source and destination swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.destination.clone(), self.source.clone())
    }

    pub fn is_identity(&self) -> bool {
        self.source == self.destination
    }
}

impl fmt::Display for ShapePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
