//! Field rename tables for auto mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps destination field names to the source field they are read from.
///
/// The direction is always destination -> source. A table written for
/// `A -> B` does not apply to `B -> A`; use [`FieldRenames::reversed`] to
/// derive the table for the opposite direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRenames {
    entries: BTreeMap<String, String>,
}

impl FieldRenames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads destination field `destination` from source field `source`.
    pub fn rename(mut self, destination: impl Into<String>, source: impl Into<String>) -> Self {
        self.entries.insert(destination.into(), source.into());
        self
    }

    pub fn source_for(&self, destination: &str) -> Option<&str> {
        self.entries.get(destination).map(String::as_str)
    }

    /// The table for the opposite mapping direction.
    pub fn reversed(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(destination, source)| (source.clone(), destination.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(destination, source)| (destination.as_str(), source.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldRenames {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(destination, source)| (destination.into(), source.into()))
                .collect(),
        }
    }
}
