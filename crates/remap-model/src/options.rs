//! Configuration options for the mapper.

use serde::{Deserialize, Serialize};

/// What the compiler does with a destination field whose source field has a
/// different type that no converter, mapping or nested compilation resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnresolvedFieldPolicy {
    /// Leave the field at its default value.
    #[default]
    Skip,
    /// Fail the compilation with an invalid property mapping error.
    Strict,
}

/// Options controlling mapping registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperOptions {
    /// Handling of fields that cannot be resolved.
    pub unresolved_fields: UnresolvedFieldPolicy,

    /// Destination name suffixes matched by convention-based scanning
    /// (`Order` -> `OrderDto`).
    pub scan_suffixes: Vec<String>,
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self {
            unresolved_fields: UnresolvedFieldPolicy::Skip,
            scan_suffixes: vec!["Dto".to_string(), "ViewModel".to_string(), "Vm".to_string()],
        }
    }
}

impl MapperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reject unresolved fields at registration time.
    pub fn strict() -> Self {
        Self {
            unresolved_fields: UnresolvedFieldPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn with_unresolved_fields(mut self, policy: UnresolvedFieldPolicy) -> Self {
        self.unresolved_fields = policy;
        self
    }

    pub fn with_scan_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scan_suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_strict(&self) -> bool {
        self.unresolved_fields == UnresolvedFieldPolicy::Strict
    }
}
