//! Error types for mapping operations.

use remap_model::{ShapePair, ValueError};
use thiserror::Error;

/// Errors from registering or executing mappings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// No transformation is registered for the requested pair.
    #[error(
        "mapping not found: the mapping from '{source_type}' to '{destination_type}' could not be found; \
         register one with auto_map or add_mapper, or use ensure_map"
    )]
    MappingNotFound {
        source_type: String,
        destination_type: String,
    },

    /// A destination field could not be resolved from its source field.
    ///
    /// Only raised when unresolved fields are configured as strict.
    #[error(
        "could not map field '{field}' of '{shape}' from '{source_type}' to '{destination_type}': \
         no type converter or mapping exists for this pair"
    )]
    InvalidPropertyMapping {
        shape: String,
        field: String,
        source_type: String,
        destination_type: String,
    },

    /// The destination shape has no default instance to fill.
    #[error("'{shape}' cannot be constructed: it has no default instance")]
    NotConstructible { shape: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl MapError {
    pub fn not_found(pair: &ShapePair) -> Self {
        Self::MappingNotFound {
            source_type: pair.source.to_string(),
            destination_type: pair.destination.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
