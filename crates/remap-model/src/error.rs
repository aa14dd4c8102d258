use thiserror::Error;

/// Errors raised when converting between typed values and [`crate::Value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value has a different kind than the target type expects.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: &'static str,
    },

    /// A record is missing a field the target shape declares.
    #[error("record for '{shape}' is missing field '{field}'")]
    MissingField { shape: String, field: String },

    /// An enum value names a variant the target enum does not have.
    #[error("'{variant}' is not a variant of '{enum_name}'")]
    UnknownVariant { enum_name: String, variant: String },

    /// An integer does not fit the target integer type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },
}

impl ValueError {
    pub fn mismatch(expected: impl Into<String>, found: &'static str) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, ValueError>;
