//! Error types for schema construction.
//!
//! Schema errors are fatal: the engine refuses to build a form from a
//! malformed definition rather than silently dropping nodes. Unknown item
//! kinds in particular are a hard error — a definition that names a kind
//! this engine does not implement would otherwise lose data on round-trip.

use thiserror::Error;

use crate::occurrences::OccurrencesError;

/// Structured error types for schema construction.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A form-item wrapper names a kind this engine does not implement.
    #[error("Unknown form item type '{kind}' at '{path}'")]
    UnknownItemType { kind: String, path: String },

    /// Two siblings at the same data level share a name.
    #[error("Duplicate form item name '{name}' at '{path}'")]
    DuplicateName { name: String, path: String },

    /// A form item has an empty name.
    #[error("Empty form item name at '{path}'")]
    EmptyName { path: String },

    /// The schema JSON does not have the expected shape.
    #[error("Malformed form definition: {reason}")]
    Malformed { reason: String },

    /// A node carries invalid occurrence bounds.
    #[error(transparent)]
    InvalidOccurrences(#[from] OccurrencesError),
}

impl SchemaError {
    /// Check if this error is a duplicate-name violation.
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, SchemaError::DuplicateName { .. })
    }

    /// Check if this error is an unknown-item-type violation.
    pub fn is_unknown_item_type(&self) -> bool {
        matches!(self, SchemaError::UnknownItemType { .. })
    }
}

impl From<SchemaError> for crate::Error {
    fn from(err: SchemaError) -> Self {
        crate::Error::Schema(err)
    }
}
