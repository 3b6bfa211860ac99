//! Error types for property-tree operations.

use thiserror::Error;

/// Structured error types for property-tree access.
///
/// The engine treats most data-layer inconsistencies as tolerated (removal of
/// an entry that is already gone is a no-op), so these errors surface only
/// genuine misuse: malformed paths and type mismatches.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    /// A path string could not be parsed.
    #[error("Invalid property path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// No value exists at the addressed location.
    #[error("Property not found: {path}")]
    NotFound { path: String },

    /// The value at the addressed location has a different type.
    #[error("Property type mismatch at '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

impl PropertyError {
    /// Check if this error indicates a missing value.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PropertyError::NotFound { .. })
    }

    /// Check if this error is a type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, PropertyError::TypeMismatch { .. })
    }
}

impl From<PropertyError> for crate::Error {
    fn from(err: PropertyError) -> Self {
        crate::Error::Data(err)
    }
}
