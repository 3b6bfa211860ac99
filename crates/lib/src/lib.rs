//!
//! Formwork: a recursive form composition and validation engine.
//! This library renders editable form structures from a declarative schema
//! and keeps them synchronized with a hierarchical property-tree data store.
//!
//! ## Core Concepts
//!
//! * **Occurrences (`occurrences::Occurrences`)**: the immutable
//!   minimum/maximum cardinality rule every repeatable schema node carries.
//! * **Form items (`schema::FormItem`)**: the tagged-variant schema tree —
//!   leaf inputs, repeatable item sets, selectable option sets, and purely
//!   visual field sets — constructed once and immutable for a session.
//! * **Property tree (`proptree`)**: the hierarchical data store forms bind
//!   to, consumed through named-array, nested-set, and scalar operations
//!   addressed by dotted paths.
//! * **Validation recordings (`validation::ValidationRecording`)**: the
//!   aggregable, path-addressed snapshots of validity that flow bottom-up
//!   through a laid-out form, diffed at every level so listeners hear only
//!   about change.
//! * **Views (`view`)**: the recursive composition layer, the occurrence
//!   controllers enforcing cardinality over repeated blocks, and the
//!   `view::FormView` facade the surrounding application talks to.

pub mod occurrences;
pub mod proptree;
pub mod schema;
pub mod validation;
pub mod view;

/// Re-export the cardinality policy for easier access.
pub use occurrences::Occurrences;
/// Re-export the facade for easier access.
pub use view::FormView;

/// Result type used throughout the Formwork library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Formwork library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured schema-construction errors from the schema module
    #[error(transparent)]
    Schema(schema::SchemaError),

    /// Structured property-tree errors from the proptree module
    #[error(transparent)]
    Data(proptree::PropertyError),

    /// Structured view-layer errors from the view module
    #[error(transparent)]
    View(view::ViewError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Schema(_) => "schema",
            Error::Data(_) => "proptree",
            Error::View(_) => "view",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error is a fatal schema-construction failure.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// Check if this error is the stale-state (not laid out) condition.
    pub fn is_not_laid_out(&self) -> bool {
        match self {
            Error::View(view_err) => view_err.is_not_laid_out(),
            _ => false,
        }
    }

    /// Check if this error indicates a missing property.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Data(data_err) => data_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a data-layer type mismatch.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Data(data_err) => data_err.is_type_error(),
            _ => false,
        }
    }
}

impl From<occurrences::OccurrencesError> for Error {
    fn from(err: occurrences::OccurrencesError) -> Self {
        Error::Schema(schema::SchemaError::InvalidOccurrences(err))
    }
}
