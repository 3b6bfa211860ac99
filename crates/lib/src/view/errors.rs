//! Error types for view composition and occurrence control.

use thiserror::Error;

/// Structured error types for the view layer.
///
/// These surface programmer misuse — out-of-order calls and dangling
/// references. Ordinary validation failures are never errors; they are
/// recorded facts (see [`crate::validation`]). Capacity rejection when
/// adding an occurrence at the maximum is a checked no-op, not an error.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// An operation that depends on laid-out child views was invoked before
    /// `layout()` completed.
    #[error("View '{view}' is not laid out yet")]
    NotLaidOut { view: String },

    /// `layout()` was invoked twice; `update()` is the re-entry point.
    #[error("View '{view}' is already laid out")]
    AlreadyLaidOut { view: String },

    /// No occurrence exists for the given identity or position.
    #[error("Occurrence not found in '{view}': {reference}")]
    OccurrenceNotFound { view: String, reference: String },

    /// No option with the given name exists in the option set.
    #[error("Unknown option '{option}' in option set '{view}'")]
    UnknownOption { view: String, option: String },
}

impl ViewError {
    pub(crate) fn not_laid_out(view: impl Into<String>) -> Self {
        ViewError::NotLaidOut { view: view.into() }
    }

    /// Check if this error is the stale-state (not laid out) condition.
    pub fn is_not_laid_out(&self) -> bool {
        matches!(self, ViewError::NotLaidOut { .. })
    }
}

impl From<ViewError> for crate::Error {
    fn from(err: ViewError) -> Self {
        crate::Error::View(err)
    }
}
