//! Aggregable, path-addressed records of form validity.

use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::proptree::PropertyPath;

use super::path::ValidationRecordingPath;

/// A snapshot of which tree locations violate field-level or cardinality
/// rules.
///
/// A recording holds three kinds of facts, each addressed by the string form
/// of a [`ValidationRecordingPath`]:
///
/// - paths whose repeated-occurrence count is below the minimum,
/// - paths whose count exceeds the maximum,
/// - field-level error messages.
///
/// Recordings are the common currency of bottom-up validation: children's
/// recordings are merged into their parent's via [`flatten`], retracted via
/// [`remove_by_path`] when occurrences disappear, and compared for equality
/// to decide whether a validity-changed notification is due. They are
/// recreated on every validation pass and never persisted.
///
/// `is_valid()` holds exactly when all three fact sets are empty.
///
/// [`flatten`]: ValidationRecording::flatten
/// [`remove_by_path`]: ValidationRecording::remove_by_path
#[derive(Debug, Clone, Default)]
pub struct ValidationRecording {
    breaks_minimum: BTreeMap<String, ValidationRecordingPath>,
    breaks_maximum: BTreeMap<String, ValidationRecordingPath>,
    errors: BTreeMap<String, String>,
}

impl ValidationRecording {
    /// Creates an empty (valid) recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no fact of any kind is recorded.
    pub fn is_valid(&self) -> bool {
        self.breaks_minimum.is_empty() && self.breaks_maximum.is_empty() && self.errors.is_empty()
    }

    /// Records that the occurrence count at `path` is below its minimum.
    pub fn breaks_minimum_occurrences(&mut self, path: ValidationRecordingPath) {
        self.breaks_minimum.insert(path.path_string(), path);
    }

    /// Records that the occurrence count at `path` exceeds its maximum.
    pub fn breaks_maximum_occurrences(&mut self, path: ValidationRecordingPath) {
        self.breaks_maximum.insert(path.path_string(), path);
    }

    /// Records a field-level error message at `path`.
    pub fn add_error(&mut self, path: &ValidationRecordingPath, message: impl Into<String>) {
        self.errors.insert(path.path_string(), message.into());
    }

    /// The paths currently breaching their minimum, in path order.
    pub fn minimum_breaches(&self) -> impl Iterator<Item = &ValidationRecordingPath> {
        self.breaks_minimum.values()
    }

    /// The paths currently breaching their maximum, in path order.
    pub fn maximum_breaches(&self) -> impl Iterator<Item = &ValidationRecordingPath> {
        self.breaks_maximum.values()
    }

    /// Field-level errors as `(path, message)` pairs, in path order.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The error message at the given path string, if any.
    pub fn error_at(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// Whether the given path string is recorded as breaching its minimum.
    pub fn breaks_minimum_at(&self, path: &str) -> bool {
        self.breaks_minimum.contains_key(path)
    }

    /// Whether the given path string is recorded as breaching its maximum.
    pub fn breaks_maximum_at(&self, path: &str) -> bool {
        self.breaks_maximum.contains_key(path)
    }

    /// Merges all facts of `other` into this recording (union).
    pub fn flatten(&mut self, other: &ValidationRecording) {
        for (key, path) in &other.breaks_minimum {
            self.breaks_minimum.insert(key.clone(), path.clone());
        }
        for (key, path) in &other.breaks_maximum {
            self.breaks_maximum.insert(key.clone(), path.clone());
        }
        for (key, message) in &other.errors {
            self.errors.insert(key.clone(), message.clone());
        }
    }

    /// Retracts every fact at `path`; with `include_children`, also every
    /// fact underneath it.
    ///
    /// Returns the number of facts removed.
    pub fn remove_by_path(&mut self, path: &PropertyPath, include_children: bool) -> usize {
        let matches = |key: &str| -> bool {
            match PropertyPath::from_str(key) {
                Ok(fact_path) => {
                    fact_path == *path || (include_children && fact_path.starts_with(path))
                }
                // Keys are generated from our own Display; unparseable keys
                // cannot match a structured path.
                Err(_) => false,
            }
        };

        let before =
            self.breaks_minimum.len() + self.breaks_maximum.len() + self.errors.len();
        self.breaks_minimum.retain(|key, _| !matches(key));
        self.breaks_maximum.retain(|key, _| !matches(key));
        self.errors.retain(|key, _| !matches(key));
        before - (self.breaks_minimum.len() + self.breaks_maximum.len() + self.errors.len())
    }

    /// Whether validity state differs from `previous`.
    ///
    /// No previous recording counts as changed: the first validation pass
    /// establishes the baseline and notifies once.
    pub fn validity_changed(&self, previous: Option<&ValidationRecording>) -> bool {
        match previous {
            Some(previous) => self != previous,
            None => true,
        }
    }
}

impl PartialEq for ValidationRecording {
    /// Equality compares the recorded locations and messages; the min/max
    /// metadata carried for rendering does not participate.
    fn eq(&self, other: &Self) -> bool {
        self.breaks_minimum.len() == other.breaks_minimum.len()
            && self
                .breaks_minimum
                .keys()
                .zip(other.breaks_minimum.keys())
                .all(|(a, b)| a == b)
            && self.breaks_maximum.len() == other.breaks_maximum.len()
            && self
                .breaks_maximum
                .keys()
                .zip(other.breaks_maximum.keys())
                .all(|(a, b)| a == b)
            && self.errors == other.errors
    }
}

impl Eq for ValidationRecording {}

impl fmt::Display for ValidationRecording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        let mut parts = Vec::new();
        for key in self.breaks_minimum.keys() {
            parts.push(format!("min[{key}]"));
        }
        for key in self.breaks_maximum.keys() {
            parts.push(format!("max[{key}]"));
        }
        for (key, message) in &self.errors {
            parts.push(format!("err[{key}: {message}]"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ValidationRecordingPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_recording_is_valid() {
        assert!(ValidationRecording::new().is_valid());
    }

    #[test]
    fn test_any_fact_invalidates() {
        let mut min = ValidationRecording::new();
        min.breaks_minimum_occurrences(path("items"));
        assert!(!min.is_valid());

        let mut max = ValidationRecording::new();
        max.breaks_maximum_occurrences(path("items"));
        assert!(!max.is_valid());

        let mut err = ValidationRecording::new();
        err.add_error(&path("title"), "required");
        assert!(!err.is_valid());
    }

    #[test]
    fn test_flatten_unions_facts() {
        let mut a = ValidationRecording::new();
        a.breaks_minimum_occurrences(path("items"));

        let mut b = ValidationRecording::new();
        b.add_error(&path("items[0].text"), "too short");

        a.flatten(&b);
        assert!(a.breaks_minimum_at("items"));
        assert_eq!(a.error_at("items[0].text"), Some("too short"));
    }

    #[test]
    fn test_remove_by_path_exact() {
        let mut recording = ValidationRecording::new();
        recording.add_error(&path("items[1].text"), "bad");
        recording.add_error(&path("items[2].text"), "bad");

        let removed = recording.remove_by_path(&"items[1].text".parse().unwrap(), false);
        assert_eq!(removed, 1);
        assert!(recording.error_at("items[1].text").is_none());
        assert!(recording.error_at("items[2].text").is_some());
    }

    #[test]
    fn test_remove_by_path_with_children() {
        let mut recording = ValidationRecording::new();
        recording.add_error(&path("items[1].text"), "bad");
        recording.add_error(&path("items[1].nested[0].deep"), "bad");
        recording.add_error(&path("items[2].text"), "bad");
        recording.breaks_minimum_occurrences(path("items[1].nested"));

        let removed = recording.remove_by_path(&"items[1]".parse().unwrap(), true);
        assert_eq!(removed, 3);
        assert!(!recording.is_valid());
        assert!(recording.error_at("items[2].text").is_some());
    }

    #[test]
    fn test_equality_ignores_bound_metadata() {
        let mut a = ValidationRecording::new();
        a.breaks_minimum_occurrences(ValidationRecordingPath::with_occurrences(
            None, "items", 1, 3,
        ));
        let mut b = ValidationRecording::new();
        b.breaks_minimum_occurrences(ValidationRecordingPath::new(None, "items"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_validity_changed_baseline() {
        let recording = ValidationRecording::new();
        assert!(recording.validity_changed(None));
        assert!(!recording.validity_changed(Some(&ValidationRecording::new())));

        let mut other = ValidationRecording::new();
        other.add_error(&path("title"), "required");
        assert!(recording.validity_changed(Some(&other)));
    }
}
