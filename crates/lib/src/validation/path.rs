//! Paths addressing validation facts.

use std::{fmt, str::FromStr};

use crate::proptree::{PathElement, PropertyError, PropertyPath};

/// The location of a validation fact: a parent data path plus a local
/// element, optionally carrying the violated occurrence bounds.
///
/// The string form (`parent.name`) is the key under which facts are stored
/// and diffed; it is compatible with [`PropertyPath`]'s string form so that
/// facts can be retracted by data path when occurrences disappear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRecordingPath {
    parent: Option<PropertyPath>,
    element: PathElement,
    min: Option<u32>,
    max: Option<u32>,
}

impl ValidationRecordingPath {
    /// Creates a path without occurrence bounds (field-level facts).
    pub fn new(parent: Option<PropertyPath>, name: impl Into<String>) -> Self {
        Self {
            parent,
            element: PathElement::new(name),
            min: None,
            max: None,
        }
    }

    /// Creates a path whose local element addresses one occurrence.
    pub fn new_indexed(parent: Option<PropertyPath>, name: impl Into<String>, index: usize) -> Self {
        Self {
            parent,
            element: PathElement::indexed(name, index),
            min: None,
            max: None,
        }
    }

    /// Creates an occurrence fact at an existing data path, keeping the
    /// final element (index included) as the local element.
    pub fn occurrences_at(path: &PropertyPath, min: u32, max: u32) -> Option<Self> {
        let element = path.last()?.clone();
        Some(Self {
            parent: path.parent().filter(|p| !p.is_root()),
            element,
            min: Some(min),
            max: Some(max),
        })
    }

    /// Creates a path carrying the violated min/max (occurrence facts).
    pub fn with_occurrences(
        parent: Option<PropertyPath>,
        name: impl Into<String>,
        min: u32,
        max: u32,
    ) -> Self {
        Self {
            parent,
            element: PathElement::new(name),
            min: Some(min),
            max: Some(max),
        }
    }

    /// The parent data path, if the fact is not at the root level.
    pub fn parent(&self) -> Option<&PropertyPath> {
        self.parent.as_ref()
    }

    /// The local name of the violating node.
    pub fn name(&self) -> &str {
        self.element.name()
    }

    /// The violated minimum, when this is an occurrence fact.
    pub fn min(&self) -> Option<u32> {
        self.min
    }

    /// The violated maximum, when this is an occurrence fact.
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// The full data path of the fact.
    pub fn to_property_path(&self) -> PropertyPath {
        let base = self.parent.clone().unwrap_or_default();
        match self.element.index() {
            Some(index) => base.join_indexed(self.element.name(), index),
            None => base.join(self.element.name()),
        }
    }

    /// The string form used as the storage key.
    pub fn path_string(&self) -> String {
        self.to_property_path().to_string()
    }
}

impl fmt::Display for ValidationRecordingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_string())
    }
}

impl FromStr for ValidationRecordingPath {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = PropertyPath::from_str(s)?;
        let element = path
            .last()
            .cloned()
            .ok_or_else(|| PropertyError::InvalidPath {
                path: s.to_string(),
                reason: "validation path cannot be the root".to_string(),
            })?;
        Ok(Self {
            parent: path.parent().filter(|p| !p.is_root()),
            element,
            min: None,
            max: None,
        })
    }
}
