//! Dotted paths addressing locations in a property tree.
//!
//! A [`PropertyPath`] is a sequence of named elements, each optionally
//! carrying an array index: `items[1].text` addresses the `text` property of
//! the second `items` occurrence. The empty path is the absolute root.
//!
//! The engine never stores parent back-references on schema or view nodes;
//! paths are recomputed by passing the ancestor path explicitly down each
//! recursive call. The string form of a path is the common currency shared
//! with validation recordings.

use std::{fmt, str::FromStr};

use super::errors::PropertyError;

/// One element of a [`PropertyPath`]: a name and an optional array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathElement {
    name: String,
    index: Option<usize>,
}

impl PathElement {
    /// Creates an element without an index.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
        }
    }

    /// Creates an element addressing one array entry.
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index: Some(index),
        }
    }

    /// The element's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The element's array index, if any.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Whether `self`, used as a prefix element, covers `other`.
    ///
    /// An un-indexed prefix element covers every index of the same name; an
    /// indexed one covers exactly that index (index 0 also covers the
    /// un-indexed form, since a scalar is the first entry of its array).
    fn covers(&self, other: &PathElement) -> bool {
        if self.name != other.name {
            return false;
        }
        match self.index {
            None => true,
            Some(i) => other.index == Some(i) || (i == 0 && other.index.is_none()),
        }
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An owned path into a property tree.
///
/// # Examples
///
/// ```
/// use formwork::proptree::PropertyPath;
/// use std::str::FromStr;
///
/// let path = PropertyPath::from_str("items[1].text")?;
/// assert_eq!(path.to_string(), "items[1].text");
/// assert_eq!(path.parent().unwrap().to_string(), "items[1]");
///
/// let root = PropertyPath::root();
/// assert!(root.is_root());
/// # Ok::<(), formwork::proptree::PropertyError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PropertyPath {
    elements: Vec<PathElement>,
}

impl PropertyPath {
    /// The absolute root: an empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Whether this path is the absolute root.
    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// The path's elements, outermost first.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// The final element, if the path is not the root.
    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Returns a new path with `name` appended (no index).
    pub fn join(&self, name: impl Into<String>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(PathElement::new(name));
        Self { elements }
    }

    /// Returns a new path with an indexed element appended.
    pub fn join_indexed(&self, name: impl Into<String>, index: usize) -> Self {
        let mut elements = self.elements.clone();
        elements.push(PathElement::indexed(name, index));
        Self { elements }
    }

    /// The parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.elements.is_empty() {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    /// Whether `prefix` covers the leading elements of this path.
    ///
    /// Used for prefix-based retraction of validation facts: retracting
    /// `items[1]` with descendants removes `items[1].text` but leaves
    /// `items[2].text` in place.
    pub fn starts_with(&self, prefix: &PropertyPath) -> bool {
        if prefix.elements.len() > self.elements.len() {
            return false;
        }
        prefix
            .elements
            .iter()
            .zip(&self.elements)
            .all(|(p, e)| p.covers(e))
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for element in &self.elements {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{element}")?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for PropertyPath {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let mut elements = Vec::new();
        for part in s.split('.') {
            if part.is_empty() {
                return Err(PropertyError::InvalidPath {
                    path: s.to_string(),
                    reason: "empty path element".to_string(),
                });
            }
            let element = match part.find('[') {
                Some(open) => {
                    let close = part.rfind(']').filter(|c| *c == part.len() - 1).ok_or_else(
                        || PropertyError::InvalidPath {
                            path: s.to_string(),
                            reason: format!("unterminated index in '{part}'"),
                        },
                    )?;
                    let index: usize = part[open + 1..close].parse().map_err(|_| {
                        PropertyError::InvalidPath {
                            path: s.to_string(),
                            reason: format!("invalid index in '{part}'"),
                        }
                    })?;
                    PathElement::indexed(&part[..open], index)
                }
                None => PathElement::new(part),
            };
            if element.name().is_empty() {
                return Err(PropertyError::InvalidPath {
                    path: s.to_string(),
                    reason: "empty element name".to_string(),
                });
            }
            elements.push(element);
        }
        Ok(Self { elements })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trip() {
        for input in ["items[1].text", "title", "a[0].b[2].c", ""] {
            let path = PropertyPath::from_str(input).unwrap();
            assert_eq!(path.to_string(), input);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(PropertyPath::from_str("a..b").is_err());
        assert!(PropertyPath::from_str("a[x]").is_err());
        assert!(PropertyPath::from_str("a[1").is_err());
        assert!(PropertyPath::from_str("[1]").is_err());
    }

    #[test]
    fn test_join_and_parent() {
        let path = PropertyPath::root().join_indexed("items", 1).join("text");
        assert_eq!(path.to_string(), "items[1].text");
        assert_eq!(path.parent().unwrap().to_string(), "items[1]");
        assert_eq!(path.parent().unwrap().parent().unwrap(), PropertyPath::root());
        assert!(PropertyPath::root().parent().is_none());
    }

    #[test]
    fn test_starts_with() {
        let target = PropertyPath::from_str("items[1].text").unwrap();
        assert!(target.starts_with(&PropertyPath::from_str("items[1]").unwrap()));
        assert!(target.starts_with(&PropertyPath::from_str("items").unwrap()));
        assert!(target.starts_with(&PropertyPath::root()));
        assert!(!target.starts_with(&PropertyPath::from_str("items[2]").unwrap()));
        assert!(!target.starts_with(&PropertyPath::from_str("item").unwrap()));
    }

    #[test]
    fn test_index_zero_covers_unindexed() {
        let target = PropertyPath::from_str("title").unwrap();
        assert!(target.starts_with(&PropertyPath::from_str("title[0]").unwrap()));
        assert!(!target.starts_with(&PropertyPath::from_str("title[1]").unwrap()));
    }
}
