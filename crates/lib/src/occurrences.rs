//! Occurrence policy: the immutable minimum/maximum cardinality rule.
//!
//! Every repeatable node in a form schema carries an [`Occurrences`] value
//! describing how many repetitions of it may exist in the bound data. The
//! policy is a pure value type: all predicates take a candidate count and
//! never consult live state.
//!
//! A `maximum` of `0` is the sentinel for "unbounded", not "zero allowed".
//! Several call sites in the engine special-case it, so the sentinel is part
//! of the wire contract and must round-trip exactly.
//!
//! # Examples
//!
//! ```
//! use formwork::Occurrences;
//!
//! let occurrences = Occurrences::new(1, 3)?;
//! assert!(occurrences.required());
//! assert!(occurrences.multiple());
//! assert!(occurrences.minimum_breached(0));
//! assert!(occurrences.maximum_reached(3));
//!
//! let unbounded = Occurrences::one_or_more();
//! assert!(!unbounded.maximum_reached(1_000));
//! # Ok::<(), formwork::occurrences::OccurrencesError>(())
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for occurrence bound validation.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OccurrencesError {
    /// The minimum exceeds a bounded maximum.
    #[error("Invalid occurrence bounds: minimum {minimum} exceeds maximum {maximum}")]
    MinimumExceedsMaximum { minimum: u32, maximum: u32 },
}

/// Immutable minimum/maximum cardinality rule for a repeatable schema node.
///
/// Invariant: `minimum <= maximum` unless `maximum == 0`, in which case the
/// policy is unbounded. The invariant is enforced both by [`Occurrences::new`]
/// and during deserialization.
///
/// Serializes as `{"minimum": m, "maximum": M}`, the persisted schema shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawOccurrences")]
pub struct Occurrences {
    minimum: u32,
    maximum: u32,
}

/// Unvalidated wire form of [`Occurrences`].
#[derive(Deserialize)]
struct RawOccurrences {
    minimum: u32,
    maximum: u32,
}

impl TryFrom<RawOccurrences> for Occurrences {
    type Error = OccurrencesError;

    fn try_from(raw: RawOccurrences) -> Result<Self, Self::Error> {
        Occurrences::new(raw.minimum, raw.maximum)
    }
}

impl Occurrences {
    /// Creates a new policy, validating the bounds.
    ///
    /// # Errors
    /// Returns [`OccurrencesError::MinimumExceedsMaximum`] when `minimum`
    /// exceeds a non-zero `maximum`.
    pub fn new(minimum: u32, maximum: u32) -> Result<Self, OccurrencesError> {
        if maximum != 0 && minimum > maximum {
            return Err(OccurrencesError::MinimumExceedsMaximum { minimum, maximum });
        }
        Ok(Self { minimum, maximum })
    }

    /// Exactly one: `{1, 1}`.
    pub fn required_one() -> Self {
        Self {
            minimum: 1,
            maximum: 1,
        }
    }

    /// At most one: `{0, 1}`.
    pub fn optional() -> Self {
        Self {
            minimum: 0,
            maximum: 1,
        }
    }

    /// Any number, including none: `{0, unbounded}`.
    pub fn zero_or_more() -> Self {
        Self {
            minimum: 0,
            maximum: 0,
        }
    }

    /// At least one: `{1, unbounded}`.
    pub fn one_or_more() -> Self {
        Self {
            minimum: 1,
            maximum: 0,
        }
    }

    /// The minimum number of occurrences.
    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    /// The maximum number of occurrences. `0` means unbounded.
    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Whether at least one occurrence is required.
    pub fn required(&self) -> bool {
        self.minimum > 0
    }

    /// Whether more than one occurrence may exist.
    pub fn multiple(&self) -> bool {
        self.maximum > 1 || self.maximum == 0
    }

    /// Whether the policy places no upper bound on the count.
    pub fn unbounded(&self) -> bool {
        self.maximum == 0
    }

    /// Whether `count` satisfies the minimum.
    pub fn minimum_reached(&self, count: usize) -> bool {
        count >= self.minimum as usize
    }

    /// Whether `count` falls below the minimum.
    pub fn minimum_breached(&self, count: usize) -> bool {
        count < self.minimum as usize
    }

    /// Whether `count` has reached a bounded maximum. Always false when
    /// unbounded.
    pub fn maximum_reached(&self, count: usize) -> bool {
        self.maximum != 0 && count >= self.maximum as usize
    }

    /// Whether `count` exceeds a bounded maximum. Always false when unbounded.
    pub fn maximum_breached(&self, count: usize) -> bool {
        self.maximum != 0 && count > self.maximum as usize
    }
}

impl Default for Occurrences {
    /// The default input cardinality: optional single value.
    fn default() -> Self {
        Self::optional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_validation() {
        assert!(Occurrences::new(2, 1).is_err());
        assert!(Occurrences::new(1, 1).is_ok());
        // maximum == 0 is unbounded, so any minimum is fine
        assert!(Occurrences::new(5, 0).is_ok());
    }

    #[test]
    fn test_required_and_multiple() {
        assert!(Occurrences::required_one().required());
        assert!(!Occurrences::optional().required());
        assert!(!Occurrences::required_one().multiple());
        assert!(Occurrences::zero_or_more().multiple());
        assert!(Occurrences::new(0, 3).unwrap().multiple());
    }

    #[test]
    fn test_minimum_predicates() {
        let occ = Occurrences::new(2, 4).unwrap();
        assert!(occ.minimum_breached(0));
        assert!(occ.minimum_breached(1));
        assert!(occ.minimum_reached(2));
        assert!(occ.minimum_reached(3));
    }

    #[test]
    fn test_maximum_predicates_bounded() {
        let occ = Occurrences::new(0, 3).unwrap();
        assert!(!occ.maximum_reached(2));
        assert!(occ.maximum_reached(3));
        assert!(occ.maximum_reached(4));
        assert!(!occ.maximum_breached(3));
        assert!(occ.maximum_breached(4));
    }

    #[test]
    fn test_maximum_predicates_unbounded_sentinel() {
        let occ = Occurrences::zero_or_more();
        assert!(!occ.maximum_reached(0));
        assert!(!occ.maximum_reached(usize::MAX));
        assert!(!occ.maximum_breached(usize::MAX));
    }

    #[test]
    fn test_json_round_trip() {
        let occ = Occurrences::new(1, 3).unwrap();
        let json = serde_json::to_value(occ).unwrap();
        assert_eq!(json, serde_json::json!({"minimum": 1, "maximum": 3}));
        let back: Occurrences = serde_json::from_value(json).unwrap();
        assert_eq!(occ, back);
    }

    #[test]
    fn test_deserialization_rejects_invalid_bounds() {
        let result: Result<Occurrences, _> =
            serde_json::from_value(serde_json::json!({"minimum": 3, "maximum": 1}));
        assert!(result.is_err());
    }
}
