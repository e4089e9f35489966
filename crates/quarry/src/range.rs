//! Interval values for the BETWEEN operator.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// An interval from `start` to `end`.
///
/// No normalization is performed: a range whose start lies after its end is
/// valid but includes nothing.
///
/// # Example
///
/// ```
/// use quarry::Range;
///
/// let range = Range::new(1, 10);
/// assert!(range.includes(&1, true));
/// assert!(!range.includes(&1, false));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range<T> {
    /// Lower bound.
    pub start: T,
    /// Upper bound.
    pub end: T,
}

impl<T> Range<T> {
    /// Creates a new range.
    pub fn new(start: T, end: T) -> Self {
        Range { start, end }
    }

    /// Checks whether `value` lies in this range.
    ///
    /// Inclusive mode tests `start <= value <= end`, exclusive mode
    /// `start < value < end`. Incomparable values are never included.
    pub fn includes(&self, value: &T, inclusive: bool) -> bool
    where
        T: PartialOrd,
    {
        if inclusive {
            *value >= self.start && *value <= self.end
        } else {
            *value > self.start && *value < self.end
        }
    }

    /// Like [`includes`](Self::includes), with a fallible comparison.
    ///
    /// `compare(bound)` returns the ordering of the tested value relative to
    /// `bound`, or `None` if they are incomparable. Errors from the
    /// comparison propagate.
    pub fn includes_by<E, F>(&self, inclusive: bool, mut compare: F) -> Result<bool, E>
    where
        F: FnMut(&T) -> Result<Option<Ordering>, E>,
    {
        let (Some(lower), Some(upper)) = (compare(&self.start)?, compare(&self.end)?) else {
            return Ok(false);
        };
        Ok(if inclusive {
            lower != Ordering::Less && upper != Ordering::Greater
        } else {
            lower == Ordering::Greater && upper == Ordering::Less
        })
    }
}
