//! Character-offset spans into the normalized text of a document.

use std::fmt;

use serde::Serialize;

/// A half-open `[start, end)` span of character offsets.
///
/// [`FindSpot::NOT_FOUND`] is the sentinel used when an anchor pattern does
/// not occur at all. Offsets count `char`s, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FindSpot {
    /// Offset of the first character of the span.
    pub start: usize,
    /// Offset one past the last character of the span.
    pub end: usize,
}

impl FindSpot {
    /// The "pattern does not occur" sentinel.
    pub const NOT_FOUND: FindSpot = FindSpot {
        start: usize::MAX,
        end: usize::MAX,
    };

    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} after end {}", start, end);
        Self { start, end }
    }

    pub fn is_not_found(&self) -> bool {
        *self == Self::NOT_FOUND
    }

    pub fn is_found(&self) -> bool {
        !self.is_not_found()
    }

    /// Number of characters covered; zero for the sentinel.
    pub fn len(&self) -> usize {
        if self.is_not_found() {
            0
        } else {
            self.end - self.start
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `other` lies completely inside this span.
    pub fn contains(&self, other: &FindSpot) -> bool {
        self.is_found() && other.is_found() && self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for FindSpot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_not_found() {
            write!(f, "NOT_FOUND")
        } else {
            write!(f, "[{}, {})", self.start, self.end)
        }
    }
}
