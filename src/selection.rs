//! Caret/range selection over the text buffer.

use serde::{Deserialize, Serialize};

/// A selection in the text buffer, measured in character offsets.
///
/// `start == end` is a caret. Hosts report selections normalised so that
/// `start <= end`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a collapsed selection (caret with no range)
    pub const fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Check if this is a caret (start == end)
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Check if this selects a non-empty range
    pub fn is_ranged(&self) -> bool {
        !self.is_caret()
    }

    /// Number of selected characters
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clamp both ends to `len` and order them
    pub fn clamped(&self, len: usize) -> Self {
        let a = self.start.min(len);
        let b = self.end.min(len);
        Self::new(a.min(b), a.max(b))
    }
}

impl From<(usize, usize)> for Selection {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_caret() {
            write!(f, "|{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}
