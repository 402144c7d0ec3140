//! Image carousel position for the property detail page.

use serde::{Deserialize, Serialize};

/// Index into a non-empty, ordered image sequence, with wraparound
/// navigation. Resets to the first image whenever a new sequence is
/// installed; the normalizer guarantees sequences are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    index: usize,
    len: usize,
}

impl Default for Gallery {
    fn default() -> Self {
        Self { index: 0, len: 1 }
    }
}

impl Gallery {
    /// Installs a new image sequence and returns to the first slide. A zero
    /// length is treated as one, since the view always has at least a
    /// placeholder to show.
    pub fn reset(&mut self, len: usize) {
        self.len = len.max(1);
        self.index = 0;
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub fn previous(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }

    /// Jumps to a slide. Out-of-range requests are ignored, not errors.
    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}
