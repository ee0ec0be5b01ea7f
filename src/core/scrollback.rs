//! Scrollback buffer implementation
//!
//! Lines removed from the top of the main screen are kept here, oldest
//! first, up to a configurable limit. A capacity of zero disables
//! scrollback entirely.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::line::Line;

/// Bounded FIFO of evicted lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scrollback {
    lines: VecDeque<Line>,
    /// Maximum number of lines to store
    capacity: usize,
}

impl Scrollback {
    /// Create a new scrollback buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            // Don't pre-allocate too much
            lines: VecDeque::with_capacity(capacity.min(1000)),
            capacity,
        }
    }

    /// Get the number of lines in the scrollback
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the scrollback is empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the maximum capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a line, evicting the oldest one when full
    pub fn push(&mut self, mut line: Line) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        line.clear_dirty();
        self.lines.push_back(line);
    }

    /// Push several lines in order
    pub fn extend<I: IntoIterator<Item = Line>>(&mut self, lines: I) {
        for line in lines {
            self.push(line);
        }
    }

    /// Get a line by index (0 = oldest line in scrollback)
    pub fn get(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Get a line by index from the end (0 = most recent line)
    pub fn get_from_end(&self, index: usize) -> Option<&Line> {
        if index >= self.lines.len() {
            return None;
        }
        self.get(self.lines.len() - 1 - index)
    }

    /// Cell lookup; out-of-range positions read as a blank cell
    pub fn cell(&self, index: usize, col: usize) -> Cell {
        self.get(index)
            .and_then(|line| line.cell(col))
            .copied()
            .unwrap_or_default()
    }

    /// Clear all lines from the scrollback
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Iterate over all lines from oldest to newest
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Line> {
        self.lines.iter()
    }

    /// Set a new capacity, dropping the oldest lines if shrinking
    pub fn set_capacity(&mut self, new_capacity: usize) {
        while self.lines.len() > new_capacity {
            self.lines.pop_front();
        }
        self.capacity = new_capacity;
    }
}
