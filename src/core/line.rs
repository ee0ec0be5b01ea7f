//! Terminal line representation
//!
//! A line is a row of cells that grows lazily to the rightmost column
//! written. Columns past the end read as default blank cells.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    /// The cells in this line
    cells: Vec<Cell>,
    /// Changed since the last render
    #[serde(skip)]
    dirty: bool,
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

// Equality is about content; the dirty flag is render bookkeeping.
impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Line {}

impl Line {
    /// Create an empty line, flagged dirty
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            dirty: true,
        }
    }

    /// Create a line from existing cells
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells, dirty: true }
    }

    /// Number of materialised cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cells have been written
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get a reference to a cell at the given column
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Get all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Write a cell, padding with blanks up to `col` if needed
    pub fn set(&mut self, col: usize, cell: Cell) {
        if col >= self.cells.len() {
            self.cells.resize(col + 1, Cell::default());
        }
        self.cells[col] = cell;
        self.dirty = true;
    }

    /// Insert a cell at `col`, shifting the rest right. Cells pushed past
    /// `limit` are lost.
    pub fn insert(&mut self, col: usize, cell: Cell, limit: usize) {
        if col >= self.cells.len() {
            self.set(col, cell);
            return;
        }
        self.cells.insert(col, cell);
        if self.cells.len() > limit {
            self.cells.truncate(limit.max(col + 1));
        }
        self.dirty = true;
    }

    /// Insert `count` blank cells at `col` (ICH). Cells pushed past `limit`
    /// are lost.
    pub fn insert_blanks(&mut self, col: usize, count: usize, limit: usize) {
        if col >= self.cells.len() || count == 0 {
            return;
        }
        let count = count.min(limit.saturating_sub(col));
        self.cells
            .splice(col..col, std::iter::repeat(Cell::default()).take(count));
        if self.cells.len() > limit {
            self.cells.truncate(limit.max(col));
        }
        self.dirty = true;
    }

    /// Delete `count` cells at `col` (DCH), shifting the rest left
    pub fn delete(&mut self, col: usize, count: usize) {
        if col >= self.cells.len() || count == 0 {
            return;
        }
        let end = col.saturating_add(count).min(self.cells.len());
        self.cells.drain(col..end);
        self.dirty = true;
    }

    /// Drop every cell from `col` to the end
    pub fn truncate(&mut self, col: usize) {
        if col < self.cells.len() {
            self.cells.truncate(col);
            self.dirty = true;
        }
    }

    /// Blank cells from the start of the line to `col`, inclusive
    pub fn erase_to(&mut self, col: usize) {
        let end = col.saturating_add(1).min(self.cells.len());
        for cell in &mut self.cells[..end] {
            *cell = Cell::default();
        }
        self.dirty = true;
    }

    /// Remove all cells
    pub fn clear(&mut self) {
        self.cells.clear();
        self.dirty = true;
    }

    /// Get the text content of this line
    pub fn text(&self) -> String {
        self.cells.iter().map(|cell| cell.c).collect()
    }

    /// Check if the line holds nothing but default blanks
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}
