//! Cursor state management
//!
//! The cursor tracks the active line index, the column, and the SGR
//! attributes stamped onto new cells. It also supports save/restore
//! (DECSC/DECRC).

use serde::{Deserialize, Serialize};

use super::cell::Attributes;

/// Columns between horizontal tab stops
pub const TAB_WIDTH: usize = 8;

/// Cursor position and current rendition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Line index into the active buffer
    pub row: usize,
    /// Column (0-indexed). May sit past the last column: the next printed
    /// character wraps first.
    pub col: usize,
    /// Current text attributes (applied to new characters)
    pub attrs: Attributes,
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    /// Row relative to the top of the visible screen
    pub row: usize,
    pub col: usize,
    pub attrs: Attributes,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Backspace - one column left, stopping at 0
    pub fn backspace(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    /// Advance to the next tab stop. Not clamped to the screen width.
    pub fn tab(&mut self) {
        self.col = (self.col / TAB_WIDTH + 1) * TAB_WIDTH;
    }

    /// Move left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Save cursor state relative to the given screen top
    pub fn save(&self, screen_top: usize) -> SavedCursor {
        SavedCursor {
            row: self.row.saturating_sub(screen_top),
            col: self.col,
            attrs: self.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::Color;

    #[test]
    fn test_cursor_default() {
        let cursor = Cursor::default();
        assert_eq!(cursor.col, 0);
        assert_eq!(cursor.row, 0);
        assert_eq!(cursor.attrs, Attributes::default());
    }

    #[test]
    fn test_cursor_tab_stops() {
        let mut cursor = Cursor::new();
        cursor.tab();
        assert_eq!(cursor.col, 8);

        cursor.col = 9;
        cursor.tab();
        assert_eq!(cursor.col, 16);

        // Not clamped to any width
        cursor.col = 79;
        cursor.tab();
        assert_eq!(cursor.col, 80);
    }

    #[test]
    fn test_cursor_boundaries() {
        let mut cursor = Cursor::new();

        cursor.backspace();
        assert_eq!(cursor.col, 0);

        cursor.move_left(100);
        assert_eq!(cursor.col, 0);

        cursor.move_right(100, 80);
        assert_eq!(cursor.col, 79);
    }

    #[test]
    fn test_cursor_save_is_screen_relative() {
        let mut cursor = Cursor::new();
        cursor.row = 30;
        cursor.col = 4;
        cursor.attrs.fg = Color::RED;

        let saved = cursor.save(10);
        assert_eq!(saved.row, 20);
        assert_eq!(saved.col, 4);
        assert_eq!(saved.attrs.fg, Color::RED);
    }

    #[test]
    fn test_carriage_return() {
        let mut cursor = Cursor::new();
        cursor.row = 3;
        cursor.col = 50;

        cursor.carriage_return();
        assert_eq!(cursor.col, 0);
        assert_eq!(cursor.row, 3);
    }
}
