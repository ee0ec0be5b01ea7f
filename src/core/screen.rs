//! Screen model implementation
//!
//! The screen owns the active line buffer, the cursor, the mode flags and
//! the scroll region. The main buffer grows lazily as output arrives and a
//! `screen_top` index marks the first line of the visible viewport. The
//! alternate buffer always holds exactly `rows` lines.
//!
//! Row arguments taken by positioning commands are relative to the viewport;
//! everything returned to readers (`cursor_row`, `line`, `cell`,
//! `dirty_lines`) is a line index into the active buffer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cell::{Attributes, Cell};
use super::cursor::{Cursor, SavedCursor};
use super::line::Line;
use super::modes::Modes;
use super::scrollback::Scrollback;

/// Main-screen state parked while the alternate screen is active
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedMain {
    lines: Vec<Line>,
    screen_top: usize,
    cursor: Cursor,
    modes: Modes,
    scroll_region: Option<(usize, usize)>,
    saved_cursor: Option<SavedCursor>,
}

/// The terminal grid and everything that edits it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    /// Number of columns
    cols: usize,
    /// Number of rows
    rows: usize,
    /// Active buffer (main or alternate)
    lines: Vec<Line>,
    /// Index of the line shown as viewport row 0. Always 0 on the alternate
    /// screen.
    screen_top: usize,
    cursor: Cursor,
    modes: Modes,
    /// Scroll region, viewport-relative and inclusive
    scroll_region: Option<(usize, usize)>,
    /// DECSC slot
    saved_cursor: Option<SavedCursor>,
    /// Main screen, present only while the alternate screen is active
    saved_main: Option<Box<SavedMain>>,
    /// Lines evicted from the top of the main screen
    scrollback: Scrollback,
    /// Line indices that disappeared since the last dirty clear
    #[serde(skip)]
    vanished: Option<(usize, usize)>,
}

impl Screen {
    /// Create a new screen with the given dimensions
    pub fn new(cols: usize, rows: usize, scrollback_capacity: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            lines: Vec::new(),
            screen_top: 0,
            cursor: Cursor::new(),
            modes: Modes::new(),
            scroll_region: None,
            saved_cursor: None,
            saved_main: None,
            scrollback: Scrollback::new(scrollback_capacity),
            vanished: None,
        }
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    /// Current SGR state stamped onto new cells
    pub fn attrs(&self) -> &Attributes {
        &self.cursor.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.cursor.attrs
    }

    pub fn screen_top(&self) -> usize {
        self.screen_top
    }

    /// Scroll region as viewport-relative inclusive rows, if one is set
    pub fn scroll_region(&self) -> Option<(usize, usize)> {
        self.scroll_region
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn is_alternate(&self) -> bool {
        self.modes.alternate_screen
    }

    /// Number of lines in the active buffer
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get a line by buffer index
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// All lines of the active buffer
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Cell lookup; anything out of range reads as a blank cell
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.lines
            .get(row)
            .and_then(|line| line.cell(col))
            .copied()
            .unwrap_or_default()
    }

    /// Text of a line, empty if the line does not exist
    pub fn line_text(&self, index: usize) -> String {
        self.lines.get(index).map(Line::text).unwrap_or_default()
    }

    /// Indices of lines changed since the last `clear_dirty_lines`, sorted
    pub fn dirty_lines(&self) -> Vec<usize> {
        let mut dirty: Vec<usize> = self
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.is_dirty())
            .map(|(i, _)| i)
            .collect();
        if let Some((from, to)) = self.vanished {
            dirty.extend((from.max(self.lines.len())..to).filter(|i| self.is_visible(*i)));
            dirty.sort_unstable();
            dirty.dedup();
        }
        dirty
    }

    pub fn clear_dirty_lines(&mut self) {
        for line in &mut self.lines {
            line.clear_dirty();
        }
        self.vanished = None;
    }

    fn is_visible(&self, index: usize) -> bool {
        index >= self.screen_top && index < self.screen_top + self.rows
    }

    fn mark_all_dirty(&mut self) {
        for line in &mut self.lines {
            line.mark_dirty();
        }
    }

    fn mark_dirty_range(&mut self, from: usize, to: usize) {
        let end = to.min(self.lines.len());
        for line in self.lines.iter_mut().take(end).skip(from) {
            line.mark_dirty();
        }
    }

    /// Record that the buffer shrank from `old_len` lines
    fn note_vanished(&mut self, old_len: usize) {
        let new_len = self.lines.len();
        if new_len >= old_len {
            return;
        }
        self.vanished = Some(match self.vanished {
            Some((from, to)) => (from.min(new_len), to.max(old_len)),
            None => (new_len, old_len),
        });
    }

    /// Make sure the buffer reaches line `index`
    fn ensure_line(&mut self, index: usize) {
        while self.lines.len() <= index {
            self.lines.push(Line::new());
        }
    }

    /// Last viewport line, as a buffer index
    fn viewport_bottom(&self) -> usize {
        self.screen_top + self.rows - 1
    }

    /// Scroll region as absolute buffer indices
    fn region_bounds(&self) -> (usize, usize) {
        match self.scroll_region {
            Some((top, bottom)) => (self.screen_top + top, self.screen_top + bottom),
            None => (self.screen_top, self.viewport_bottom()),
        }
    }

    /// True when scrolling keeps a fixed line count (alternate screen or an
    /// explicit region) instead of growing the main buffer
    fn has_fixed_region(&self) -> bool {
        self.modes.alternate_screen || self.scroll_region.is_some()
    }

    /// Advance `screen_top` so the cursor line is visible
    fn follow_cursor(&mut self) {
        if self.cursor.row > self.viewport_bottom() {
            self.screen_top = self.cursor.row + 1 - self.rows;
            let (top, bottom) = (self.screen_top, self.viewport_bottom());
            self.mark_dirty_range(top, bottom + 1);
        }
    }

    // ---- character handling ----

    /// Write a character at the cursor and advance it
    pub fn put_char(&mut self, c: char) {
        if self.cursor.col >= self.cols {
            if self.modes.auto_wrap {
                if !self.wrap() {
                    return;
                }
            } else {
                self.cursor.col = self.cols - 1;
            }
        }

        let cell = Cell::with_attrs(c, &self.cursor.attrs);
        let (row, col, cols) = (self.cursor.row, self.cursor.col, self.cols);
        self.ensure_line(row);
        let line = &mut self.lines[row];
        if self.modes.insert_mode {
            line.insert(col, cell, cols);
        } else {
            line.set(col, cell);
        }
        self.cursor.col += 1;
    }

    /// Auto-wrap to the next line. Returns false when the alternate screen
    /// has no line left to wrap onto; only an explicit region whose bottom
    /// is the last row scrolls there.
    fn wrap(&mut self) -> bool {
        if self.modes.alternate_screen && self.cursor.row + 1 >= self.rows {
            let (_, bottom) = self.region_bounds();
            if self.scroll_region.is_none() || self.cursor.row != bottom {
                return false;
            }
        }
        self.linefeed();
        true
    }

    /// CR
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// LF: column 0 and the next line, scrolling at the region bottom
    pub fn linefeed(&mut self) {
        self.cursor.carriage_return();
        self.index();
    }

    /// Move down one line without changing the column
    pub fn index(&mut self) {
        let (top, bottom) = self.region_bounds();
        if self.cursor.row == bottom && self.has_fixed_region() {
            self.scroll_region_up(top, bottom, 1);
        } else if self.modes.alternate_screen {
            if self.cursor.row + 1 < self.rows {
                self.cursor.row += 1;
            }
        } else if self.scroll_region.is_some() && self.cursor.row >= self.viewport_bottom() {
            // Below an explicit region the viewport stays put
        } else {
            self.cursor.row += 1;
            self.ensure_line(self.cursor.row);
            self.follow_cursor();
        }
    }

    /// HT
    pub fn tab(&mut self) {
        self.cursor.tab();
    }

    /// BS
    pub fn backspace(&mut self) {
        self.cursor.backspace();
    }

    // ---- cursor motion ----

    /// Move to a viewport-relative position, clamped to the screen (CUP)
    pub fn goto(&mut self, row: usize, col: usize) {
        self.goto_row(row);
        self.goto_col(col);
    }

    /// Move to a viewport-relative row, clamped (VPA)
    pub fn goto_row(&mut self, row: usize) {
        self.cursor.row = self.screen_top + row.min(self.rows - 1);
        if !self.modes.alternate_screen {
            self.ensure_line(self.cursor.row);
        }
    }

    /// Move to a column, clamped (CHA/HPA)
    pub fn goto_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols - 1);
    }

    /// CUU
    pub fn cursor_up(&mut self, n: usize) {
        self.cursor.row = self.cursor.row.saturating_sub(n).max(self.screen_top);
    }

    /// CUD
    pub fn cursor_down(&mut self, n: usize) {
        self.cursor.row = self
            .cursor
            .row
            .saturating_add(n)
            .min(self.viewport_bottom());
        if !self.modes.alternate_screen {
            self.ensure_line(self.cursor.row);
        }
    }

    /// CUF
    pub fn cursor_forward(&mut self, n: usize) {
        self.cursor.move_right(n, self.cols);
    }

    /// CUB
    pub fn cursor_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// DECSC: save position (viewport-relative) and attributes
    pub fn save_cursor(&mut self) {
        self.saved_cursor = Some(self.cursor.save(self.screen_top));
    }

    /// DECRC: restore the saved cursor, or home with default attributes if
    /// nothing was saved
    pub fn restore_cursor(&mut self) {
        let saved = self.saved_cursor.unwrap_or_default();
        self.goto_row(saved.row);
        self.cursor.col = saved.col.min(self.cols);
        self.cursor.attrs = saved.attrs;
    }

    // ---- erasing ----

    /// ED. Mode 3 behaves like mode 2.
    pub fn erase_in_display(&mut self, mode: u32) {
        let (row, col) = (self.cursor.row, self.cursor.col);
        let old_len = self.lines.len();

        if self.modes.alternate_screen {
            match mode {
                0 => {
                    if let Some(line) = self.lines.get_mut(row) {
                        line.truncate(col);
                    }
                    for line in self.lines.iter_mut().skip(row + 1) {
                        line.clear();
                    }
                }
                1 => {
                    for line in self.lines.iter_mut().take(row) {
                        line.clear();
                    }
                    if let Some(line) = self.lines.get_mut(row) {
                        line.erase_to(col);
                    }
                }
                2 | 3 => {
                    for line in &mut self.lines {
                        line.clear();
                    }
                }
                _ => {}
            }
            return;
        }

        match mode {
            0 => {
                if let Some(line) = self.lines.get_mut(row) {
                    line.truncate(col);
                }
                self.lines.truncate(row + 1);
            }
            1 => {
                let top = self.screen_top.min(self.lines.len());
                let end = row.min(self.lines.len()).max(top);
                self.lines.drain(top..end);
                self.cursor.row = self.screen_top;
                if let Some(line) = self.lines.get_mut(self.cursor.row) {
                    line.erase_to(col);
                }
                self.mark_dirty_range(top, usize::MAX);
            }
            2 | 3 => {
                self.lines.truncate(self.screen_top);
            }
            _ => {}
        }
        self.note_vanished(old_len);
    }

    /// EL
    pub fn erase_in_line(&mut self, mode: u32) {
        let col = self.cursor.col;
        let Some(line) = self.lines.get_mut(self.cursor.row) else {
            return;
        };
        match mode {
            0 => line.truncate(col),
            1 => line.erase_to(col),
            2 => line.clear(),
            _ => {}
        }
    }

    // ---- scrolling and line editing ----

    /// Remove `n` lines at `at`, pulling up the lines below within `bottom`.
    /// Returns the removed lines.
    fn pull_lines_up(&mut self, at: usize, bottom: usize, n: usize) -> Vec<Line> {
        if self.has_fixed_region() {
            self.ensure_line(bottom);
        }
        if at >= self.lines.len() || at > bottom {
            return Vec::new();
        }
        let old_len = self.lines.len();
        let end = at.saturating_add(n).min(bottom + 1).min(old_len);
        let removed: Vec<Line> = self.lines.drain(at..end).collect();

        // Keep lines below the region in place
        let refill = bottom + 1 - removed.len();
        if refill < self.lines.len() || self.has_fixed_region() {
            for _ in 0..removed.len() {
                self.lines.insert(refill, Line::new());
            }
        }
        self.mark_dirty_range(at, bottom + 1);
        self.note_vanished(old_len);
        removed
    }

    /// Insert `n` blank lines at `at`, dropping the lines pushed past `bottom`
    fn push_lines_down(&mut self, at: usize, bottom: usize, n: usize) {
        if self.has_fixed_region() {
            self.ensure_line(bottom);
        }
        if at >= self.lines.len() || at > bottom {
            return;
        }
        let old_len = self.lines.len();
        let n = n.min(bottom + 1 - at);
        for _ in 0..n {
            self.lines.insert(at, Line::new());
        }
        let drop_end = (bottom + 1 + n).min(self.lines.len());
        if bottom + 1 < drop_end {
            self.lines.drain(bottom + 1..drop_end);
        }
        self.mark_dirty_range(at, bottom + 1);
        self.note_vanished(old_len);
    }

    fn scroll_region_up(&mut self, top: usize, bottom: usize, n: usize) {
        let removed = self.pull_lines_up(top, bottom, n);
        if !self.modes.alternate_screen && top == self.screen_top {
            self.scrollback.extend(removed);
        }
    }

    /// SU: content moves up by `n` lines
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = self.region_bounds();
        self.scroll_region_up(top, bottom, n);
    }

    /// SD: content moves down by `n` lines
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = self.region_bounds();
        self.push_lines_down(top, bottom, n);
    }

    /// IL: ignored when the cursor is outside the scroll region
    pub fn insert_lines(&mut self, n: usize) {
        let (top, bottom) = self.region_bounds();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        self.push_lines_down(row, bottom, n);
    }

    /// DL: ignored when the cursor is outside the scroll region
    pub fn delete_lines(&mut self, n: usize) {
        let (top, bottom) = self.region_bounds();
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        self.pull_lines_up(row, bottom, n);
    }

    /// ICH
    pub fn insert_chars(&mut self, n: usize) {
        let (col, cols) = (self.cursor.col, self.cols);
        if let Some(line) = self.lines.get_mut(self.cursor.row) {
            line.insert_blanks(col, n, cols);
        }
    }

    /// DCH
    pub fn delete_chars(&mut self, n: usize) {
        let col = self.cursor.col;
        if let Some(line) = self.lines.get_mut(self.cursor.row) {
            line.delete(col, n);
        }
    }

    /// DECSTBM with 1-based inclusive bounds. Missing or invalid bounds
    /// reset the region; the cursor goes home either way.
    pub fn set_scroll_region(&mut self, top: Option<u32>, bottom: Option<u32>) {
        self.scroll_region = match (top, bottom) {
            (Some(top), Some(bottom))
                if top >= 1 && bottom >= top && (bottom as usize) <= self.rows =>
            {
                let region = (top as usize - 1, bottom as usize - 1);
                if region == (0, self.rows - 1) {
                    None
                } else {
                    Some(region)
                }
            }
            _ => None,
        };
        self.goto(0, 0);
    }

    // ---- buffers ----

    /// Switch to the alternate screen (DEC 1049 set)
    pub fn enter_alternate_screen(&mut self) {
        if self.modes.alternate_screen {
            return;
        }
        debug!(lines = self.lines.len(), "entering alternate screen");

        let relative_row = self
            .cursor
            .row
            .saturating_sub(self.screen_top)
            .min(self.rows - 1);
        let col = self.cursor.col;
        let main_lines = std::mem::take(&mut self.lines);
        self.saved_main = Some(Box::new(SavedMain {
            lines: main_lines,
            screen_top: self.screen_top,
            cursor: self.cursor,
            modes: self.modes,
            scroll_region: self.scroll_region.take(),
            saved_cursor: self.saved_cursor.take(),
        }));

        self.modes.reset();
        self.modes.alternate_screen = true;
        self.lines = (0..self.rows).map(|_| Line::new()).collect();
        self.screen_top = 0;
        self.cursor = Cursor {
            row: relative_row,
            col,
            attrs: Attributes::default(),
        };
    }

    /// Return to the main screen (DEC 1049 reset)
    pub fn exit_alternate_screen(&mut self) {
        let Some(saved) = self.saved_main.take() else {
            return;
        };
        debug!(lines = saved.lines.len(), "leaving alternate screen");

        let old_len = self.lines.len();
        let saved = *saved;
        self.lines = saved.lines;
        self.screen_top = saved.screen_top;
        self.cursor = saved.cursor;
        self.modes = saved.modes;
        self.scroll_region = saved.scroll_region;
        self.saved_cursor = saved.saved_cursor;
        // The size may have changed while the alternate screen was up
        self.follow_cursor();
        self.mark_all_dirty();
        self.note_vanished(old_len);
    }

    /// Change the dimensions. The scroll region is reset.
    pub fn set_size(&mut self, cols: usize, rows: usize) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.scroll_region = None;
        if let Some(saved) = self.saved_main.as_mut() {
            saved.scroll_region = None;
        }

        let old_len = self.lines.len();
        if self.modes.alternate_screen {
            self.lines.resize_with(self.rows, Line::new);
            self.cursor.row = self.cursor.row.min(self.rows - 1);
        } else {
            self.follow_cursor();
        }
        self.cursor.col = self.cursor.col.min(self.cols);
        self.mark_all_dirty();
        self.note_vanished(old_len);
    }
}
