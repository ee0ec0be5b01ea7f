//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing and debugging. Given the same character stream, the terminal
//! must produce identical snapshots, however the stream was chunked.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Style};
use super::modes::Modes;
use super::screen::Screen;

/// A complete snapshot of the visible terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content (row-major, `rows` x `cols`)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state, row relative to the viewport
    pub cursor: CursorSnapshot,
    /// Scroll region, if one is set
    pub scroll_region: Option<(usize, usize)>,
    /// Terminal modes
    pub modes: Modes,
    /// Window title
    pub title: String,
    /// Whether on alternate screen
    pub alternate_screen: bool,
    /// Lines in the active buffer, including those above the viewport
    pub line_count: usize,
    /// Scrollback line count
    pub scrollback_lines: usize,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub c: char,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    #[serde(default, skip_serializing_if = "StyleSnapshot::is_plain")]
    pub style: StyleSnapshot,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Indexed { index: u8 },
    Rgb { r: u8, g: u8, b: u8 },
}

/// Snapshot of style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub faint: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub double_underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub blink: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reverse: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub conceal: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub crossed_out: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub overline: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl StyleSnapshot {
    fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

/// Snapshot of cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match *color {
            Color::Indexed(index) => ColorSnapshot::Indexed { index },
            Color::Rgb(r, g, b) => ColorSnapshot::Rgb { r, g, b },
        }
    }
}

impl From<&Style> for StyleSnapshot {
    fn from(style: &Style) -> Self {
        StyleSnapshot {
            bold: style.bold,
            faint: style.faint,
            italic: style.italic,
            underline: style.underline,
            double_underline: style.double_underline,
            blink: style.blink,
            reverse: style.reverse,
            conceal: style.conceal,
            crossed_out: style.crossed_out,
            overline: style.overline,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            c: cell.c,
            fg: ColorSnapshot::from(&cell.fg),
            bg: ColorSnapshot::from(&cell.bg),
            style: StyleSnapshot::from(&cell.style),
        }
    }
}

impl Snapshot {
    /// Create a snapshot of the viewport of `screen`
    pub fn from_screen(screen: &Screen, title: &str) -> Self {
        let top = screen.screen_top();
        let grid = (top..top + screen.rows())
            .map(|row| {
                (0..screen.cols())
                    .map(|col| CellSnapshot::from(&screen.cell(row, col)))
                    .collect()
            })
            .collect();

        let modes = *screen.modes();
        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                row: screen.cursor().row.saturating_sub(top),
                col: screen.cursor().col,
                visible: modes.cursor_visible,
            },
            scroll_region: screen.scroll_region(),
            modes,
            title: title.to_string(),
            alternate_screen: modes.alternate_screen,
            line_count: screen.line_count(),
            scrollback_lines: screen.scrollback().len(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the viewport, trailing blanks trimmed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            let line: String = row.iter().map(|cell| cell.c).collect();
            result.push_str(line.trim_end_matches(' '));
            result.push('\n');
        }

        // Remove trailing empty lines
        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare grid contents only
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_screen() {
        let mut screen = Screen::new(10, 3, 0);
        screen.put_char('H');
        screen.put_char('i');

        let snapshot = Snapshot::from_screen(&screen, "t");

        assert_eq!(snapshot.cols, 10);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.grid.len(), 3);
        assert_eq!(snapshot.grid[0][0].c, 'H');
        assert_eq!(snapshot.grid[0][1].c, 'i');
        assert_eq!(snapshot.grid[2][9].c, ' ');
        assert_eq!(snapshot.cursor.col, 2);
        assert_eq!(snapshot.cursor.row, 0);
        assert_eq!(snapshot.title, "t");
    }

    #[test]
    fn test_snapshot_shows_viewport() {
        let mut screen = Screen::new(10, 2, 0);
        for c in ['a', '\n', 'b', '\n', 'c'] {
            if c == '\n' {
                screen.linefeed();
            } else {
                screen.put_char(c);
            }
        }

        let snapshot = Snapshot::from_screen(&screen, "");
        assert_eq!(snapshot.to_text(), "b\nc\n");
        assert_eq!(snapshot.cursor.row, 1);
        assert_eq!(snapshot.line_count, 3);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let mut screen = Screen::new(5, 2, 0);
        screen.put_char('X');
        screen.attrs_mut().style.set_bold();
        screen.attrs_mut().fg = Color::Rgb(1, 2, 3);
        screen.put_char('Y');

        let snapshot = Snapshot::from_screen(&screen, "title");
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(snapshot, restored);
        assert!(json.contains("\"bold\": true"));
        assert!(!json.contains("\"italic\""));
    }

    #[test]
    fn test_color_snapshot() {
        assert_eq!(
            ColorSnapshot::from(&Color::Indexed(5)),
            ColorSnapshot::Indexed { index: 5 }
        );
        assert_eq!(
            ColorSnapshot::from(&Color::Rgb(255, 128, 0)),
            ColorSnapshot::Rgb {
                r: 255,
                g: 128,
                b: 0
            }
        );
    }
}
