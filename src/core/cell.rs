//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a character
//! and its associated styling attributes.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell
    pub c: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text style attributes
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            c: ' ',
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            style: Style::default(),
        }
    }
}

impl Cell {
    /// Create a new cell with a single character and default attributes
    pub fn new(c: char) -> Self {
        Self {
            c,
            ..Default::default()
        }
    }

    /// Create a cell stamped with the given attributes
    pub fn with_attrs(c: char, attrs: &Attributes) -> Self {
        Self {
            c,
            fg: attrs.fg,
            bg: attrs.bg,
            style: attrs.style,
        }
    }

    /// Check if this cell is a default-attributed blank
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// The attributes this cell was written with
    pub fn attrs(&self) -> Attributes {
        Attributes {
            fg: self.fg,
            bg: self.bg,
            style: self.style,
        }
    }
}

/// Color of a cell: a palette index or a 24-bit true color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Palette index: 0-15 are the ANSI colors, 16-255 the extended palette
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Default for Color {
    fn default() -> Self {
        Color::DEFAULT_FG
    }
}

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Bright ANSI colors (8-15)
    pub const BRIGHT_BLACK: Color = Color::Indexed(8);
    pub const BRIGHT_RED: Color = Color::Indexed(9);
    pub const BRIGHT_GREEN: Color = Color::Indexed(10);
    pub const BRIGHT_YELLOW: Color = Color::Indexed(11);
    pub const BRIGHT_BLUE: Color = Color::Indexed(12);
    pub const BRIGHT_MAGENTA: Color = Color::Indexed(13);
    pub const BRIGHT_CYAN: Color = Color::Indexed(14);
    pub const BRIGHT_WHITE: Color = Color::Indexed(15);

    /// Terminal default foreground (SGR 39)
    pub const DEFAULT_FG: Color = Color::WHITE;
    /// Terminal default background (SGR 49)
    pub const DEFAULT_BG: Color = Color::BLACK;

    /// True for 24-bit colors
    pub fn is_true_color(&self) -> bool {
        matches!(self, Color::Rgb(..))
    }

    /// Convert a 256-color index to RGB
    /// This implements the standard xterm 256-color palette
    pub fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            // Standard colors (0-15) - using typical xterm defaults
            0 => (0, 0, 0),
            1 => (205, 0, 0),
            2 => (0, 205, 0),
            3 => (205, 205, 0),
            4 => (0, 0, 238),
            5 => (205, 0, 205),
            6 => (0, 205, 205),
            7 => (229, 229, 229),
            8 => (127, 127, 127),
            9 => (255, 0, 0),
            10 => (0, 255, 0),
            11 => (255, 255, 0),
            12 => (92, 92, 255),
            13 => (255, 0, 255),
            14 => (0, 255, 255),
            15 => (255, 255, 255),
            // 216 color cube (16-231)
            16..=231 => {
                let n = index - 16;
                let r = n / 36;
                let g = (n % 36) / 6;
                let b = n % 6;
                let to_rgb = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
                (to_rgb(r), to_rgb(g), to_rgb(b))
            }
            // Grayscale (232-255)
            232..=255 => {
                let gray = 8 + (index - 232) * 10;
                (gray, gray, gray)
            }
        }
    }

    /// Convert this color to RGB with the xterm palette
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match *self {
            Color::Indexed(i) => Self::indexed_to_rgb(i),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub double_underline: bool,
    pub blink: bool,
    pub reverse: bool,
    pub conceal: bool,
    pub crossed_out: bool,
    pub overline: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// SGR 1: bold clears faint
    pub fn set_bold(&mut self) {
        self.bold = true;
        self.faint = false;
    }

    /// SGR 2: faint clears bold
    pub fn set_faint(&mut self) {
        self.faint = true;
        self.bold = false;
    }

    /// True if any flag is set
    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

/// The SGR state stamped onto newly written cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            style: Style::default(),
        }
    }
}

impl Attributes {
    /// SGR 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
