//! Terminal mode flags
//!
//! Modes changed by `CSI ... h` / `CSI ... l`. The UI reads these to pick the
//! byte sequences it sends for keys and pastes.

use serde::{Deserialize, Serialize};

/// Terminal mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    /// DECCKM - Application cursor keys
    pub cursor_keys_application: bool,
    /// IRM - Insert mode (characters shift right instead of overwriting)
    pub insert_mode: bool,
    /// DECTCEM - Cursor visible
    pub cursor_visible: bool,
    /// xterm bracketed paste
    pub bracketed_paste: bool,
    /// DECAWM - Auto-wrap at the right margin
    pub auto_wrap: bool,
    /// Alternate screen buffer active
    pub alternate_screen: bool,
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}

impl Modes {
    /// Create new modes with default values
    pub fn new() -> Self {
        Self {
            cursor_keys_application: false,
            insert_mode: false,
            cursor_visible: true,
            bracketed_paste: false,
            auto_wrap: true,
            alternate_screen: false,
        }
    }

    /// Reset all modes to default
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Set a DEC private mode by number. Returns false if the mode is not
    /// handled here. The alternate screen (1049) belongs to the screen.
    pub fn set_dec_mode(&mut self, mode: u32, value: bool) -> bool {
        match mode {
            1 => self.cursor_keys_application = value,
            7 => self.auto_wrap = value,
            // Cursor blink: accepted, no effect
            12 => {}
            25 => self.cursor_visible = value,
            2004 => self.bracketed_paste = value,
            _ => return false,
        }
        true
    }

    /// Set an ANSI mode by number. Returns false if unknown.
    pub fn set_ansi_mode(&mut self, mode: u32, value: bool) -> bool {
        match mode {
            4 => self.insert_mode = value,
            _ => return false,
        }
        true
    }
}
