//! Terminal Screen Model
//!
//! Ties the parser to the screen: every character and command the parser
//! emits is applied to the grid as it is found, so text and commands keep
//! their stream order. Also owns the window title, the event listener and
//! the processing counters.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::TerminalConfig;
use crate::core::{Attributes, Cell, Color, Line, Screen, Snapshot};
use crate::event::{Event, EventListener, VoidListener};
use crate::parser::{Command, CsiCommand, OscCommand, Parser, Perform};

/// Longest window title kept, in characters
pub const MAX_TITLE_LEN: usize = 4096;

/// Counters for what `process_data` has seen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    /// `process_data` calls
    pub process_calls: u64,
    /// Characters delivered by the parser
    pub characters: u64,
    /// Commands delivered by the parser
    pub commands: u64,
    /// Commands recognised by the parser but not acted on
    pub ignored_commands: u64,
    /// BEL characters
    pub bells: u64,
}

/// The terminal: parser plus screen state
pub struct Terminal<L: EventListener = VoidListener> {
    parser: Parser,
    state: TermState<L>,
}

/// Everything the parser's events mutate
struct TermState<L> {
    screen: Screen,
    title: String,
    /// One-slot title stack (CSI 22 t / CSI 23 t)
    saved_title: Option<String>,
    stats: ProcessStats,
    listener: L,
}

impl Terminal<VoidListener> {
    /// Create a terminal that drops its events
    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_listener(cols, rows, VoidListener)
    }
}

impl<L: EventListener> Terminal<L> {
    /// Create a terminal that reports events to `listener`
    pub fn with_listener(cols: usize, rows: usize, listener: L) -> Self {
        Self::build(Screen::new(cols, rows, 0), listener)
    }

    /// Create a terminal from a validated configuration
    pub fn from_config(config: &TerminalConfig, listener: L) -> Self {
        Self::build(
            Screen::new(config.cols, config.rows, config.scrollback_lines),
            listener,
        )
    }

    fn build(screen: Screen, listener: L) -> Self {
        Self {
            parser: Parser::new(),
            state: TermState {
                screen,
                title: String::new(),
                saved_title: None,
                stats: ProcessStats::default(),
                listener,
            },
        }
    }

    /// Feed a chunk of decoded text. Partial sequences carry over to the
    /// next call.
    pub fn process_data(&mut self, data: &str) {
        self.state.stats.process_calls += 1;
        self.parser.advance(data, &mut self.state);
    }

    /// Apply one command as if the parser had emitted it
    pub fn apply_command(&mut self, command: Command) {
        self.state.command_received(command);
    }

    /// Apply one character as if the parser had emitted it
    pub fn apply_character(&mut self, c: char) {
        self.state.character_received(c);
    }

    pub fn screen(&self) -> &Screen {
        &self.state.screen
    }

    pub fn listener(&self) -> &L {
        &self.state.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.state.listener
    }

    pub fn stats(&self) -> ProcessStats {
        self.state.stats
    }

    pub fn rows(&self) -> usize {
        self.state.screen.rows()
    }

    pub fn cols(&self) -> usize {
        self.state.screen.cols()
    }

    /// Resize the terminal
    pub fn set_size(&mut self, cols: usize, rows: usize) {
        debug!(cols, rows, "resize");
        self.state.screen.set_size(cols, rows);
    }

    /// Get a line of the active buffer
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.state.screen.line(index)
    }

    /// Get a cell; out-of-range positions read as a blank cell
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.state.screen.cell(row, col)
    }

    pub fn line_text(&self, index: usize) -> String {
        self.state.screen.line_text(index)
    }

    pub fn line_count(&self) -> usize {
        self.state.screen.line_count()
    }

    /// Lines changed since the last `clear_dirty_lines`
    pub fn dirty_lines(&self) -> Vec<usize> {
        self.state.screen.dirty_lines()
    }

    pub fn clear_dirty_lines(&mut self) {
        self.state.screen.clear_dirty_lines();
    }

    pub fn cursor_row(&self) -> usize {
        self.state.screen.cursor().row
    }

    pub fn cursor_col(&self) -> usize {
        self.state.screen.cursor().col
    }

    pub fn cursor_visible(&self) -> bool {
        self.state.screen.modes().cursor_visible
    }

    pub fn in_alternate_screen(&self) -> bool {
        self.state.screen.is_alternate()
    }

    /// Application cursor keys (DECCKM)
    pub fn cursor_key_mode(&self) -> bool {
        self.state.screen.modes().cursor_keys_application
    }

    pub fn bracketed_paste_mode(&self) -> bool {
        self.state.screen.modes().bracketed_paste
    }

    pub fn insert_mode(&self) -> bool {
        self.state.screen.modes().insert_mode
    }

    pub fn title(&self) -> &str {
        &self.state.title
    }

    /// First line of the visible viewport
    pub fn screen_top(&self) -> usize {
        self.state.screen.screen_top()
    }

    /// Current SGR attributes
    pub fn attributes(&self) -> Attributes {
        *self.state.screen.attrs()
    }

    pub fn scrollback_len(&self) -> usize {
        self.state.screen.scrollback().len()
    }

    /// Scrollback line by index, 0 = oldest
    pub fn scrollback_line(&self, index: usize) -> Option<&Line> {
        self.state.screen.scrollback().get(index)
    }

    pub fn scrollback_cell(&self, index: usize, col: usize) -> Cell {
        self.state.screen.scrollback().cell(index, col)
    }

    /// Serializable view of the visible state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.state.screen, &self.state.title)
    }
}

impl<L: EventListener> Perform for TermState<L> {
    fn character_received(&mut self, c: char) {
        self.stats.characters += 1;
        match c {
            '\r' => self.screen.carriage_return(),
            '\n' => self.screen.linefeed(),
            '\t' => self.screen.tab(),
            '\x08' => self.screen.backspace(),
            '\x07' => {
                self.stats.bells += 1;
                self.listener.send_event(Event::Bell);
            }
            c if c.is_control() => {
                trace!(code = c as u32, "swallowed control character");
            }
            c => self.screen.put_char(c),
        }
    }

    fn command_received(&mut self, command: Command) {
        self.stats.commands += 1;
        let handled = match command {
            Command::Csi(csi) => self.execute_csi(&csi),
            Command::Osc(osc) => self.execute_osc(&osc),
            Command::SingleChar(c) => self.execute_single(c),
        };
        if !handled {
            self.stats.ignored_commands += 1;
        }
    }
}

impl<L: EventListener> TermState<L> {
    /// Execute a CSI sequence. Returns false if it was ignored.
    fn execute_csi(&mut self, csi: &CsiCommand) -> bool {
        if !csi.is_plain() {
            trace!(raw = ?csi.raw, "ignoring CSI with leader or intermediates");
            return false;
        }
        if csi.private {
            return self.execute_csi_private(csi);
        }

        let count = csi.param_or_default(0, 1) as usize;
        match csi.final_char {
            // Cursor movement
            'A' => self.screen.cursor_up(count),
            'B' => self.screen.cursor_down(count),
            'C' => self.screen.cursor_forward(count),
            'D' => self.screen.cursor_backward(count),
            'E' => {
                // CNL - Cursor Next Line
                self.screen.cursor_down(count);
                self.screen.carriage_return();
            }
            'F' => {
                // CPL - Cursor Previous Line
                self.screen.cursor_up(count);
                self.screen.carriage_return();
            }
            'G' | '`' => self.screen.goto_col(count - 1),
            'H' | 'f' => {
                let row = csi.param_or_default(0, 1) as usize - 1;
                let col = csi.param_or_default(1, 1) as usize - 1;
                self.screen.goto(row, col);
            }
            'd' => self.screen.goto_row(count - 1),

            // Erase operations
            'J' => self.screen.erase_in_display(csi.param(0, 0)),
            'K' => self.screen.erase_in_line(csi.param(0, 0)),

            // Insert/Delete
            'L' => self.screen.insert_lines(count),
            'M' => self.screen.delete_lines(count),
            '@' => self.screen.insert_chars(count),
            'P' => self.screen.delete_chars(count),

            // Scroll
            'S' => self.screen.scroll_up(count),
            'T' => self.screen.scroll_down(count),

            'r' => {
                // DECSTBM - fewer than two parameters resets the region
                let (top, bottom) = match csi.params.as_slice() {
                    [top, bottom, ..] => (Some(*top), Some(*bottom)),
                    _ => (None, None),
                };
                self.screen.set_scroll_region(top, bottom);
            }

            'm' => self.execute_sgr(&csi.params),

            'h' | 'l' => {
                let enable = csi.final_char == 'h';
                for &mode in &csi.params {
                    if !self.screen.modes_mut().set_ansi_mode(mode, enable) {
                        trace!(mode, enable, "unsupported ANSI mode");
                    }
                }
            }

            't' => return self.window_op(csi.param(0, 0)),

            _ => {
                trace!(raw = ?csi.raw, "unhandled CSI");
                return false;
            }
        }
        true
    }

    /// `CSI ? ...` sequences: only mode set/reset is meaningful
    fn execute_csi_private(&mut self, csi: &CsiCommand) -> bool {
        let enable = match csi.final_char {
            'h' => true,
            'l' => false,
            _ => {
                trace!(raw = ?csi.raw, "unhandled private CSI");
                return false;
            }
        };
        for &mode in &csi.params {
            self.set_dec_mode(mode, enable);
        }
        true
    }

    fn set_dec_mode(&mut self, mode: u32, enable: bool) {
        match mode {
            1049 if enable => self.screen.enter_alternate_screen(),
            1049 => self.screen.exit_alternate_screen(),
            _ => {
                if !self.screen.modes_mut().set_dec_mode(mode, enable) {
                    trace!(mode, enable, "unsupported DEC private mode");
                }
            }
        }
    }

    /// Select Graphic Rendition
    fn execute_sgr(&mut self, params: &[u32]) {
        let attrs = self.screen.attrs_mut();
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => attrs.reset(),
                1 => attrs.style.set_bold(),
                2 => attrs.style.set_faint(),
                3 => attrs.style.italic = true,
                4 => attrs.style.underline = true,
                5 | 6 => attrs.style.blink = true,
                7 => attrs.style.reverse = true,
                8 => attrs.style.conceal = true,
                9 => attrs.style.crossed_out = true,
                21 => attrs.style.double_underline = true,
                22 => {
                    attrs.style.bold = false;
                    attrs.style.faint = false;
                }
                23 => attrs.style.italic = false,
                24 => {
                    attrs.style.underline = false;
                    attrs.style.double_underline = false;
                }
                25 => attrs.style.blink = false,
                27 => attrs.style.reverse = false,
                28 => attrs.style.conceal = false,
                29 => attrs.style.crossed_out = false,
                53 => attrs.style.overline = true,
                55 => attrs.style.overline = false,
                n @ 30..=37 => attrs.fg = Color::Indexed((n - 30) as u8),
                n @ 40..=47 => attrs.bg = Color::Indexed((n - 40) as u8),
                n @ 90..=97 => attrs.fg = Color::Indexed((n - 90 + 8) as u8),
                n @ 100..=107 => attrs.bg = Color::Indexed((n - 100 + 8) as u8),
                39 => attrs.fg = Color::DEFAULT_FG,
                49 => attrs.bg = Color::DEFAULT_BG,
                selector @ (38 | 48) => match extended_color(&params[i + 1..]) {
                    ExtendedColor::Parsed(color, consumed) => {
                        if selector == 38 {
                            attrs.fg = color;
                        } else {
                            attrs.bg = color;
                        }
                        i += consumed;
                    }
                    ExtendedColor::Truncated => {
                        trace!(?params, "truncated extended color");
                        break;
                    }
                    ExtendedColor::Unsupported => {
                        trace!(?params, "unsupported extended color form");
                    }
                },
                other => trace!(param = other, "unsupported SGR parameter"),
            }
            i += 1;
        }
    }

    /// CSI n t
    fn window_op(&mut self, op: u32) -> bool {
        match op {
            22 => {
                self.saved_title = Some(self.title.clone());
                true
            }
            23 => {
                if let Some(title) = self.saved_title.clone() {
                    self.title = title;
                }
                self.listener
                    .send_event(Event::TitleChanged(self.title.clone()));
                true
            }
            _ => {
                trace!(op, "unsupported window operation");
                false
            }
        }
    }

    fn execute_osc(&mut self, osc: &OscCommand) -> bool {
        match (osc.code, osc.payload()) {
            (0 | 2, Some(payload)) => {
                self.title = payload.chars().take(MAX_TITLE_LEN).collect();
                debug!(title = %self.title, "title changed");
                self.listener
                    .send_event(Event::TitleChanged(self.title.clone()));
                true
            }
            _ => {
                trace!(code = osc.code, "unhandled OSC");
                false
            }
        }
    }

    fn execute_single(&mut self, c: char) -> bool {
        match c {
            // VT52 cursor down
            'B' => self.screen.cursor_down(1),
            '7' => self.screen.save_cursor(),
            '8' => self.screen.restore_cursor(),
            _ => {
                trace!(final_char = %c, "unhandled escape");
                return false;
            }
        }
        true
    }
}

/// Result of reading the tail of an SGR 38/48
enum ExtendedColor {
    /// Color and the number of extra parameters it used
    Parsed(Color, usize),
    /// The selected form needs more parameters than remain
    Truncated,
    /// Neither `5` nor `2`
    Unsupported,
}

fn extended_color(rest: &[u32]) -> ExtendedColor {
    let channel = |v: u32| v.min(255) as u8;
    match rest {
        [5, index, ..] => ExtendedColor::Parsed(Color::Indexed(channel(*index)), 2),
        [2, r, g, b, ..] => {
            ExtendedColor::Parsed(Color::Rgb(channel(*r), channel(*g), channel(*b)), 4)
        }
        [] | [5] | [2, ..] => ExtendedColor::Truncated,
        _ => ExtendedColor::Unsupported,
    }
}
