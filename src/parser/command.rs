//! Parser output
//!
//! The parser produces exactly two kinds of events: a character that was not
//! consumed by an escape structure, and a fully parsed command.

use serde::{Deserialize, Serialize};

/// A single event emitted by the parser, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// A printable or control character to hand to the screen
    Character(char),
    /// A fully parsed command
    Command(Command),
}

impl Action {
    /// Check if this is a character event
    pub fn is_character(&self) -> bool {
        matches!(self, Action::Character(_))
    }

    /// Check if this is a command event
    pub fn is_command(&self) -> bool {
        matches!(self, Action::Command(_))
    }
}

/// A recognised escape sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Control Sequence Introducer (`ESC [`)
    Csi(CsiCommand),
    /// Operating System Command (`ESC ]`)
    Osc(OscCommand),
    /// Single-character escape (`ESC 7`, `ESC # 3`, ...)
    SingleChar(char),
}

/// A parsed CSI sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiCommand {
    /// Numeric parameters, never empty (an empty list parses as `[0]`)
    pub params: Vec<u32>,
    /// The final character that identifies the command
    pub final_char: char,
    /// Sequence began with `?` (DEC private parameters)
    pub private: bool,
    /// Any other leading marker (`<`, `=`, `>`)
    pub leader: Option<char>,
    /// Intermediate bytes (0x20-0x2F) found before the final character
    pub intermediates: String,
    /// Source text, including the `ESC [` introducer
    pub raw: String,
}

impl CsiCommand {
    /// Build a plain (non-private) command from parameters and a final character
    pub fn new(final_char: char, params: Vec<u32>) -> Self {
        let mut raw = String::from("\x1b[");
        raw.push_str(
            &params
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        );
        raw.push(final_char);

        Self {
            params: if params.is_empty() { vec![0] } else { params },
            final_char,
            private: false,
            leader: None,
            intermediates: String::new(),
            raw,
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u32) -> u32 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u32) -> u32 {
        match self.params.get(index) {
            Some(&0) | None => default,
            Some(&v) => v,
        }
    }

    /// True when the sequence carries neither a non-`?` leader nor intermediates
    pub fn is_plain(&self) -> bool {
        self.leader.is_none() && self.intermediates.is_empty()
    }
}

/// A parsed OSC string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscCommand {
    /// Integer before the first `;` (0 if absent or not numeric)
    pub code: u32,
    /// The full accumulated string, e.g. `0;My Title`
    pub data: String,
}

impl OscCommand {
    pub fn new(data: String) -> Self {
        let code = data
            .split(';')
            .next()
            .and_then(|head| head.parse().ok())
            .unwrap_or(0);
        Self { code, data }
    }

    /// Text after the first `;`, if there is one
    pub fn payload(&self) -> Option<&str> {
        self.data.split_once(';').map(|(_, rest)| rest)
    }
}

/// Parse a CSI parameter string leniently.
///
/// A leading `?` is stripped, every character other than digits and `;` is
/// dropped, and each `;`-separated chunk becomes a non-negative integer
/// (0 when empty or out of range). An empty string yields `[0]`. This never
/// fails.
pub fn parse_params(text: &str) -> Vec<u32> {
    let text = text.strip_prefix('?').unwrap_or(text);
    let filtered: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ';')
        .collect();

    if filtered.is_empty() {
        return vec![0];
    }

    filtered
        .split(';')
        .map(|chunk| chunk.parse::<u32>().unwrap_or(0))
        .collect()
}

/// Receiver of parser events.
///
/// Callbacks run synchronously while [`Parser::advance`](super::Parser::advance)
/// walks its input; a handler finishes before the next character is examined.
pub trait Perform {
    /// A character that was not consumed by an escape structure
    fn character_received(&mut self, c: char);

    /// A fully parsed command
    fn command_received(&mut self, command: Command);
}

impl Perform for Vec<Action> {
    fn character_received(&mut self, c: char) {
        self.push(Action::Character(c));
    }

    fn command_received(&mut self, command: Command) {
        self.push(Action::Command(command));
    }
}
