//! Parser State Machine
//!
//! Converts a character stream into an ordered sequence of characters and
//! commands. The parser carries partial sequences across calls, so input may
//! be split at any point.
//!
//! # States
//!
//! - Normal: text; `ESC` starts a sequence
//! - Escape: after `ESC`, waiting for the introducer or final character
//! - Csi: `ESC [` collecting parameter and intermediate bytes
//! - Osc: `ESC ]` collecting a string terminated by BEL, ST, CR or LF
//! - Dcs: `ESC P`, consumed and discarded
//! - Nf: `ESC #` line-size sequences
//! - EscapeIntermediate: `ESC (` and friends (character set designation)
//!
//! The parser never fails. Unrecognised input is either handed back as
//! ordinary characters or dropped where the sequence type has no sensible
//! literal rendering (OSC, DCS).

use tracing::trace;

use super::command::{parse_params, Action, Command, CsiCommand, OscCommand, Perform};

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// Cap on bytes buffered for a single sequence; further bytes are dropped
/// while the sequence itself continues to be tracked.
const MAX_SEQUENCE_LEN: usize = 4096;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Escape,
    Csi,
    Osc,
    Dcs,
    Nf,
    EscapeIntermediate,
}

/// The escape sequence parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Bytes collected for the sequence in progress
    buffer: String,
    /// Last OSC or DCS byte was ESC (first half of the ST terminator)
    string_escape_seen: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the normal state
    pub fn new() -> Self {
        Self {
            state: State::Normal,
            buffer: String::with_capacity(64),
            string_escape_seen: false,
        }
    }

    /// Drop any partial sequence and return to the normal state
    pub fn reset(&mut self) {
        self.state = State::Normal;
        self.buffer.clear();
        self.string_escape_seen = false;
    }

    /// True when no sequence is in progress
    pub fn is_idle(&self) -> bool {
        self.state == State::Normal
    }

    /// Feed a chunk of text, invoking `performer` for every event in order
    pub fn advance<P: Perform + ?Sized>(&mut self, data: &str, performer: &mut P) {
        for c in data.chars() {
            self.process_char(c, performer);
        }
    }

    /// Feed a chunk of text and collect the resulting events
    pub fn parse(&mut self, data: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        self.advance(data, &mut actions);
        actions
    }

    fn process_char<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        match self.state {
            State::Normal => self.process_normal(c, performer),
            State::Escape => self.process_escape(c, performer),
            State::Csi => self.process_csi(c, performer),
            State::Osc => self.process_osc(c, performer),
            State::Dcs => self.process_dcs(c, performer),
            State::Nf => self.process_nf(c, performer),
            State::EscapeIntermediate => self.process_escape_intermediate(c),
        }
    }

    fn enter_escape(&mut self) {
        self.state = State::Escape;
        self.buffer.clear();
        self.string_escape_seen = false;
    }

    fn collect(&mut self, c: char) {
        if self.buffer.len() < MAX_SEQUENCE_LEN {
            self.buffer.push(c);
        }
    }

    fn process_normal<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        if c == ESC {
            self.enter_escape();
        } else {
            performer.character_received(c);
        }
    }

    fn process_escape<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        match c {
            '[' => self.state = State::Csi,
            ']' => {
                self.state = State::Osc;
                self.string_escape_seen = false;
            }
            'P' => {
                self.state = State::Dcs;
                self.string_escape_seen = false;
            }
            '#' => self.state = State::Nf,
            '7' | '8' | 'N' | 'O' | 'X' | '^' | '_' => {
                self.state = State::Normal;
                performer.command_received(Command::SingleChar(c));
            }
            // Intermediate bytes
            '\x20'..='\x2f' => {
                self.collect(c);
                self.state = State::EscapeIntermediate;
            }
            // Recognised but not implemented
            's' | 'u' | '=' | '>' | '\x40'..='\x5f' => {
                trace!(final_char = ?c, "ignoring escape sequence");
                self.state = State::Normal;
            }
            _ => {
                trace!(final_char = ?c, "unrecognised escape, passing through");
                self.state = State::Normal;
                performer.character_received(ESC);
                performer.character_received(c);
            }
        }
    }

    fn process_csi<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        match c {
            ESC => {
                trace!(sequence = %self.buffer, "CSI interrupted by ESC");
                self.enter_escape();
            }
            BEL => {
                trace!(sequence = %self.buffer, "CSI aborted by BEL");
                self.state = State::Normal;
                self.buffer.clear();
            }
            // Parameter and intermediate bytes
            '\x20'..='\x3f' => self.collect(c),
            // Final bytes
            '\x40'..='\x7e' => {
                self.state = State::Normal;
                if is_csi_final(c) {
                    let command = self.build_csi(c);
                    self.buffer.clear();
                    performer.command_received(Command::Csi(command));
                } else {
                    trace!(sequence = %self.buffer, final_char = ?c, "unknown CSI final");
                    self.buffer.clear();
                    performer.character_received(c);
                }
            }
            // C0 controls are executed without disturbing the sequence
            c if c.is_control() => performer.character_received(c),
            _ => {
                trace!(sequence = %self.buffer, "CSI aborted by non-ASCII character");
                self.state = State::Normal;
                self.buffer.clear();
                performer.character_received(c);
            }
        }
    }

    fn build_csi(&self, final_char: char) -> CsiCommand {
        let text = self.buffer.as_str();
        let leader = text
            .chars()
            .next()
            .filter(|c| matches!(c, '<' | '=' | '>'));
        let intermediates: String = text
            .chars()
            .filter(|c| matches!(c, '\x20'..='\x2f'))
            .collect();

        CsiCommand {
            params: parse_params(text),
            final_char,
            private: text.starts_with('?'),
            leader,
            intermediates,
            raw: format!("\x1b[{}{}", text, final_char),
        }
    }

    fn process_osc<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        if self.string_escape_seen {
            self.string_escape_seen = false;
            if c == '\\' {
                self.finish_osc(performer);
            } else {
                // Not a string terminator: drop the OSC, this ESC starts afresh
                trace!(data = %self.buffer, "OSC interrupted by escape sequence");
                self.enter_escape();
                self.process_escape(c, performer);
            }
            return;
        }

        match c {
            BEL | '\r' | '\n' => self.finish_osc(performer),
            ESC => self.string_escape_seen = true,
            c if !c.is_control() => self.collect(c),
            _ => {
                trace!(data = %self.buffer, "malformed OSC dropped");
                self.state = State::Normal;
                self.buffer.clear();
            }
        }
    }

    fn finish_osc<P: Perform + ?Sized>(&mut self, performer: &mut P) {
        self.state = State::Normal;
        let data = std::mem::take(&mut self.buffer);
        performer.command_received(Command::Osc(OscCommand::new(data)));
    }

    fn process_dcs<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        if self.string_escape_seen {
            // ESC already ended the DCS; only the backslash of ST belongs to it
            self.string_escape_seen = false;
            self.state = State::Normal;
            self.buffer.clear();
            if c != '\\' {
                self.process_normal(c, performer);
            }
            return;
        }

        match c {
            ESC => {
                trace!(data = %self.buffer, "DCS ended by ESC");
                self.string_escape_seen = true;
            }
            '\x20'..='\x3f' => self.collect(c),
            // Final byte, including a bare backslash
            '\x40'..='\x7e' => {
                trace!(data = %self.buffer, "DCS discarded");
                self.state = State::Normal;
                self.buffer.clear();
            }
            _ => {}
        }
    }

    fn process_nf<P: Perform + ?Sized>(&mut self, c: char, performer: &mut P) {
        self.state = State::Normal;
        if matches!(c, '3'..='6') {
            performer.command_received(Command::SingleChar(c));
        } else {
            trace!(final_char = ?c, "ignoring ESC # sequence");
        }
    }

    fn process_escape_intermediate(&mut self, c: char) {
        if c == ESC {
            self.enter_escape();
            return;
        }
        trace!(intermediates = %self.buffer, final_char = ?c, "character set designation ignored");
        self.state = State::Normal;
        self.buffer.clear();
    }
}

/// Final characters accepted for CSI dispatch
fn is_csi_final(c: char) -> bool {
    matches!(c, '@' | 'A'..='P' | 'S' | 'T' | 'X' | 'Z' | '`' | 'a'..='z')
        && !matches!(c, 'o' | 'v' | 'w' | 'y')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csi(action: &Action) -> &CsiCommand {
        match action {
            Action::Command(Command::Csi(csi)) => csi,
            other => panic!("Expected CSI command, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_print() {
        let mut parser = Parser::new();
        let actions = parser.parse("Hello");

        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Character('H'));
        assert_eq!(actions[4], Action::Character('o'));
    }

    #[test]
    fn test_parser_c0_controls_are_characters() {
        let mut parser = Parser::new();
        let actions = parser.parse("A\nB\rC\x07");

        assert_eq!(
            actions,
            vec![
                Action::Character('A'),
                Action::Character('\n'),
                Action::Character('B'),
                Action::Character('\r'),
                Action::Character('C'),
                Action::Character('\x07'),
            ]
        );
    }

    #[test]
    fn test_parser_csi_cursor_up() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[5A");

        assert_eq!(actions.len(), 1);
        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![5]);
        assert_eq!(csi.final_char, 'A');
        assert!(!csi.private);
        assert_eq!(csi.raw, "\x1b[5A");
    }

    #[test]
    fn test_parser_csi_cup() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[10;20H");

        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![10, 20]);
        assert_eq!(csi.final_char, 'H');
    }

    #[test]
    fn test_parser_csi_private() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[?1049h");

        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![1049]);
        assert_eq!(csi.final_char, 'h');
        assert!(csi.private);
        assert!(csi.is_plain());
    }

    #[test]
    fn test_parser_csi_leader_and_intermediates() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[>4;1m\x1b[2 q");

        let first = csi(&actions[0]);
        assert_eq!(first.leader, Some('>'));
        assert_eq!(first.params, vec![4, 1]);
        assert!(!first.is_plain());

        let second = csi(&actions[1]);
        assert_eq!(second.intermediates, " ");
        assert_eq!(second.final_char, 'q');
    }

    #[test]
    fn test_parser_empty_params() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[H");

        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![0]);
    }

    #[test]
    fn test_parser_csi_sgr() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[1;31;48;2;255;128;0m");

        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![1, 31, 48, 2, 255, 128, 0]);
        assert_eq!(csi.final_char, 'm');
    }

    #[test]
    fn test_parser_csi_unknown_final_is_passed_through() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[5~x");

        assert_eq!(actions, vec![Action::Character('~'), Action::Character('x')]);
        assert!(parser.is_idle());
    }

    #[test]
    fn test_parser_csi_bel_aborts_silently() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[12\x07A");

        assert_eq!(actions, vec![Action::Character('A')]);
    }

    #[test]
    fn test_parser_csi_restarted_by_escape() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[12\x1b[3B");

        assert_eq!(actions.len(), 1);
        let csi = csi(&actions[0]);
        assert_eq!(csi.params, vec![3]);
        assert_eq!(csi.final_char, 'B');
    }

    #[test]
    fn test_parser_csi_executes_embedded_controls() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b[1\r2H");

        assert_eq!(actions[0], Action::Character('\r'));
        assert_eq!(csi(&actions[1]).params, vec![12]);
    }

    #[test]
    fn test_parser_single_char_commands() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b7\x1b8\x1bN");

        assert_eq!(
            actions,
            vec![
                Action::Command(Command::SingleChar('7')),
                Action::Command(Command::SingleChar('8')),
                Action::Command(Command::SingleChar('N')),
            ]
        );
    }

    #[test]
    fn test_parser_ignored_escapes() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b=\x1b>\x1bM\x1bsA");

        assert_eq!(actions, vec![Action::Character('A')]);
    }

    #[test]
    fn test_parser_malformed_escape_passthrough() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1bq");

        assert_eq!(
            actions,
            vec![Action::Character('\x1b'), Action::Character('q')]
        );
    }

    #[test]
    fn test_parser_double_escape() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b\x1b[2J");

        // The second ESC is not a valid escape final: both pass through
        let expected: Vec<Action> = "\x1b\x1b[2J".chars().map(Action::Character).collect();
        assert_eq!(actions, expected);
        assert!(parser.is_idle());
    }

    #[test]
    fn test_parser_osc_title_bel() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]0;My Title\x07");

        assert_eq!(
            actions,
            vec![Action::Command(Command::Osc(OscCommand {
                code: 0,
                data: "0;My Title".to_string(),
            }))]
        );
    }

    #[test]
    fn test_parser_osc_terminators() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]2;a\x1b\\\x1b]2;b\r\x1b]2;c\n");

        let codes: Vec<_> = actions
            .iter()
            .map(|action| match action {
                Action::Command(Command::Osc(osc)) => osc.data.clone(),
                other => panic!("Expected OSC, got {:?}", other),
            })
            .collect();
        assert_eq!(codes, vec!["2;a", "2;b", "2;c"]);
    }

    #[test]
    fn test_parser_osc_non_numeric_code() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]abc;def\x07");

        match &actions[0] {
            Action::Command(Command::Osc(osc)) => assert_eq!(osc.code, 0),
            other => panic!("Expected OSC, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_osc_malformed_is_dropped() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]0;abc\x01def");

        assert_eq!(
            actions,
            vec![
                Action::Character('d'),
                Action::Character('e'),
                Action::Character('f'),
            ]
        );
    }

    #[test]
    fn test_parser_osc_interrupted_by_csi() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b]0;abc\x1b[1m");

        assert_eq!(actions.len(), 1);
        assert_eq!(csi(&actions[0]).final_char, 'm');
    }

    #[test]
    fn test_parser_dcs_consumed() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1bP1;2|X\x1bP0\x1b\\Y");

        // `|` ends the first DCS, the second ends at ST
        assert_eq!(actions, vec![Action::Character('X'), Action::Character('Y')]);
    }

    #[test]
    fn test_parser_dcs_ended_by_bare_escape() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1bP1\x1bqZ");

        // ESC ends the DCS without surfacing; what follows is plain text
        assert_eq!(actions, vec![Action::Character('q'), Action::Character('Z')]);
        assert!(parser.is_idle());
    }

    #[test]
    fn test_parser_dcs_escape_split_across_chunks() {
        let mut parser = Parser::new();
        let mut actions = parser.parse("\x1bP1;2\x1b");
        assert!(actions.is_empty());

        actions.extend(parser.parse("\\ok\x1bP\x1b\x1b[1m"));
        assert_eq!(actions[..2], [Action::Character('o'), Action::Character('k')]);
        // An ESC right after the DCS ended starts a new sequence
        assert_eq!(csi(&actions[2]).final_char, 'm');
        assert_eq!(actions.len(), 3);
    }

    #[test]
    fn test_parser_nf_sequences() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b#3\x1b#8Z");

        assert_eq!(
            actions,
            vec![
                Action::Command(Command::SingleChar('3')),
                Action::Character('Z'),
            ]
        );
    }

    #[test]
    fn test_parser_designate_charset_is_noop() {
        let mut parser = Parser::new();
        let actions = parser.parse("\x1b(B\x1b)0ok");

        assert_eq!(actions, vec![Action::Character('o'), Action::Character('k')]);
    }

    #[test]
    fn test_parser_chunk_boundary() {
        let mut parser = Parser::new();

        let actions1 = parser.parse("\x1b[");
        let actions2 = parser.parse("5");
        let actions3 = parser.parse("A");

        assert!(actions1.is_empty());
        assert!(actions2.is_empty());
        assert_eq!(actions3.len(), 1);
        assert_eq!(csi(&actions3[0]).params, vec![5]);
    }

    #[test]
    fn test_parser_osc_st_split_across_chunks() {
        let mut parser = Parser::new();

        assert!(parser.parse("\x1b]2;split\x1b").is_empty());
        let actions = parser.parse("\\");
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_parser_unicode_text() {
        let mut parser = Parser::new();
        let actions = parser.parse("Hi 世界");

        assert_eq!(actions.len(), 5);
        assert_eq!(actions[3], Action::Character('世'));
    }

    #[test]
    fn test_parser_reset() {
        let mut parser = Parser::new();
        parser.parse("\x1b[12");
        assert!(!parser.is_idle());

        parser.reset();
        assert!(parser.is_idle());
        assert_eq!(parser.parse("A"), vec![Action::Character('A')]);
    }

    #[test]
    fn test_csi_final_whitelist() {
        for c in ['@', 'A', 'H', 'P', 'S', 'T', 'X', 'Z', '`', 'd', 'm', 'r', 't'] {
            assert!(is_csi_final(c), "{c:?} should be a CSI final");
        }
        for c in ['Q', 'R', 'Y', '[', '~', '{', 'o'] {
            assert!(!is_csi_final(c), "{c:?} should not be a CSI final");
        }
    }
}
