//! Terminal escape sequence parser
//!
//! A streaming state machine that turns already-decoded text into characters
//! and commands (CSI, OSC, single-character escapes), strictly in input order.

mod command;
mod state;

pub use command::{parse_params, Action, Command, CsiCommand, OscCommand, Perform};
pub use state::Parser;
