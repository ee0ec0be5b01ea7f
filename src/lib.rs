//! vtgrid: VT100/xterm terminal emulation engine
//!
//! A streaming escape-sequence parser and the screen model it drives. Feed
//! decoded text from a remote shell into [`Terminal::process_data`], then read
//! the grid, the cursor and the dirty lines back out. Nothing here performs
//! I/O or draws anything.
//!
//! - `parser`: escape sequence state machine
//! - `core`: cells, lines, cursor, screen buffers, snapshots
//! - `terminal`: applies parser events to the screen, raises events
//! - `config`: JSON configuration and the color palette
//! - `shared`: mutex-guarded handle for multi-threaded hosts
//!
//! ```
//! use vtgrid::Terminal;
//!
//! let mut term = Terminal::new(80, 24);
//! term.process_data("\x1b[5;10HX");
//! assert_eq!(term.cell(4, 9).c, 'X');
//! ```

pub mod config;
pub mod core;
pub mod event;
pub mod parser;
pub mod shared;
pub mod terminal;

pub use config::{ColorPalette, ConfigError, TerminalConfig};
pub use core::{Attributes, Cell, Color, Line, Snapshot, Style};
pub use event::{Event, EventListener, VoidListener};
pub use parser::{Action, Command, CsiCommand, OscCommand, Parser, Perform};
pub use shared::SharedTerminal;
pub use terminal::{ProcessStats, Terminal};
