//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Cell representation with colors and style flags
//! - Lines with per-line dirty tracking
//! - Cursor state and DECSC/DECRC save slots
//! - Screen model (main and alternate buffers, scroll region)
//! - Bounded scrollback
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of
//! characters and commands, it always produces the same state.

mod cell;
mod cursor;
mod line;
mod modes;
mod screen;
mod scrollback;
mod snapshot;

pub use cell::{Attributes, Cell, Color, Style};
pub use cursor::{Cursor, SavedCursor, TAB_WIDTH};
pub use line::Line;
pub use modes::Modes;
pub use screen::Screen;
pub use scrollback::Scrollback;
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, Snapshot, StyleSnapshot};
