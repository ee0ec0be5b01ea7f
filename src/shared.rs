//! Thread-shared terminal handle
//!
//! A network thread feeds data while a UI thread reads the grid. Both go
//! through the same mutex, so a reader never sees a half-applied chunk.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::{EventListener, VoidListener};
use crate::terminal::Terminal;

/// Cloneable, mutex-guarded [`Terminal`]
pub struct SharedTerminal<L: EventListener = VoidListener> {
    inner: Arc<Mutex<Terminal<L>>>,
}

impl<L: EventListener> Clone for SharedTerminal<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: EventListener> SharedTerminal<L> {
    pub fn new(terminal: Terminal<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(terminal)),
        }
    }

    // A panic while holding the lock leaves a terminal that is still
    // structurally valid, so poisoning is not fatal.
    fn lock(&self) -> MutexGuard<'_, Terminal<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Feed data under the lock
    pub fn process_data(&self, data: &str) {
        self.lock().process_data(data);
    }

    /// Run `f` with exclusive access to the terminal
    pub fn with_terminal<R>(&self, f: impl FnOnce(&mut Terminal<L>) -> R) -> R {
        f(&mut self.lock())
    }
}
