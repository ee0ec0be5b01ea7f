//! Terminal events
//!
//! Notifications raised while processing data. Listeners are called
//! synchronously from inside `Terminal::process_data`, in stream order,
//! before the next character or command is applied.

use std::sync::mpsc::Sender;

/// Something the host UI should react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// BEL (0x07) was received
    Bell,
    /// The window title was set (OSC 0/2) or restored (CSI 23 t)
    TitleChanged(String),
}

/// Receiver of terminal events
pub trait EventListener {
    fn send_event(&mut self, _event: Event) {}
}

/// Listener that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct VoidListener;

impl EventListener for VoidListener {}

/// Collects events in order
impl EventListener for Vec<Event> {
    fn send_event(&mut self, event: Event) {
        self.push(event);
    }
}

/// Forwards events to another thread. A hung-up receiver is ignored.
impl EventListener for Sender<Event> {
    fn send_event(&mut self, event: Event) {
        let _ = self.send(event);
    }
}

impl<L: EventListener + ?Sized> EventListener for &mut L {
    fn send_event(&mut self, event: Event) {
        (**self).send_event(event);
    }
}
