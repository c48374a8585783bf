//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. The supervisor
//! publishes every launch, exit and rotation; one listener forwards them to the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: the supervisor loop never waits on observers.
//! - **Bounded capacity**: slow listeners observe `RecvError::Lagged(n)`.
//! - **No persistence**: events sent with no receiver are dropped.
//! - **Drain on close**: once every `Bus` clone is dropped, receivers still get
//!   the buffered events before `RecvError::Closed`.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; never blocks.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
