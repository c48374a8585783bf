//! # Subscriber extension point.
//!
//! Anything that wants to react to slot activity (rotation audit trail,
//! wallet usage counters, alerting on repeated crashes) implements [`Subscribe`]
//! and is handed to [`SupervisorBuilder::with_subscribers`](crate::SupervisorBuilder::with_subscribers).
//!
//! The supervisor loop never waits on a subscriber: each one is fed from its own
//! bounded queue by its own task, and a panic inside `on_event` is caught and
//! turned into a `SubscriberPanicked` event.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use slotvisor::{Event, EventKind, ExitClass, Subscribe};
//!
//! #[derive(Default)]
//! struct CrashCounter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for CrashCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::WorkerExited && ev.exit == Some(ExitClass::Crash) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "crash-counter"
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receives every runtime event, in publication order.
///
/// Keep `on_event` short and non-blocking; a subscriber that falls behind
/// only loses its own events (reported as `SubscriberOverflow`).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event.
    async fn on_event(&self, event: &Event);

    /// Name shown in overflow and panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue (min 1). Default: 1024.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
