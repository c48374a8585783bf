//! # Event subscribers for the slotvisor runtime.
//!
//! ## Architecture
//! ```text
//! Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                              │
//!                                                   ┌──────────┼──────────┐
//!                                                   ▼          ▼          ▼
//!                                               LogWriter   Metrics    Custom
//! ```
//!
//! - [`Subscribe`] extension trait
//! - [`SubscriberSet`] per-subscriber queues, workers and panic isolation
//! - [`LogWriter`] built-in `tracing` sink

mod log;
mod set;
mod subscriber;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
