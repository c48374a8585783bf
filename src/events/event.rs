//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Pool events**: wallet pool prepared, wallet generated
//! - **Slot events**: worker launched, launch failed, worker exited, slot rotated
//! - **Shutdown events**: interruption observed, cooperative join done, fault, forced kill
//! - **Subscriber events**: overflow, panic
//!
//! The [`Event`] struct carries the metadata: slot index, old and new wallet,
//! exit class and raw code, launch attempt, reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Event, EventKind, ExitClass, WalletId};
//!
//! let ev = Event::new(EventKind::SlotRotated)
//!     .with_slot(0)
//!     .with_previous(WalletId(1))
//!     .with_wallet(WalletId(3))
//!     .with_exit(ExitClass::Success);
//!
//! assert_eq!(ev.kind, EventKind::SlotRotated);
//! assert_eq!(ev.slot, Some(0));
//! assert_eq!(ev.wallet, Some(WalletId(3)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::wallets::WalletId;
use crate::workers::ExitClass;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Pool events ===
    /// Principals and replacement queue are built.
    ///
    /// Sets:
    /// - `attempt`: number of slots
    /// - `reason`: `principals=.. queued=.. next_id=..`
    PoolReady,

    /// A new wallet was generated and persisted.
    ///
    /// Sets:
    /// - `wallet`: new identity
    /// - `slot`: requesting slot (absent while the pool is prepared)
    WalletGenerated,

    // === Slot events ===
    /// A worker was started for a slot.
    ///
    /// Sets:
    /// - `slot`, `wallet`
    /// - `attempt`: launch count of this slot (1-based)
    /// - `pid`: worker process id, if any
    SlotLaunched,

    /// A worker could not be started; the slot is retried on the next scan.
    ///
    /// Sets:
    /// - `slot`, `wallet`, `attempt`
    /// - `reason`: launch error
    ///
    /// Also published without `attempt` when a rotation found no next wallet;
    /// `wallet` is then the one that just ran and `exit` the pending exit class.
    LaunchFailed,

    /// A worker terminated.
    ///
    /// Sets:
    /// - `slot`, `wallet`
    /// - `exit`: exit class
    /// - `code`: raw exit code (absent on signal death)
    WorkerExited,

    /// Rotation decision for a slot.
    ///
    /// Sets:
    /// - `slot`
    /// - `previous`: wallet that ran before
    /// - `wallet`: wallet that runs next
    /// - `exit`: triggering exit class
    /// - `reason`: where the next wallet came from (`queue`, `generated`, `principal`, `same`)
    SlotRotated,

    // === Shutdown events ===
    /// Interruption observed; cooperative join starts.
    ShutdownRequested,

    /// Every live worker exited on its own.
    ///
    /// Sets:
    /// - `attempt`: number of workers joined
    AllStopped,

    /// The supervisor loop failed with an internal error.
    ///
    /// Sets:
    /// - `reason`: error message
    SupervisorFault,

    /// A live worker was killed after an internal fault.
    ///
    /// Sets:
    /// - `slot`, `wallet`, `pid`
    ForcedTermination,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Slot index.
    pub slot: Option<usize>,
    /// Wallet the event is about (the new one for rotations).
    pub wallet: Option<WalletId>,
    /// Wallet that ran before a rotation.
    pub previous: Option<WalletId>,
    /// Exit class of the worker.
    pub exit: Option<ExitClass>,
    /// Raw exit code of the worker.
    pub code: Option<i32>,
    /// Launch count or joined-worker count, depending on the kind.
    pub attempt: Option<u64>,
    /// Worker process id.
    pub pid: Option<u32>,
    /// Human-readable reason (errors, rotation source, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            wallet: None,
            previous: None,
            exit: None,
            code: None,
            attempt: None,
            pid: None,
            reason: None,
        }
    }

    /// Attaches a slot index.
    #[inline]
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Attaches the wallet the event is about.
    #[inline]
    pub fn with_wallet(mut self, wallet: WalletId) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Attaches the wallet that ran before.
    #[inline]
    pub fn with_previous(mut self, wallet: WalletId) -> Self {
        self.previous = Some(wallet);
        self
    }

    /// Attaches an exit class.
    #[inline]
    pub fn with_exit(mut self, exit: ExitClass) -> Self {
        self.exit = Some(exit);
        self
    }

    /// Attaches a raw exit code, if any.
    #[inline]
    pub fn with_code(mut self, code: Option<i32>) -> Self {
        self.code = code;
        self
    }

    /// Attaches an attempt/count value.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a process id, if any.
    #[inline]
    pub fn with_pid(mut self, pid: Option<u32>) -> Self {
        self.pid = pid;
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::PoolReady);
        let b = Event::new(EventKind::PoolReady);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_launch_failed_carries_context() {
        let ev = Event::new(EventKind::LaunchFailed)
            .with_slot(2)
            .with_wallet(WalletId(5))
            .with_attempt(3)
            .with_reason("spawn failed");
        assert_eq!(ev.slot, Some(2));
        assert_eq!(ev.attempt, Some(3));
        assert_eq!(ev.reason.as_deref(), Some("spawn failed"));
        assert!(ev.exit.is_none());
    }
}
