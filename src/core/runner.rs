//! # Launch and observe the worker of one slot.
//!
//! Two primitives the supervisor loop is built from:
//! - [`launch`] starts the slot's worker for its current wallet and publishes the outcome;
//! - [`observe`] polls the slot without blocking.
//!
//! ## Event flow
//!
//! ```text
//! Launch ok:
//!   launcher.launch(current) → Ok(handle) → attach → publish SlotLaunched{attempt, pid}
//!
//! Launch failed:
//!   launcher.launch(current) → Err(e) → publish LaunchFailed{attempt, reason}
//!                                     → slot stays without handle
//!                                     → next observe() reports NotStarted (crash)
//!
//! Rotation found no wallet (handled by the supervisor):
//!   slot keeps its exit class → next observe() reports NotStarted → rotation retried
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** of `SlotLaunched` / `LaunchFailed` per launch.
//! - `observe` only takes the handle out of the slot once the worker is known dead;
//!   on a polling error the handle stays so it can still be killed.

use crate::{
    core::slot::Slot,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    workers::{Launcher, Termination},
};

/// Liveness of a slot as seen by one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Observation {
    /// Worker still running.
    Running,
    /// Worker ended; its handle has been released.
    Exited(Termination),
    /// No worker exists: the last launch failed, or the last rotation found no wallet.
    NotStarted,
}

/// Starts the worker of `slot` for its current wallet.
///
/// Returns `true` if a worker is now attached to the slot.
pub(crate) fn launch(slot: &mut Slot, launcher: &dyn Launcher, bus: &Bus) -> bool {
    let attempt = slot.begin_launch();
    let wallet = slot.current().id();

    match launcher.launch(slot.current()) {
        Ok(handle) => {
            let pid = handle.pid();
            slot.attach(handle);
            bus.publish(
                Event::new(EventKind::SlotLaunched)
                    .with_slot(slot.index())
                    .with_wallet(wallet)
                    .with_attempt(attempt)
                    .with_pid(pid),
            );
            true
        }
        Err(e) => {
            bus.publish(
                Event::new(EventKind::LaunchFailed)
                    .with_slot(slot.index())
                    .with_wallet(wallet)
                    .with_attempt(attempt)
                    .with_reason(format!("{e} ({})", e.as_label())),
            );
            false
        }
    }
}

/// Polls `slot` without blocking.
pub(crate) fn observe(slot: &mut Slot) -> Result<Observation, RuntimeError> {
    let index = slot.index();
    let Some(handle) = slot.handle_mut() else {
        return Ok(Observation::NotStarted);
    };

    match handle.try_wait() {
        Ok(None) => Ok(Observation::Running),
        Ok(Some(termination)) => {
            slot.take_handle();
            Ok(Observation::Exited(termination))
        }
        Err(source) => Err(RuntimeError::Liveness {
            slot: index,
            source,
        }),
    }
}
