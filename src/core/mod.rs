//! Runtime core: slots, rotation and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (built with
//! [`SupervisorBuilder`]), which launches one worker per slot, rotates wallets
//! as workers exit, and shuts down cooperatively on interruption.
//!
//! Internal modules:
//! - [`slot`]: per-slot state and the rotation table;
//! - [`runner`]: launches and polls the worker of one slot, publishing events;
//! - [`supervisor`]: startup, scan loop, cooperative shutdown, forced termination;
//! - [`builder`]: wires repository, bus and subscribers;
//! - [`shutdown`]: cross-platform interruption signals.

mod builder;
mod runner;
mod shutdown;
mod slot;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use shutdown::wait_for_shutdown_signal;
pub use slot::{RotationSource, SlotSnapshot};
pub use supervisor::Supervisor;
