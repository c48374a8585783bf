//! Worker processes: launch seam, OS process implementation, exit classification.
//!
//! ## Contents
//! - [`Launcher`], [`WorkerHandle`] what the supervisor needs from a worker
//! - [`ProcessLauncher`] one OS process per worker (`tokio::process`)
//! - [`ExitClass`], [`Termination`] decoding of the worker's exit status

mod launcher;
mod outcome;
mod process;

pub use launcher::{Launcher, WorkerHandle};
pub use outcome::{ExitClass, Termination};
pub use process::{ProcessHandle, ProcessLauncher};
