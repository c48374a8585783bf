//! # Worker launch seam.
//!
//! The supervisor never knows what a worker does. It only needs to:
//! - start one for a wallet ([`Launcher::launch`]),
//! - ask whether it ended without blocking ([`WorkerHandle::try_wait`]),
//! - wait for it to end on its own ([`WorkerHandle::wait`]),
//! - kill it as a last resort ([`WorkerHandle::kill`]).
//!
//! [`ProcessLauncher`](crate::ProcessLauncher) implements this with OS
//! processes; tests plug in scripted implementations.

use std::io;

use async_trait::async_trait;

use crate::error::LaunchError;
use crate::wallets::WalletRef;
use crate::workers::outcome::Termination;

/// Live handle to one launched worker.
///
/// ### Rules
/// - After `try_wait` returned `Some`, or `wait`/`kill` returned, the worker
///   is gone and the handle is dropped by the supervisor.
/// - `wait` must not signal the worker.
#[async_trait]
pub trait WorkerHandle: Send + 'static {
    /// OS process id, if the worker is a process.
    fn pid(&self) -> Option<u32>;

    /// Returns the termination if the worker has already ended.
    fn try_wait(&mut self) -> io::Result<Option<Termination>>;

    /// Waits until the worker ends on its own.
    async fn wait(&mut self) -> io::Result<Termination>;

    /// Forcibly terminates the worker and reaps it.
    async fn kill(&mut self) -> io::Result<()>;
}

/// Starts workers bound to one wallet.
pub trait Launcher: Send + Sync + 'static {
    /// Starts a worker for `wallet`.
    fn launch(&self, wallet: &WalletRef) -> Result<Box<dyn WorkerHandle>, LaunchError>;
}
