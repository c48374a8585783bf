//! # slotvisor
//!
//! **Slotvisor** keeps a fixed number of long-running worker processes alive,
//! each bound to a wallet identity, and rotates identities in and out of each
//! slot according to how the previous worker ended.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   wallet_pool/wallet_1.json  wallet_2.json ... wallet_K.json
//!                  │
//!                  ▼
//!        ┌───────────────────┐      principals[0..N)   queue[N..K)   fresh K+1, K+2, ...
//!        │  WalletAllocator  │──────────────┬──────────────┬──────────────┐
//!        └───────────────────┘              ▼              ▼              ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │  Supervisor (single async task)                                               │
//! │  - Slot 0 .. Slot N-1 (principal, current wallet, worker handle)              │
//! │  - Launcher (spawns one worker per slot: <program> <args..> <wallet path>)    │
//! │  - Bus (broadcast events)                                                     │
//! └──────┬──────────────────┬──────────────────┬──────────────────┬───────────────┘
//!        ▼                  ▼                  ▼                  │
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐            │ Publishes
//!   │ worker 0 │       │ worker 1 │       │ worker N │            │ - SlotLaunched
//!   └──────────┘       └──────────┘       └──────────┘            │ - WorkerExited
//!     exit code → ExitClass (0 success, 100 state changed, else crash)  - SlotRotated
//!                                                                 ▼
//! ┌───────────────────────────────────────────────────────────────────────────────┐
//! │                         Bus (broadcast channel)                               │
//! └─────────────────────────────────────┬─────────────────────────────────────────┘
//!                                       ▼
//!                          listener ──► SubscriberSet ──► LogWriter, custom subscribers
//! ```
//!
//! ### Rotation
//! ```text
//! worker of slot i exits
//!   ├─ Success              ─► next = queue.pop_front() or a freshly generated wallet
//!   ├─ ExternalStateChanged ─► next = principal(i)
//!   └─ Crash / launch error ─► next = same wallet
//! relaunch slot i immediately with `next`
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits                              |
//! |-----------------|----------------------------------------------------------|-------------------------------------------------|
//! | **Supervision** | Slots, rotation, cooperative shutdown, forced kill.      | [`Supervisor`], [`SupervisorBuilder`]           |
//! | **Wallets**     | Repository, allocation, key generation, signing.         | [`WalletRepository`], [`WalletAllocator`], [`Signer`] |
//! | **Workers**     | Launch seam and exit classification.                     | [`Launcher`], [`WorkerHandle`], [`ExitClass`]   |
//! | **Subscribers** | Hook into lifecycle events.                              | [`Subscribe`], [`LogWriter`]                    |
//! | **Errors**      | Typed errors with stable labels.                         | [`RuntimeError`], [`RepositoryError`]           |
//! | **Configuration** | Centralized runtime settings.                          | [`Config`]                                      |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use slotvisor::{Config, LogWriter, ProcessLauncher, SupervisorBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default().with_wallet_dir("wallet_pool");
//!     let launcher = Arc::new(ProcessLauncher::new("./miner"));
//!
//!     let sup = SupervisorBuilder::new(cfg, launcher)
//!         .with_subscribers(vec![Arc::new(LogWriter)])
//!         .build()?;
//!
//!     // Runs until Ctrl-C, then waits for every worker to exit on its own.
//!     sup.run(3).await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod prompt;
mod subscribers;
mod wallets;
mod workers;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_WALLET_DIR, EPOCH_CHANGED_EXIT_CODE};
pub use core::{RotationSource, SlotSnapshot, Supervisor, SupervisorBuilder, wait_for_shutdown_signal};
pub use error::{KeyError, LaunchError, PromptError, RepositoryError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use prompt::{SlotCountError, ask_slot_count, parse_slot_count};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use wallets::{
    DerivedKeys, Ed25519Factory, Ed25519Signer, KEY_LEN, Partition, Signer, Source,
    WalletAllocator, WalletFactory, WalletId, WalletRecord, WalletRef, WalletRepository,
    derive_from_seed,
};
pub use workers::{ExitClass, Launcher, ProcessHandle, ProcessLauncher, Termination, WorkerHandle};
