//! # Wallet allocator: principals, replacement queue, fresh generation.
//!
//! Three independent pools feed the slots:
//! ```text
//! repository (ascending ids)
//!   ├─ first N ───────────► principals (slot i ← i-th wallet)
//!   └─ rest ──────────────► replacement queue (FIFO, pop only)
//!
//! queue empty on success ─► generate_fresh() at next_id, next_id += 1
//!                           (ids already on disk are skipped)
//! ```
//!
//! ## Rules
//! - `next_id` starts one past the highest identity on disk and never decreases.
//! - A consumed queue wallet is never pushed back.
//! - Freshly generated wallets are handed to the requesting slot only; they
//!   never enter the queue.

use std::collections::VecDeque;

use tracing::{info, warn};

use crate::error::{RepositoryError, RuntimeError};
use crate::wallets::record::{WalletId, WalletRef};
use crate::wallets::repository::WalletRepository;

/// Result of [`WalletAllocator::partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// One wallet per slot, in slot order.
    pub principals: Vec<WalletRef>,
    /// Remaining wallets in the order they will be handed out.
    pub queue: Vec<WalletRef>,
}

/// Where the wallet returned by [`WalletAllocator::next_for_success`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Popped from the replacement queue.
    Queue,
    /// Generated because the queue was empty.
    Generated,
}

/// Owns the replacement queue and the generation counter.
pub struct WalletAllocator {
    repo: WalletRepository,
    queue: VecDeque<WalletRef>,
    next_id: WalletId,
}

impl WalletAllocator {
    /// Creates an allocator over `repo`, seeding the counter from its contents.
    pub fn new(repo: WalletRepository) -> Result<Self, RepositoryError> {
        let next_id = repo
            .list()?
            .last()
            .map_or(WalletId(1), |w| w.id().next());
        Ok(Self {
            repo,
            queue: VecDeque::new(),
            next_id,
        })
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &WalletRepository {
        &self.repo
    }

    /// Identity the next generated wallet will get.
    pub fn next_id(&self) -> WalletId {
        self.next_id
    }

    /// Number of wallets still waiting in the replacement queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Guarantees at least `total` wallets exist, generating the shortfall.
    ///
    /// A failed generation is logged and skipped; the call only fails if the
    /// repository is still short of `total` afterwards. Returns the wallets
    /// generated by this call.
    pub fn ensure_pool(&mut self, total: usize) -> Result<Vec<WalletRef>, RuntimeError> {
        let existing = self.repo.list()?.len();
        if existing >= total {
            info!(existing, total, "wallet pool already large enough");
            return Ok(Vec::new());
        }

        let missing = total - existing;
        info!(existing, missing, "generating missing wallets");

        let mut created = Vec::with_capacity(missing);
        for _ in 0..missing {
            match self.generate_fresh() {
                Ok(wallet) => created.push(wallet),
                Err(e) => warn!(error = %e, label = e.as_label(), "wallet generation failed"),
            }
        }

        let found = self.repo.list()?.len();
        if found < total {
            return Err(RuntimeError::PoolShort {
                wanted: total,
                found,
            });
        }
        Ok(created)
    }

    /// Splits the repository into `total` principals and the replacement queue.
    ///
    /// Deterministic: the same repository contents always produce the same
    /// split. Calling it again resets the queue.
    pub fn partition(&mut self, total: usize) -> Result<Partition, RuntimeError> {
        let mut all = self.repo.list()?;
        if all.len() < total {
            return Err(RuntimeError::PoolShort {
                wanted: total,
                found: all.len(),
            });
        }

        let queue = all.split_off(total);
        self.queue = queue.iter().cloned().collect();
        Ok(Partition {
            principals: all,
            queue,
        })
    }

    /// Pops the front of the replacement queue.
    pub fn next_from_queue(&mut self) -> Option<WalletRef> {
        self.queue.pop_front()
    }

    /// Creates and persists one wallet at the counter value, then advances it.
    ///
    /// An identity that already exists on disk is skipped. Any other failure
    /// leaves the counter unchanged, so the next attempt reuses the identity.
    pub fn generate_fresh(&mut self) -> Result<WalletRef, RepositoryError> {
        loop {
            let id = self.next_id;
            match self.repo.create(id) {
                Ok(wallet) => {
                    self.next_id = id.next();
                    return Ok(wallet);
                }
                Err(RepositoryError::Exists { .. }) => {
                    warn!(wallet = id.0, "wallet id already taken, skipping");
                    self.next_id = id.next();
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Wallet for a slot whose worker succeeded: queue first, then generation.
    pub fn next_for_success(&mut self) -> Result<(WalletRef, Source), RepositoryError> {
        match self.next_from_queue() {
            Some(wallet) => Ok((wallet, Source::Queue)),
            None => Ok((self.generate_fresh()?, Source::Generated)),
        }
    }
}
