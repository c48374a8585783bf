//! # Slot: one supervised position and its rotation state machine.
//!
//! ```text
//!        launch()                 try_wait() → Some(termination)
//!  ┌──────────────► Running ─────────────────────────────┐
//!  │                                                      ▼
//!  │                                              Exited(ExitClass)
//!  │                                                      │ rotate()
//!  │   Success              → current = queue pop / fresh │
//!  │   ExternalStateChanged → current = principal         │
//!  │   Crash                → current unchanged           │
//!  └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - `principal` never changes after construction.
//! - `rotate` is only called once the previous worker is observed dead
//!   (`handle` is `None`), so a slot never has two live workers.
//! - A launch failure leaves `handle` empty; the next scan classifies it as
//!   `Crash` and relaunches the same wallet.
//! - A rotation that cannot obtain its next wallet leaves the slot idle and
//!   remembers the exit class; the next scan retries the same rotation.

use std::fmt;

use crate::error::RepositoryError;
use crate::wallets::{Source, WalletAllocator, WalletId, WalletRef};
use crate::workers::{ExitClass, WorkerHandle};

/// Where the wallet chosen by a rotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationSource {
    /// Popped from the replacement queue.
    Queue,
    /// Generated because the queue was empty.
    Generated,
    /// Restored to the slot's principal.
    Principal,
    /// Kept the wallet that just ran.
    Same,
}

impl RotationSource {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RotationSource::Queue => "queue",
            RotationSource::Generated => "generated",
            RotationSource::Principal => "principal",
            RotationSource::Same => "same",
        }
    }
}

impl From<Source> for RotationSource {
    fn from(source: Source) -> Self {
        match source {
            Source::Queue => RotationSource::Queue,
            Source::Generated => RotationSource::Generated,
        }
    }
}

/// One rotation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    /// Slot index.
    pub slot: usize,
    /// Wallet whose worker just ended.
    pub from: WalletRef,
    /// Wallet the next worker runs with.
    pub to: WalletRef,
    /// Exit class that triggered the decision.
    pub exit: ExitClass,
    /// Origin of `to`.
    pub source: RotationSource,
}

/// Read-only view of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// Slot index.
    pub index: usize,
    /// Wallet permanently bound to the slot.
    pub principal: WalletId,
    /// Wallet currently assigned.
    pub current: WalletId,
    /// Whether a worker handle is held.
    pub running: bool,
    /// Number of launch attempts so far.
    pub launches: u64,
}

pub(crate) struct Slot {
    index: usize,
    principal: WalletRef,
    current: WalletRef,
    handle: Option<Box<dyn WorkerHandle>>,
    launches: u64,
    deferred: Option<ExitClass>,
}

impl Slot {
    pub(crate) fn new(index: usize, principal: WalletRef) -> Self {
        Self {
            index,
            current: principal.clone(),
            principal,
            handle: None,
            launches: 0,
            deferred: None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn current(&self) -> &WalletRef {
        &self.current
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut Box<dyn WorkerHandle>> {
        self.handle.as_mut()
    }

    pub(crate) fn take_handle(&mut self) -> Option<Box<dyn WorkerHandle>> {
        self.handle.take()
    }

    /// Exit class of a rotation that failed and must be retried, if any.
    pub(crate) fn take_deferred(&mut self) -> Option<ExitClass> {
        self.deferred.take()
    }

    /// Installs the handle of a freshly launched worker.
    pub(crate) fn attach(&mut self, handle: Box<dyn WorkerHandle>) {
        debug_assert!(self.handle.is_none(), "slot {} already running", self.index);
        self.handle = Some(handle);
    }

    /// Counts a launch attempt and returns its 1-based number.
    pub(crate) fn begin_launch(&mut self) -> u64 {
        self.launches += 1;
        self.launches
    }

    /// Applies the rotation table to this slot.
    ///
    /// If no wallet can be allocated, `current` is left untouched and `exit` is
    /// kept for [`Slot::take_deferred`].
    pub(crate) fn rotate(
        &mut self,
        exit: ExitClass,
        alloc: &mut WalletAllocator,
    ) -> Result<Rotation, RepositoryError> {
        debug_assert!(self.handle.is_none(), "rotating a live slot {}", self.index);

        let from = self.current.clone();
        let source = match exit {
            ExitClass::Success => match alloc.next_for_success() {
                Ok((next, source)) => {
                    self.current = next;
                    source.into()
                }
                Err(e) => {
                    self.deferred = Some(exit);
                    return Err(e);
                }
            },
            ExitClass::ExternalStateChanged => {
                self.current = self.principal.clone();
                RotationSource::Principal
            }
            ExitClass::Crash => RotationSource::Same,
        };

        Ok(Rotation {
            slot: self.index,
            from,
            to: self.current.clone(),
            exit,
            source,
        })
    }

    pub(crate) fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            index: self.index,
            principal: self.principal.id(),
            current: self.current.id(),
            running: self.handle.is_some(),
            launches: self.launches,
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("index", &self.index)
            .field("principal", &self.principal.id())
            .field("current", &self.current.id())
            .field("running", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::wallets::{Ed25519Factory, WalletRepository};

    fn setup(wallets: usize, slots: usize) -> (tempfile::TempDir, WalletAllocator, Vec<Slot>) {
        let tmp = tempfile::tempdir().unwrap();
        let repo = WalletRepository::open(tmp.path(), Arc::new(Ed25519Factory)).unwrap();
        let mut alloc = WalletAllocator::new(repo).unwrap();
        alloc.ensure_pool(wallets).unwrap();
        let part = alloc.partition(slots).unwrap();
        let slots = part
            .principals
            .into_iter()
            .enumerate()
            .map(|(i, w)| Slot::new(i, w))
            .collect();
        (tmp, alloc, slots)
    }

    #[test]
    fn test_rotation_scenario() {
        let (_tmp, mut alloc, mut slots) = setup(4, 2);
        let step = |slot: &mut Slot, exit, alloc: &mut WalletAllocator| {
            let r = slot.rotate(exit, alloc).unwrap();
            (r.to.id().0, r.source)
        };

        assert_eq!(
            step(&mut slots[0], ExitClass::Success, &mut alloc),
            (3, RotationSource::Queue)
        );
        assert_eq!(
            step(&mut slots[0], ExitClass::ExternalStateChanged, &mut alloc),
            (1, RotationSource::Principal)
        );
        assert_eq!(
            step(&mut slots[1], ExitClass::Crash, &mut alloc),
            (2, RotationSource::Same)
        );
        assert_eq!(
            step(&mut slots[0], ExitClass::Success, &mut alloc),
            (4, RotationSource::Queue)
        );
        assert_eq!(
            step(&mut slots[0], ExitClass::Success, &mut alloc),
            (5, RotationSource::Generated)
        );
    }

    #[test]
    fn test_crash_keeps_wallet_and_queue() {
        let (_tmp, mut alloc, mut slots) = setup(3, 1);
        let slot = &mut slots[0];
        slot.rotate(ExitClass::Success, &mut alloc).unwrap();
        assert_eq!(slot.current().id(), WalletId(2));

        for _ in 0..3 {
            let r = slot.rotate(ExitClass::Crash, &mut alloc).unwrap();
            assert_eq!(r.from, r.to);
        }
        assert_eq!(slot.current().id(), WalletId(2));
        assert_eq!(alloc.queued(), 1);
        assert_eq!(slot.snapshot().principal, WalletId(1));
    }

    #[test]
    fn test_epoch_change_from_principal_is_a_no_op() {
        let (_tmp, mut alloc, mut slots) = setup(2, 1);
        let r = slots[0]
            .rotate(ExitClass::ExternalStateChanged, &mut alloc)
            .unwrap();
        assert_eq!(r.to.id(), WalletId(1));
        assert_eq!(alloc.queued(), 1);
    }

    #[test]
    fn test_failed_allocation_is_deferred() {
        struct Broken;
        impl crate::wallets::WalletFactory for Broken {
            fn create(&self) -> Result<crate::wallets::WalletRecord, crate::error::KeyError> {
                Err(crate::error::KeyError::Entropy("unavailable".into()))
            }
        }

        let tmp = tempfile::tempdir().unwrap();
        WalletRepository::open(tmp.path(), Arc::new(Ed25519Factory))
            .unwrap()
            .create(WalletId(1))
            .unwrap();
        let repo = WalletRepository::open(tmp.path(), Arc::new(Broken)).unwrap();
        let mut alloc = WalletAllocator::new(repo).unwrap();
        let principal = alloc.partition(1).unwrap().principals.remove(0);
        let mut slot = Slot::new(0, principal);

        assert!(slot.rotate(ExitClass::Success, &mut alloc).is_err());
        assert_eq!(slot.current().id(), WalletId(1));
        assert_eq!(slot.take_deferred(), Some(ExitClass::Success));
        assert_eq!(slot.take_deferred(), None);
    }

    #[test]
    fn test_launch_counter() {
        let (_tmp, _alloc, mut slots) = setup(1, 1);
        assert_eq!(slots[0].begin_launch(), 1);
        assert_eq!(slots[0].begin_launch(), 2);
        assert_eq!(slots[0].snapshot().launches, 2);
        assert!(!slots[0].snapshot().running);
    }
}
