//! # Supervisor: keeps N worker slots alive and rotates their wallets.
//!
//! The [`Supervisor`] owns the slots, the [`WalletAllocator`], the event bus and
//! the launcher. It is a single async task: every blocking point is a sleep or a
//! cooperative join, so it can be raced against an interruption signal safely.
//!
//! ## High-level architecture
//! ```text
//! run(total) / run_until(total, signal):
//!
//!   start(total)
//!     ├─ allocator.ensure_pool(total)      → WalletGenerated*
//!     ├─ allocator.partition(total)        → PoolReady
//!     └─ slot[i].launch()  (launch_stagger between consecutive launches)
//!
//!   supervise()   loop every poll_interval:
//!     scan(): for each slot
//!       observe ─ Running    → skip
//!               ├ Exited(t)  → WorkerExited{exit} ─┐
//!               └ NotStarted → deferred exit or crash ─┤
//!                                                  ▼
//!                                    slot.rotate(exit, allocator) → SlotRotated
//!                                                  ▼
//!                                    launch() immediately → SlotLaunched | LaunchFailed
//!
//!   raced against signal:
//!     signal Ok            → shutdown():        ShutdownRequested, join each worker, AllStopped
//!     supervise() Err / signal Err → force_terminate(): SupervisorFault, kill live, ForcedTermination*
//!
//! Event flow:
//!   Supervisor ── publish ──► Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Rules
//! - A slot's old worker is observed dead before its replacement is launched.
//! - A failure in one slot's worker never touches another slot.
//! - Interruption never kills: `shutdown` waits for every worker to exit on its own.
//! - A slot whose next wallet cannot be allocated stays idle and is retried on the
//!   next scan; the other slots keep running.
//! - Only an internal fault (liveness check failure, signal registration failure) kills workers.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use slotvisor::{Config, LogWriter, ProcessLauncher, SupervisorBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let launcher = Arc::new(ProcessLauncher::new("./miner").with_args(["--headless"]));
//!     let sup = SupervisorBuilder::new(Config::default(), launcher)
//!         .with_subscribers(vec![Arc::new(LogWriter)])
//!         .build()?;
//!
//!     sup.run(4).await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::{
    runner::{self, Observation},
    shutdown,
    slot::{RotationSource, Slot, SlotSnapshot},
};
use crate::{
    config::Config,
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    wallets::WalletAllocator,
    workers::{ExitClass, Launcher},
};

/// How a supervised run ended before cleanup.
enum Interrupted {
    Signal,
    Fault(RuntimeError),
}

/// Keeps a fixed number of worker slots alive and decides which wallet each one runs.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    launcher: Arc<dyn Launcher>,
    allocator: WalletAllocator,
    slots: Vec<Slot>,
    stop: CancellationToken,
    listener: JoinHandle<()>,
}

impl Supervisor {
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        launcher: Arc<dyn Launcher>,
        allocator: WalletAllocator,
        stop: CancellationToken,
        listener: JoinHandle<()>,
    ) -> Self {
        Self {
            cfg,
            bus,
            launcher,
            allocator,
            slots: Vec::new(),
            stop,
            listener,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Event bus every lifecycle fact is published on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Wallet allocator (principals, queue, generation counter).
    pub fn allocator(&self) -> &WalletAllocator {
        &self.allocator
    }

    /// Snapshot of every slot, in index order.
    pub fn slots(&self) -> Vec<SlotSnapshot> {
        self.slots.iter().map(Slot::snapshot).collect()
    }

    /// Runs until the OS interruption signal, then shuts down cooperatively.
    ///
    /// Returns `Err` on a startup error, or after an internal fault forced
    /// termination of all live workers.
    pub async fn run(self, total: usize) -> Result<(), RuntimeError> {
        self.run_until(total, shutdown::wait_for_shutdown_signal())
            .await
    }

    /// Like [`Supervisor::run`] but interrupted by `signal` instead of OS signals.
    ///
    /// - `signal` completes with `Ok` → cooperative [`shutdown`](Self::shutdown), returns `Ok`;
    /// - `signal` completes with `Err` or the loop faults → [`force_terminate`](Self::force_terminate);
    /// - errors raised before any slot exists are returned as-is.
    pub async fn run_until<F>(mut self, total: usize, signal: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = io::Result<()>>,
    {
        let outcome = {
            let work = async {
                match self.start(total).await {
                    Ok(()) => self.supervise().await,
                    Err(e) => Err(e),
                }
            };
            tokio::pin!(work);
            tokio::pin!(signal);

            // Signal first: a worker that exited on the same interrupt must not be relaunched.
            tokio::select! {
                biased;
                sig = &mut signal => match sig {
                    Ok(()) => Interrupted::Signal,
                    Err(e) => Interrupted::Fault(RuntimeError::Signal(e)),
                },
                res = &mut work => match res {
                    Ok(never) => match never {},
                    Err(e) => Interrupted::Fault(e),
                },
            }
        };

        let result = match outcome {
            Interrupted::Signal => {
                self.shutdown().await;
                Ok(())
            }
            Interrupted::Fault(e) if e.is_startup() || self.slots.is_empty() => Err(e),
            Interrupted::Fault(e) => {
                self.bus.publish(
                    Event::new(EventKind::SupervisorFault)
                        .with_reason(format!("{e} ({})", e.as_label())),
                );
                self.force_terminate().await;
                Err(e)
            }
        };

        self.close().await;
        result
    }

    /// Prepares the pool and launches the first worker of every slot.
    ///
    /// Consecutive launches are separated by `Config::launch_stagger`.
    pub async fn start(&mut self, total: usize) -> Result<(), RuntimeError> {
        if total == 0 {
            return Err(RuntimeError::NoSlots);
        }
        if !self.slots.is_empty() {
            return Err(RuntimeError::AlreadyStarted {
                slots: self.slots.len(),
            });
        }

        for wallet in self.allocator.ensure_pool(total)? {
            self.bus
                .publish(Event::new(EventKind::WalletGenerated).with_wallet(wallet.id()));
        }

        let partition = self.allocator.partition(total)?;
        self.bus.publish(
            Event::new(EventKind::PoolReady)
                .with_attempt(total as u64)
                .with_reason(format!(
                    "principals={} queued={} next_id={}",
                    partition.principals.len(),
                    partition.queue.len(),
                    self.allocator.next_id()
                )),
        );

        self.slots = partition
            .principals
            .into_iter()
            .enumerate()
            .map(|(index, wallet)| Slot::new(index, wallet))
            .collect();

        let stagger = self.cfg.launch_stagger;
        info!(slots = total, ?stagger, "launching initial workers");

        for (i, slot) in self.slots.iter_mut().enumerate() {
            if i > 0 && !stagger.is_zero() {
                time::sleep(stagger).await;
            }
            runner::launch(slot, self.launcher.as_ref(), &self.bus);
        }
        Ok(())
    }

    /// Scans all slots every `Config::poll_interval` until an internal fault.
    pub async fn supervise(&mut self) -> Result<Infallible, RuntimeError> {
        let every = self.cfg.poll_interval_clamped();
        loop {
            time::sleep(every).await;
            self.scan()?;
        }
    }

    /// One liveness pass: rotates and relaunches every slot whose worker ended.
    ///
    /// Returns the number of slots rotated.
    pub fn scan(&mut self) -> Result<usize, RuntimeError> {
        let epoch = self.cfg.epoch_exit_code;
        let mut rotated = 0;

        for slot in self.slots.iter_mut() {
            let exit = match runner::observe(slot)? {
                Observation::Running => continue,
                Observation::NotStarted => slot.take_deferred().unwrap_or(ExitClass::Crash),
                Observation::Exited(termination) => {
                    let exit = termination.classify(epoch);
                    self.bus.publish(
                        Event::new(EventKind::WorkerExited)
                            .with_slot(slot.index())
                            .with_wallet(slot.current().id())
                            .with_exit(exit)
                            .with_code(termination.code),
                    );
                    exit
                }
            };

            let rotation = match slot.rotate(exit, &mut self.allocator) {
                Ok(rotation) => rotation,
                Err(e) => {
                    warn!(slot = slot.index(), error = %e, "no wallet for slot, retrying on next scan");
                    self.bus.publish(
                        Event::new(EventKind::LaunchFailed)
                            .with_slot(slot.index())
                            .with_wallet(slot.current().id())
                            .with_exit(exit)
                            .with_reason(format!("cannot allocate next wallet: {e} ({})", e.as_label())),
                    );
                    continue;
                }
            };
            if rotation.source == RotationSource::Generated {
                self.bus.publish(
                    Event::new(EventKind::WalletGenerated)
                        .with_slot(rotation.slot)
                        .with_wallet(rotation.to.id()),
                );
            }
            self.bus.publish(
                Event::new(EventKind::SlotRotated)
                    .with_slot(rotation.slot)
                    .with_previous(rotation.from.id())
                    .with_wallet(rotation.to.id())
                    .with_exit(rotation.exit)
                    .with_reason(rotation.source.as_label()),
            );

            runner::launch(slot, self.launcher.as_ref(), &self.bus);
            rotated += 1;
        }
        Ok(rotated)
    }

    /// Cooperative shutdown: waits, slot by slot, for every live worker to exit.
    ///
    /// Never signals a worker. While a worker is still running, the slot is
    /// reported every `Config::poll_interval`. Returns the number of workers joined.
    pub async fn shutdown(&mut self) -> usize {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));

        let every = self.cfg.poll_interval_clamped();
        let epoch = self.cfg.epoch_exit_code;
        let mut joined = 0u64;

        for slot in self.slots.iter_mut() {
            let Some(mut handle) = slot.take_handle() else {
                continue;
            };
            let index = slot.index();
            let wallet = slot.current().id();

            let res = {
                let wait = handle.wait();
                tokio::pin!(wait);
                let mut ticker = time::interval_at(Instant::now() + every, every);
                loop {
                    tokio::select! {
                        res = &mut wait => break res,
                        _ = ticker.tick() => {
                            info!(slot = index, wallet = wallet.0, "still waiting for worker to exit");
                        }
                    }
                }
            };

            match res {
                Ok(termination) => {
                    joined += 1;
                    self.bus.publish(
                        Event::new(EventKind::WorkerExited)
                            .with_slot(index)
                            .with_wallet(wallet)
                            .with_exit(termination.classify(epoch))
                            .with_code(termination.code),
                    );
                }
                Err(e) => {
                    warn!(slot = index, wallet = wallet.0, error = %e, "cannot wait for worker, leaving it alone");
                }
            }
        }

        self.bus
            .publish(Event::new(EventKind::AllStopped).with_attempt(joined));
        joined as usize
    }

    /// Kills and reaps every worker that is still alive. Returns how many were killed.
    pub async fn force_terminate(&mut self) -> usize {
        let mut killed = 0;

        for slot in self.slots.iter_mut() {
            let Some(mut handle) = slot.take_handle() else {
                continue;
            };
            if let Ok(Some(_)) = handle.try_wait() {
                continue;
            }

            let pid = handle.pid();
            match handle.kill().await {
                Ok(()) => {
                    killed += 1;
                    self.bus.publish(
                        Event::new(EventKind::ForcedTermination)
                            .with_slot(slot.index())
                            .with_wallet(slot.current().id())
                            .with_pid(pid),
                    );
                }
                Err(e) => {
                    error!(slot = slot.index(), ?pid, error = %e, "cannot kill worker");
                }
            }
        }
        killed
    }

    /// Flushes pending events to the subscribers and stops them.
    pub async fn close(self) {
        self.stop.cancel();
        let _ = self.listener.await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::*;
    use crate::core::SupervisorBuilder;
    use crate::error::{KeyError, LaunchError};
    use crate::wallets::{
        Ed25519Factory, WalletFactory, WalletId, WalletRecord, WalletRef, WalletRepository,
    };
    use crate::workers::{Termination, WorkerHandle};

    #[derive(Default)]
    struct Script {
        launches: Vec<u64>,
        live: HashSet<u64>,
        exits: Vec<(u64, i32)>,
        overlaps: usize,
        kills: usize,
        reject: usize,
        poll_fail: bool,
    }

    #[derive(Clone, Default)]
    struct ScriptedLauncher {
        state: Arc<Mutex<Script>>,
    }

    impl ScriptedLauncher {
        fn finish(&self, wallet: u64, code: i32) {
            self.state.lock().unwrap().exits.push((wallet, code));
        }

        fn launches(&self) -> Vec<u64> {
            self.state.lock().unwrap().launches.clone()
        }

        fn with<R>(&self, f: impl FnOnce(&mut Script) -> R) -> R {
            f(&mut self.state.lock().unwrap())
        }
    }

    impl Launcher for ScriptedLauncher {
        fn launch(&self, wallet: &WalletRef) -> Result<Box<dyn WorkerHandle>, LaunchError> {
            let id = wallet.id().0;
            let mut st = self.state.lock().unwrap();
            st.launches.push(id);
            if st.reject > 0 {
                st.reject -= 1;
                return Err(LaunchError::Rejected {
                    reason: "scripted".into(),
                });
            }
            if !st.live.insert(id) {
                st.overlaps += 1;
            }
            Ok(Box::new(ScriptedHandle {
                id,
                state: Arc::clone(&self.state),
            }))
        }
    }

    struct ScriptedHandle {
        id: u64,
        state: Arc<Mutex<Script>>,
    }

    impl ScriptedHandle {
        fn poll(&self) -> io::Result<Option<Termination>> {
            let mut st = self.state.lock().unwrap();
            if st.poll_fail {
                return Err(io::Error::other("try_wait failed"));
            }
            match st.exits.iter().position(|(w, _)| *w == self.id) {
                Some(pos) => {
                    let (_, code) = st.exits.remove(pos);
                    st.live.remove(&self.id);
                    Ok(Some(Termination::exited(code)))
                }
                None => Ok(None),
            }
        }
    }

    #[async_trait]
    impl WorkerHandle for ScriptedHandle {
        fn pid(&self) -> Option<u32> {
            None
        }

        fn try_wait(&mut self) -> io::Result<Option<Termination>> {
            self.poll()
        }

        async fn wait(&mut self) -> io::Result<Termination> {
            loop {
                if let Some(t) = self.poll()? {
                    return Ok(t);
                }
                time::sleep(Duration::from_millis(10)).await;
            }
        }

        async fn kill(&mut self) -> io::Result<()> {
            let mut st = self.state.lock().unwrap();
            st.kills += 1;
            st.live.remove(&self.id);
            Ok(())
        }
    }

    struct BrokenFactory;

    impl WalletFactory for BrokenFactory {
        fn create(&self) -> Result<WalletRecord, KeyError> {
            Err(KeyError::Entropy("no entropy".into()))
        }
    }

    /// Fails while `broken` is set, then behaves like [`Ed25519Factory`].
    struct SwitchFactory {
        broken: Arc<AtomicBool>,
    }

    impl WalletFactory for SwitchFactory {
        fn create(&self) -> Result<WalletRecord, KeyError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(KeyError::Entropy("no entropy".into()));
            }
            Ed25519Factory.create()
        }
    }

    fn config(dir: &Path) -> Config {
        Config {
            launch_stagger: Duration::ZERO,
            ..Config::default()
        }
        .with_wallet_dir(dir)
    }

    fn seed_pool(dir: &Path, count: u64) {
        let repo = WalletRepository::open(dir, Arc::new(Ed25519Factory)).unwrap();
        for id in 1..=count {
            repo.create(WalletId(id)).unwrap();
        }
    }

    fn supervisor(cfg: Config, launcher: &ScriptedLauncher) -> Supervisor {
        SupervisorBuilder::new(cfg, Arc::new(launcher.clone()))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_rotation_scenario_through_scans() {
        let tmp = tempfile::tempdir().unwrap();
        seed_pool(tmp.path(), 4);
        let launcher = ScriptedLauncher::default();
        let mut sup = supervisor(config(tmp.path()), &launcher);

        sup.start(2).await.unwrap();
        assert_eq!(launcher.launches(), vec![1, 2]);
        assert_eq!(sup.allocator().queued(), 2);

        launcher.finish(1, 0);
        assert_eq!(sup.scan().unwrap(), 1);
        launcher.finish(3, 100);
        sup.scan().unwrap();
        launcher.finish(2, 1);
        sup.scan().unwrap();
        launcher.finish(1, 0);
        sup.scan().unwrap();
        launcher.finish(4, 0);
        sup.scan().unwrap();

        assert_eq!(launcher.launches(), vec![1, 2, 3, 1, 2, 4, 5]);
        assert!(tmp.path().join("wallet_5.json").exists());
        assert_eq!(launcher.with(|s| s.overlaps), 0);

        let slots = sup.slots();
        assert_eq!(slots[0].principal, WalletId(1));
        assert_eq!(slots[0].current, WalletId(5));
        assert_eq!(slots[1].current, WalletId(2));
        assert!(slots.iter().all(|s| s.running));

        sup.close().await;
    }

    #[tokio::test]
    async fn test_scan_without_exits_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        let mut sup = supervisor(config(tmp.path()), &launcher);

        sup.start(3).await.unwrap();
        assert_eq!(sup.scan().unwrap(), 0);
        assert_eq!(launcher.launches(), vec![1, 2, 3]);
        sup.close().await;
    }

    #[tokio::test]
    async fn test_rotation_events_carry_both_wallets() {
        let tmp = tempfile::tempdir().unwrap();
        seed_pool(tmp.path(), 2);
        let launcher = ScriptedLauncher::default();
        let mut sup = supervisor(config(tmp.path()), &launcher);
        let mut rx = sup.bus().subscribe();

        sup.start(1).await.unwrap();
        launcher.finish(1, 0);
        sup.scan().unwrap();

        let mut rotated = None;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::SlotRotated {
                rotated = Some(ev);
            }
        }
        let ev = rotated.expect("rotation published");
        assert_eq!(ev.slot, Some(0));
        assert_eq!(ev.previous, Some(WalletId(1)));
        assert_eq!(ev.wallet, Some(WalletId(2)));
        assert_eq!(ev.exit, Some(ExitClass::Success));
        assert_eq!(ev.reason.as_deref(), Some("queue"));
        sup.close().await;
    }

    #[tokio::test]
    async fn test_failed_launch_is_retried_with_same_wallet() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        launcher.with(|s| s.reject = 1);
        let mut sup = supervisor(config(tmp.path()), &launcher);

        sup.start(1).await.unwrap();
        assert!(!sup.slots()[0].running);

        assert_eq!(sup.scan().unwrap(), 1);
        let slot = &sup.slots()[0];
        assert!(slot.running);
        assert_eq!(slot.current, WalletId(1));
        assert_eq!(slot.launches, 2);
        assert_eq!(launcher.launches(), vec![1, 1]);
        sup.close().await;
    }

    #[tokio::test]
    async fn test_allocation_failure_is_retried_on_next_scan() {
        let tmp = tempfile::tempdir().unwrap();
        seed_pool(tmp.path(), 1);
        let broken = Arc::new(AtomicBool::new(true));
        let launcher = ScriptedLauncher::default();
        let mut sup = SupervisorBuilder::new(config(tmp.path()), Arc::new(launcher.clone()))
            .with_factory(Arc::new(SwitchFactory {
                broken: Arc::clone(&broken),
            }))
            .build()
            .unwrap();
        let mut rx = sup.bus().subscribe();

        sup.start(1).await.unwrap();
        launcher.finish(1, 0);
        assert_eq!(sup.scan().unwrap(), 0);
        assert_eq!(sup.scan().unwrap(), 0);

        let slot = &sup.slots()[0];
        assert!(!slot.running);
        assert_eq!(slot.current, WalletId(1));
        assert_eq!(launcher.launches(), vec![1]);

        let mut failures = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::LaunchFailed {
                failures += 1;
                assert_eq!(ev.exit, Some(ExitClass::Success));
                assert!(ev.reason.as_deref().unwrap().starts_with("cannot allocate next wallet"));
            }
        }
        assert_eq!(failures, 2);

        broken.store(false, Ordering::SeqCst);
        assert_eq!(sup.scan().unwrap(), 1);
        let slot = &sup.slots()[0];
        assert!(slot.running);
        assert_eq!(slot.current, WalletId(2));
        assert_eq!(launcher.launches(), vec![1, 2]);
        sup.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_allocation_failure_leaves_other_slots_running() {
        let tmp = tempfile::tempdir().unwrap();
        seed_pool(tmp.path(), 2);
        let launcher = ScriptedLauncher::default();
        let sup = SupervisorBuilder::new(config(tmp.path()), Arc::new(launcher.clone()))
            .with_factory(Arc::new(BrokenFactory))
            .build()
            .unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let script = launcher.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(12)).await;
            script.finish(1, 0);
            time::sleep(Duration::from_secs(12)).await;
            let _ = tx.send(());
            time::sleep(Duration::from_secs(12)).await;
            script.finish(2, 0);
        });

        let signal = async move {
            let _ = rx.await;
            Ok(())
        };
        sup.run_until(2, signal).await.unwrap();

        assert_eq!(launcher.with(|s| s.kills), 0);
        assert_eq!(launcher.launches(), vec![1, 2]);
        assert!(launcher.with(|s| s.live.is_empty()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_wins_over_pending_rotation() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        launcher.finish(1, 0);
        let sup = supervisor(config(tmp.path()), &launcher);

        let poll = sup.config().poll_interval_clamped();
        let signal = async move {
            time::sleep(poll).await;
            Ok(())
        };
        sup.run_until(1, signal).await.unwrap();

        assert_eq!(launcher.launches(), vec![1]);
        assert_eq!(launcher.with(|s| s.kills), 0);
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        let mut sup = supervisor(config(tmp.path()), &launcher);

        sup.start(1).await.unwrap();
        let err = sup.start(1).await.unwrap_err();
        assert!(matches!(err, RuntimeError::AlreadyStarted { slots: 1 }));
        sup.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_joins_without_killing() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        let cfg = Config::default().with_wallet_dir(tmp.path());
        let sup = supervisor(cfg, &launcher);

        let (tx, rx) = oneshot::channel::<()>();
        let script = launcher.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(60)).await;
            let _ = tx.send(());
            time::sleep(Duration::from_secs(20)).await;
            script.finish(1, 0);
            time::sleep(Duration::from_secs(20)).await;
            script.finish(2, 0);
        });

        let signal = async move {
            let _ = rx.await;
            Ok(())
        };
        sup.run_until(2, signal).await.unwrap();

        assert_eq!(launcher.with(|s| s.kills), 0);
        assert!(launcher.with(|s| s.live.is_empty()));
        assert_eq!(launcher.launches(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_liveness_error_forces_termination() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        launcher.with(|s| s.poll_fail = true);
        let sup = supervisor(config(tmp.path()), &launcher);

        let err = sup
            .run_until(2, std::future::pending())
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Liveness { slot: 0, .. }));
        assert_eq!(launcher.with(|s| s.kills), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_registration_error_is_a_fault() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();
        let sup = supervisor(config(tmp.path()), &launcher);

        let err = sup
            .run_until(1, async { Err(io::Error::other("no signals")) })
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "runtime_signal");
        assert!(launcher.with(|s| s.live.is_empty()));
    }

    #[tokio::test]
    async fn test_startup_errors_launch_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::default();

        let sup = supervisor(config(tmp.path()), &launcher);
        let err = sup.run_until(0, std::future::pending()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NoSlots));

        let sup = SupervisorBuilder::new(config(tmp.path()), Arc::new(launcher.clone()))
            .with_factory(Arc::new(BrokenFactory))
            .build()
            .unwrap();
        let err = sup.run_until(2, std::future::pending()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::PoolShort { wanted: 2, found: 0 }));

        assert!(launcher.launches().is_empty());
    }
}
