use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::supervisor::Supervisor;
use crate::{
    config::Config,
    error::RuntimeError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
    wallets::{Ed25519Factory, WalletAllocator, WalletFactory, WalletRepository},
    workers::Launcher,
};

/// Builder for constructing a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: Config,
    launcher: Arc<dyn Launcher>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    factory: Arc<dyn WalletFactory>,
}

impl SupervisorBuilder {
    /// Creates a builder that starts workers through `launcher`.
    pub fn new(cfg: Config, launcher: Arc<dyn Launcher>) -> Self {
        Self {
            cfg,
            launcher,
            subscribers: Vec::new(),
            factory: Arc::new(Ed25519Factory),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive every runtime event (launches, exits, rotations,
    /// shutdown) through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the key material source for generated wallets.
    ///
    /// Default: [`Ed25519Factory`].
    pub fn with_factory(mut self, factory: Arc<dyn WalletFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Opens the wallet repository and wires the event pipeline.
    ///
    /// Must be called inside a tokio runtime: the subscriber listener is spawned here.
    pub fn build(self) -> Result<Supervisor, RuntimeError> {
        let repo = WalletRepository::open(&self.cfg.wallet_dir, self.factory)?;
        let allocator = WalletAllocator::new(repo)?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let stop = CancellationToken::new();
        let listener = subscriber_listener(&bus, subs, stop.clone());

        Ok(Supervisor::new_internal(
            self.cfg,
            bus,
            self.launcher,
            allocator,
            stop,
            listener,
        ))
    }
}

/// Forwards bus events to the subscriber set until `stop` is cancelled.
///
/// On cancellation the already-published backlog is still delivered before the
/// subscriber workers are shut down.
fn subscriber_listener(bus: &Bus, set: SubscriberSet, stop: CancellationToken) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    loop {
                        match rx.try_recv() {
                            Ok(ev) => set.emit(&ev),
                            Err(TryRecvError::Lagged(_)) => continue,
                            Err(_) => break,
                        }
                    }
                    break;
                }
            }
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::events::{Event, EventKind};
    use crate::workers::ProcessLauncher;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, ev: &Event) {
            self.seen.lock().unwrap().push(ev.kind);
        }
    }

    #[tokio::test]
    async fn test_build_creates_wallet_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("pool");
        let cfg = Config::default().with_wallet_dir(&dir);

        let sup = SupervisorBuilder::new(cfg, Arc::new(ProcessLauncher::new("true")))
            .build()
            .unwrap();
        assert!(dir.is_dir());
        assert!(sup.slots().is_empty());
        sup.close().await;
    }

    #[tokio::test]
    async fn test_close_flushes_pending_events() {
        let tmp = tempfile::tempdir().unwrap();
        let rec = Arc::new(Recorder::default());
        let cfg = Config::default().with_wallet_dir(tmp.path());

        let sup = SupervisorBuilder::new(cfg, Arc::new(ProcessLauncher::new("true")))
            .with_subscribers(vec![rec.clone()])
            .build()
            .unwrap();
        sup.bus().publish(Event::new(EventKind::ShutdownRequested));
        sup.bus().publish(Event::new(EventKind::AllStopped));
        sup.close().await;

        assert_eq!(
            *rec.seen.lock().unwrap(),
            vec![EventKind::ShutdownRequested, EventKind::AllStopped]
        );
    }
}
