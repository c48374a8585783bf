//! # Logging subscriber.
//!
//! [`LogWriter`] renders runtime events through `tracing`, one line per event,
//! with structured fields:
//!
//! ```text
//! INFO  slot launched slot=0 wallet=1 attempt=1 pid=4242
//! WARN  worker exited slot=1 wallet=2 exit=crash code=Some(1)
//! INFO  slot rotated slot=0 from=1 to=3 exit=success source=queue
//! INFO  shutdown requested, waiting for workers to exit on their own
//! ```
//!
//! Installing a `tracing` subscriber (e.g. `tracing_subscriber::fmt`) is the
//! application's job.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;
use crate::workers::ExitClass;

/// Logs every runtime event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let slot = e.slot;
        let wallet = e.wallet.map(|w| w.0);
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::PoolReady => {
                info!(slots = ?e.attempt, "wallet pool ready: {reason}");
            }
            EventKind::WalletGenerated => {
                info!(?slot, ?wallet, "wallet generated");
            }
            EventKind::SlotLaunched => {
                info!(?slot, ?wallet, attempt = ?e.attempt, pid = ?e.pid, "slot launched");
            }
            EventKind::LaunchFailed => {
                warn!(?slot, ?wallet, attempt = ?e.attempt, "launch failed: {reason}");
            }
            EventKind::WorkerExited => match e.exit {
                Some(ExitClass::Crash) | None => {
                    warn!(?slot, ?wallet, exit = ?e.exit, code = ?e.code, "worker exited");
                }
                Some(_) => {
                    info!(?slot, ?wallet, exit = ?e.exit, code = ?e.code, "worker exited");
                }
            },
            EventKind::SlotRotated => {
                info!(
                    ?slot,
                    from = ?e.previous.map(|w| w.0),
                    to = ?wallet,
                    exit = ?e.exit,
                    source = reason,
                    "slot rotated"
                );
            }
            EventKind::ShutdownRequested => {
                info!("shutdown requested, waiting for workers to exit on their own");
            }
            EventKind::AllStopped => {
                info!(joined = ?e.attempt, "all workers stopped");
            }
            EventKind::SupervisorFault => {
                error!("supervisor fault: {reason}; forcing termination of live workers");
            }
            EventKind::ForcedTermination => {
                warn!(?slot, ?wallet, pid = ?e.pid, "worker force-terminated");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                warn!(kind = ?e.kind, "{reason}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
