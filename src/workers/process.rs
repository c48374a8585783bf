//! # OS process launcher.
//!
//! Spawns `<program> <args...> <wallet file path>` with `tokio::process`.
//!
//! ## Rules
//! - Children inherit stdio and the process group, so a terminal Ctrl-C
//!   reaches every worker directly; the supervisor never forwards signals.
//! - `kill_on_drop` stays off: dropping a handle must not kill a worker that is
//!   shutting down cooperatively.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::error::LaunchError;
use crate::wallets::WalletRef;
use crate::workers::launcher::{Launcher, WorkerHandle};
use crate::workers::outcome::Termination;

/// Launches each worker as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    /// Creates a launcher for `program` with no extra arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the wallet path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the worker program.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl Launcher for ProcessLauncher {
    fn launch(&self, wallet: &WalletRef) -> Result<Box<dyn WorkerHandle>, LaunchError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(wallet.path())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        Ok(Box::new(ProcessHandle { child }))
    }
}

/// [`WorkerHandle`] over a `tokio::process::Child`.
pub struct ProcessHandle {
    child: Child,
}

#[async_trait]
impl WorkerHandle for ProcessHandle {
    fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn try_wait(&mut self) -> io::Result<Option<Termination>> {
        Ok(self.child.try_wait()?.map(Termination::from))
    }

    async fn wait(&mut self) -> io::Result<Termination> {
        Ok(self.child.wait().await?.into())
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::wallets::WalletId;

    fn sh(script: &str) -> ProcessLauncher {
        ProcessLauncher::new("sh").with_args(["-c", script, "worker"])
    }

    fn wallet() -> WalletRef {
        WalletRef::new(Path::new("/tmp/pool"), WalletId(9))
    }

    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let mut h = sh("exit 100").launch(&wallet()).unwrap();
        assert_eq!(h.wait().await.unwrap(), Termination::exited(100));
    }

    #[tokio::test]
    async fn test_wallet_path_is_last_argument() {
        let mut h = sh(r#"[ "$1" = "/tmp/pool/wallet_9.json" ]"#)
            .launch(&wallet())
            .unwrap();
        assert_eq!(h.wait().await.unwrap(), Termination::exited(0));
    }

    #[tokio::test]
    async fn test_try_wait_then_kill() {
        let mut h = sh("sleep 30").launch(&wallet()).unwrap();
        assert!(h.pid().is_some());
        assert_eq!(h.try_wait().unwrap(), None);

        h.kill().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(h.try_wait().unwrap(), Some(Termination::abnormal()));
    }

    #[test]
    fn test_missing_program_is_a_launch_error() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let _guard = rt.enter();
        let err = ProcessLauncher::new("/nonexistent/worker")
            .launch(&wallet())
            .err()
            .unwrap();
        assert_eq!(err.as_label(), "launch_spawn");
    }
}
