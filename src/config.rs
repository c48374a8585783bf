//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the slot supervisor.
//!
//! The launch stagger and polling interval are fixed for a deployment: the
//! binary always runs with [`Config::default`]. Tests and embedders override the
//! public fields directly.
//!
//! ## Sentinel values
//! - `launch_stagger = 0s` → initial slots are launched back to back
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

use std::path::PathBuf;
use std::time::Duration;

/// Exit code a worker uses to report that the tracked external state
/// (challenge/epoch) changed under it.
pub const EPOCH_CHANGED_EXIT_CODE: i32 = 100;

/// Default directory holding one `wallet_<id>.json` file per identity.
pub const DEFAULT_WALLET_DIR: &str = "wallet_pool";

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `launch_stagger`: delay between consecutive launches of the initial batch
/// - `poll_interval`: delay between two liveness scans over all slots
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
/// - `epoch_exit_code`: exit code mapped to `ExitClass::ExternalStateChanged`
/// - `wallet_dir`: wallet repository directory (created if absent)
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay inserted between two consecutive initial launches.
    ///
    /// Only applies to the first batch started by `Supervisor::start`;
    /// replacement launches after a rotation are immediate.
    pub launch_stagger: Duration,

    /// Interval between two liveness scans.
    ///
    /// Also bounds how fast a slot whose worker failed to launch is retried, and
    /// how often the cooperative shutdown reports the slots it is still waiting on.
    /// Unlike a rotation, a failed launch (or a failed wallet allocation) is not
    /// relaunched immediately: it waits for the next scan.
    pub poll_interval: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Reserved exit code signalling an external state change.
    pub epoch_exit_code: i32,

    /// Directory of the wallet repository.
    pub wallet_dir: PathBuf,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the polling interval, never shorter than 1ms.
    ///
    /// A zero interval would turn `supervise()` into a busy loop.
    #[inline]
    pub fn poll_interval_clamped(&self) -> Duration {
        self.poll_interval.max(Duration::from_millis(1))
    }

    /// Returns a copy of this config pointing at another wallet directory.
    pub fn with_wallet_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.wallet_dir = dir.into();
        self
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `launch_stagger = 30s` (browser start-up is heavy)
    /// - `poll_interval = 5s`
    /// - `bus_capacity = 1024`
    /// - `epoch_exit_code = 100`
    /// - `wallet_dir = "wallet_pool"`
    fn default() -> Self {
        Self {
            launch_stagger: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
            bus_capacity: 1024,
            epoch_exit_code: EPOCH_CHANGED_EXIT_CODE,
            wallet_dir: PathBuf::from(DEFAULT_WALLET_DIR),
        }
    }
}
