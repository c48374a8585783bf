//! Error types used by the slotvisor runtime.
//!
//! - [`RuntimeError`]: errors raised by the supervisor itself (startup and internal faults).
//! - [`RepositoryError`]: wallet store failures (I/O, decoding, identity collisions).
//! - [`KeyError`]: malformed key material or seeds.
//! - [`LaunchError`]: a worker process could not be started.
//! - [`PromptError`]: the operator prompt could not produce a slot count.
//!
//! Every enum provides `as_label` (stable snake_case string for logs).

use std::path::PathBuf;

use thiserror::Error;

use crate::wallets::WalletId;

/// # Errors produced by the supervisor runtime.
///
/// Startup variants (`NoSlots`, `AlreadyStarted`, `PoolShort`, and repository
/// failures while the pool is prepared) abort before any slot is launched.
/// Raised from the running loop, any variant is an internal fault and escalates
/// to forced termination of all live workers.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Requested slot count was zero.
    #[error("slot count must be positive")]
    NoSlots,

    /// `start` was called on a supervisor that already owns slots.
    #[error("supervisor already started with {slots} slots")]
    AlreadyStarted {
        /// Number of slots already running.
        slots: usize,
    },

    /// Wallet repository failure (listing, loading or generating).
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The pool still holds fewer wallets than slots after generation.
    #[error("wallet pool holds {found} wallets, {wanted} required")]
    PoolShort {
        /// Slot count requested by the operator.
        wanted: usize,
        /// Wallets present after generation.
        found: usize,
    },

    /// Liveness check of a worker failed; its state is unknown.
    #[error("cannot check worker of slot {slot}: {source}")]
    Liveness {
        /// Slot index.
        slot: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Registering the OS shutdown signal handlers failed.
    #[error("cannot listen for shutdown signals: {0}")]
    Signal(#[source] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use slotvisor::RuntimeError;
    ///
    /// let err = RuntimeError::PoolShort { wanted: 3, found: 1 };
    /// assert_eq!(err.as_label(), "runtime_pool_short");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::NoSlots => "runtime_no_slots",
            RuntimeError::AlreadyStarted { .. } => "runtime_already_started",
            RuntimeError::Repository(_) => "runtime_repository",
            RuntimeError::PoolShort { .. } => "runtime_pool_short",
            RuntimeError::Liveness { .. } => "runtime_liveness_failed",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// True for errors raised before any slot was launched.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            RuntimeError::NoSlots
                | RuntimeError::AlreadyStarted { .. }
                | RuntimeError::PoolShort { .. }
        )
    }
}

/// # Errors produced by the wallet repository.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Filesystem access failed.
    #[error("io error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A wallet file is not valid JSON of the expected shape.
    #[error("malformed wallet file {}: {source}", .path.display())]
    Decode {
        /// Offending file.
        path: PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A wallet record could not be serialized.
    #[error("cannot encode wallet {id}: {source}")]
    Encode {
        /// Wallet identity.
        id: WalletId,
        /// Underlying encoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A file for this identity already exists; identities are never reused.
    #[error("wallet {id} already exists")]
    Exists {
        /// Colliding identity.
        id: WalletId,
    },

    /// No file exists for this identity.
    #[error("wallet {id} not found")]
    NotFound {
        /// Missing identity.
        id: WalletId,
    },

    /// Key material could not be produced or parsed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

impl RepositoryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RepositoryError::Io { .. } => "repository_io",
            RepositoryError::Decode { .. } => "repository_decode",
            RepositoryError::Encode { .. } => "repository_encode",
            RepositoryError::Exists { .. } => "repository_exists",
            RepositoryError::NotFound { .. } => "repository_not_found",
            RepositoryError::Key(_) => "repository_key",
        }
    }
}

/// # Errors produced while handling key material.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum KeyError {
    /// A hex field could not be decoded.
    #[error("invalid hex in {field}: {source}")]
    Hex {
        /// Name of the offending field.
        field: &'static str,
        /// Underlying decoding error.
        #[source]
        source: hex::FromHexError,
    },

    /// Decoded bytes have the wrong size.
    #[error("{field} must be {expected} bytes, got {found}")]
    Length {
        /// Name of the offending field.
        field: &'static str,
        /// Required byte length.
        expected: usize,
        /// Actual byte length.
        found: usize,
    },

    /// The OS random source failed.
    #[error("random source unavailable: {0}")]
    Entropy(String),
}

/// # Errors produced when starting a worker.
///
/// A launch error never escapes the supervisor: the slot is treated as crashed
/// and retried with the same wallet on the next scan.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The worker program could not be spawned.
    #[error("cannot spawn {}: {source}", .program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The launcher refused to start a worker.
    #[error("launch rejected: {reason}")]
    Rejected {
        /// Human-readable reason.
        reason: String,
    },
}

impl LaunchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchError::Spawn { .. } => "launch_spawn",
            LaunchError::Rejected { .. } => "launch_rejected",
        }
    }
}

/// # Errors produced by the operator prompt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PromptError {
    /// Reading the answer or writing the question failed.
    #[error("prompt io error: {0}")]
    Io(#[from] std::io::Error),

    /// Input ended before a valid answer was given.
    #[error("input closed before a slot count was given")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_classification() {
        assert!(RuntimeError::NoSlots.is_startup());
        assert!(RuntimeError::PoolShort { wanted: 2, found: 1 }.is_startup());

        let liveness = RuntimeError::Liveness {
            slot: 0,
            source: std::io::Error::other("gone"),
        };
        assert!(!liveness.is_startup());
        assert_eq!(liveness.as_label(), "runtime_liveness_failed");
    }

    #[test]
    fn test_repository_error_wraps_into_runtime() {
        let err: RuntimeError = RepositoryError::NotFound { id: WalletId(7) }.into();
        assert_eq!(err.as_label(), "runtime_repository");
        assert_eq!(err.to_string(), "wallet 7 not found");
    }
}
