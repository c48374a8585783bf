//! # Worker exit classification.
//!
//! The exit status is the only thing a worker tells the supervisor. It is
//! decoded once, at the process boundary, into an [`ExitClass`]:
//!
//! ```text
//! code 0               ─► Success
//! code == epoch code   ─► ExternalStateChanged
//! anything else        ─► Crash   (other codes, signal death, launch failure)
//! ```
//!
//! Unknown statuses are never dropped: they classify as `Crash`, which
//! relaunches the slot with the same wallet.

use std::fmt;

/// Raw termination of a worker as observed by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    /// Exit code, `None` when the worker died from a signal or never exited normally.
    pub code: Option<i32>,
}

impl Termination {
    /// Termination with an exit code.
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Termination without an exit code (signal, abnormal end).
    pub fn abnormal() -> Self {
        Self { code: None }
    }

    /// Classifies this termination.
    pub fn classify(&self, epoch_exit_code: i32) -> ExitClass {
        ExitClass::from_code(self.code, epoch_exit_code)
    }
}

impl From<std::process::ExitStatus> for Termination {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Outcome class of a terminated worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitClass {
    /// The wallet reached the tracked external milestone.
    Success,
    /// The external tracked state (challenge/epoch) changed under the worker.
    ExternalStateChanged,
    /// Anything else, including launch failure.
    Crash,
}

impl ExitClass {
    /// Maps a raw exit code to its class.
    ///
    /// # Example
    /// ```
    /// use slotvisor::ExitClass;
    ///
    /// assert_eq!(ExitClass::from_code(Some(0), 100), ExitClass::Success);
    /// assert_eq!(ExitClass::from_code(Some(100), 100), ExitClass::ExternalStateChanged);
    /// assert_eq!(ExitClass::from_code(Some(1), 100), ExitClass::Crash);
    /// assert_eq!(ExitClass::from_code(None, 100), ExitClass::Crash);
    /// ```
    pub fn from_code(code: Option<i32>, epoch_exit_code: i32) -> Self {
        match code {
            Some(0) => ExitClass::Success,
            Some(c) if c == epoch_exit_code => ExitClass::ExternalStateChanged,
            _ => ExitClass::Crash,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ExitClass::Success => "success",
            ExitClass::ExternalStateChanged => "external_state_changed",
            ExitClass::Crash => "crash",
        }
    }
}

impl fmt::Display for ExitClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_epoch_code() {
        assert_eq!(ExitClass::from_code(Some(42), 42), ExitClass::ExternalStateChanged);
        assert_eq!(ExitClass::from_code(Some(100), 42), ExitClass::Crash);
    }

    #[test]
    fn test_zero_epoch_code_cannot_shadow_success() {
        assert_eq!(ExitClass::from_code(Some(0), 0), ExitClass::Success);
    }

    #[test]
    fn test_negative_and_signal_codes_crash() {
        assert_eq!(Termination::exited(-1).classify(100), ExitClass::Crash);
        assert_eq!(Termination::exited(137).classify(100), ExitClass::Crash);
        assert_eq!(Termination::abnormal().classify(100), ExitClass::Crash);
    }
}
