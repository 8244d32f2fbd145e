//! Error types for the harness
//!
//! The taxonomy is narrow on purpose:
//! - configuration rejection before any worker is launched
//! - worker state machine violations
//! - join-barrier timeout
//!
//! Race-condition outcomes under the unguarded aggregate are never errors;
//! they are reported as data by [`crate::report::ConsistencyReport`].

use crate::state_machine::WorkerState;
use std::time::Duration;

/// Errors detected before launch; no workers are started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Worker ids must be unique within a run
    #[error("duplicate worker id: {0}")]
    DuplicateWorkerId(String),

    /// At least one worker is required
    #[error("no workers requested")]
    NoWorkers,
}

/// Worker state machine violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Transition not present in the allowed matrix
    #[error("illegal state transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// State the worker was in
        from: WorkerState,
        /// State it attempted to enter
        to: WorkerState,
    },
}

/// Main harness error type.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Invalid run configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker state machine violation
    #[error("state machine error: {0}")]
    State(#[from] StateError),

    /// Join barrier did not complete in time; in-flight workers are
    /// abandoned, not cancelled
    #[error("join barrier timed out after {waited:?}")]
    Timeout {
        /// How long the runner waited
        waited: Duration,
    },

    /// Worker task failed to join
    #[error("internal error: {0}")]
    Internal(String),
}

impl HarnessError {
    /// Check if the error was raised before any worker started.
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if the error is the join-barrier timeout.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::DuplicateWorkerId("writer".to_string());
        assert!(err.to_string().contains("duplicate worker id"));
        assert!(err.to_string().contains("writer"));
        assert_eq!(ConfigError::NoWorkers.to_string(), "no workers requested");
    }

    #[test]
    fn state_error_display() {
        let err = StateError::IllegalTransition {
            from: WorkerState::Completed,
            to: WorkerState::Running,
        };
        assert!(err.to_string().contains("Completed"));
        assert!(err.to_string().contains("Running"));
    }

    #[test]
    fn harness_error_classification() {
        let err = HarnessError::from(ConfigError::NoWorkers);
        assert!(err.is_config());
        assert!(!err.is_timeout());

        let err = HarnessError::Timeout {
            waited: Duration::from_secs(5),
        };
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }
}
