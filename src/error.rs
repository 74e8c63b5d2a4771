//! Errors reported by a running state machine.

use thiserror::Error;

/// Failure carried by a [`Deferred`](crate::Deferred) handle.
///
/// Lifecycle violations are detected synchronously, before anything is
/// queued, and never change the machine's status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    /// `initialize` or `load` was called after the machine was already
    /// initialized by either of them.
    #[error("state machine is already initialized.")]
    AlreadyInitialized,

    /// `start` was called before `initialize` or `load`.
    #[error("state machine is not initialized.")]
    NotInitialized,

    /// An event was fired before `start`.
    #[error("state machine is not started.")]
    NotStarted,

    /// An action failed while action failures are configured to propagate.
    #[error("action of state '{state}' failed: {message}")]
    ActionFailed { state: String, message: String },

    /// The processor went away before the operation completed.
    #[error("state machine processor has stopped")]
    WorkerStopped,
}

/// Error returned by a host-supplied entry, exit or transition action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&str> for ActionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ActionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
