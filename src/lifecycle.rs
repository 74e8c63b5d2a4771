//! Lifecycle guard deciding which calls are legal next.
//!
//! Checks happen synchronously on the caller's side, before anything is
//! queued, and either advance the status or leave it untouched.

use crate::core::MachineStatus;
use crate::error::MachineError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Result of an accepted `start` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StartOutcome<T> {
    /// The machine moved to `Started`; carries what `queue` returned.
    Starting(T),
    /// The machine was already started; nothing needs to run.
    AlreadyStarted,
}

/// Owner of the machine's [`MachineStatus`].
///
/// Accepted calls run their `queue` closure while the status lock is still
/// held, so the order in which operations reach the processor always
/// matches the order in which the status advanced.
#[derive(Debug, Default)]
pub struct LifecycleController {
    status: Mutex<MachineStatus>,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> MachineStatus {
        *self.lock()
    }

    /// Claim initialization for `initialize` or `load`, then run `queue`.
    ///
    /// Both share this guard, so whichever is called first wins. `queue`
    /// must not call back into the machine.
    pub fn begin_initialization<T>(&self, queue: impl FnOnce() -> T) -> Result<T, MachineError> {
        let mut status = self.lock();
        match *status {
            MachineStatus::Uninitialized => {
                *status = MachineStatus::Initialized;
                Ok(queue())
            }
            MachineStatus::Initialized | MachineStatus::Started => {
                debug!(status = %*status, "rejecting repeated initialization");
                Err(MachineError::AlreadyInitialized)
            }
        }
    }

    /// Move to `Started`, then run `queue`. Same locking rule as
    /// [`begin_initialization`](Self::begin_initialization).
    pub fn begin_start<T>(
        &self,
        queue: impl FnOnce() -> T,
    ) -> Result<StartOutcome<T>, MachineError> {
        let mut status = self.lock();
        match *status {
            MachineStatus::Uninitialized => {
                debug!("rejecting start of uninitialized machine");
                Err(MachineError::NotInitialized)
            }
            MachineStatus::Initialized => {
                *status = MachineStatus::Started;
                Ok(StartOutcome::Starting(queue()))
            }
            MachineStatus::Started => Ok(StartOutcome::AlreadyStarted),
        }
    }

    pub fn ensure_started(&self) -> Result<(), MachineError> {
        if self.status().accepts_events() {
            Ok(())
        } else {
            Err(MachineError::NotStarted)
        }
    }

    fn lock(&self) -> MutexGuard<'_, MachineStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
