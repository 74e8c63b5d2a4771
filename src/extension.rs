//! Observers notified of lifecycle and transition events.
//!
//! Extensions have no say in what the machine does. Every notification is
//! emitted from the processor while it handles one queued operation, so
//! notifications of different operations never interleave.

use crate::core::{Event, MachineStatus, State};
use crate::error::ActionError;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Observer of a state machine.
///
/// All methods default to doing nothing; implement the ones of interest.
/// `machine` is the configured machine name.
#[allow(unused_variables)]
pub trait Extension<S: State, E: Event>: Send + Sync {
    /// The lifecycle status changed to `status`.
    fn status_changed(&self, machine: &str, status: MachineStatus) {}

    /// The machine was initialized to `initial_state`.
    fn initialized(&self, machine: &str, initial_state: &S) {}

    /// A saved current state and history map were installed.
    fn loaded(&self, machine: &str, current_state: Option<&S>, history_states: &HashMap<S, S>) {}

    /// The current state changed from `old` to `new`.
    fn switched_state(&self, machine: &str, old: Option<&S>, new: &S) {}

    /// `state` is being entered; its entry actions run next.
    fn entering_state(&self, machine: &str, state: &S) {}

    /// `state` is being left; its exit actions run next.
    fn exiting_state(&self, machine: &str, state: &S) {}

    /// `event` is about to be processed.
    fn firing_event(&self, machine: &str, event: &E) {}

    /// `event` has been processed.
    fn fired_event(&self, machine: &str, event: &E) {}

    /// No transition of `state` accepted `event`.
    fn transition_declined(&self, machine: &str, state: &S, event: &E) {}

    /// An action attributed to `state` failed.
    fn action_failed(&self, machine: &str, state: &S, error: &ActionError) {}
}

/// Ordered collection of extensions.
///
/// Duplicates are kept: an extension added twice is notified twice.
pub struct ExtensionRegistry<S: State, E: Event> {
    extensions: RwLock<Vec<Arc<dyn Extension<S, E>>>>,
}

impl<S: State, E: Event> Default for ExtensionRegistry<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> ExtensionRegistry<S, E> {
    pub fn new() -> Self {
        Self {
            extensions: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, extension: Arc<dyn Extension<S, E>>) {
        self.extensions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke `notify` on every extension in registration order.
    ///
    /// A panicking extension is logged and skipped; the remaining
    /// extensions are still notified.
    pub fn notify<F>(&self, notify: F)
    where
        F: Fn(&dyn Extension<S, E>),
    {
        let snapshot: Vec<_> = self
            .extensions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (position, extension) in snapshot.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| notify(extension.as_ref())));
            if outcome.is_err() {
                warn!(position, "extension panicked during notification");
            }
        }
    }
}
