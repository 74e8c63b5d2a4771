//! Guard predicates for controlling state transitions.
//!
//! Guards are boolean functions that decide whether a declared transition
//! may be taken for the event being processed.

use super::state::{Event, State};
use std::fmt;
use std::sync::Arc;

/// Predicate evaluated before a transition is taken.
///
/// The predicate sees the state the machine is in and the event being
/// fired. Guards are cheap to clone; clones share the same predicate.
///
/// # Example
///
/// ```rust
/// use passive_fsm::core::Guard;
///
/// let only_small = Guard::new(|state: &i32, event: &u8| *state < 10 && *event == 1);
///
/// assert!(only_small.check(&3, &1));
/// assert!(!only_small.check(&30, &1));
/// ```
pub struct Guard<S: State, E: Event> {
    predicate: Arc<dyn Fn(&S, &E) -> bool + Send + Sync>,
}

impl<S: State, E: Event> Guard<S, E> {
    /// Create a guard from a predicate function.
    ///
    /// The predicate runs on the machine's processor, so it must be
    /// thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S, &E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the guard allows the transition.
    pub fn check(&self, state: &S, event: &E) -> bool {
        (self.predicate)(state, event)
    }
}

impl<S: State, E: Event> Clone for Guard<S, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: State, E: Event> fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}
