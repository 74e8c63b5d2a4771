//! State transition history tracking.
//!
//! Provides immutable tracking of the external transitions a machine has
//! executed, in the order the processor executed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single executed transition.
///
/// # Example
///
/// ```rust
/// use passive_fsm::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "idle",
///     to: "running",
///     event: "go",
///     timestamp: Utc::now(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S, E> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event that triggered the transition
    pub event: E,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of executed transitions.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use passive_fsm::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
///
/// let history = history.record(StateTransition {
///     from: 1,
///     to: 2,
///     event: 'a',
///     timestamp: Utc::now(),
/// });
///
/// let history = history.record(StateTransition {
///     from: 2,
///     to: 3,
///     event: 'b',
///     timestamp: Utc::now(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path, vec![&1, &2, &3]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<S, E> {
    transitions: Vec<StateTransition<S, E>>,
}

impl<S, E> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> FromIterator<StateTransition<S, E>> for StateHistory<S, E> {
    fn from_iter<I: IntoIterator<Item = StateTransition<S, E>>>(iter: I) -> Self {
        Self {
            transitions: iter.into_iter().collect(),
        }
    }
}

impl<S, E> StateHistory<S, E> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S, E>) -> Self
    where
        S: Clone,
        E: Clone,
    {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns references to states in order: the source of the first
    /// transition, then the `to` state of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all transitions in execution order.
    pub fn transitions(&self) -> &[StateTransition<S, E>] {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether no transition has been recorded.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
