//! Declared transitions.

use super::action::Action;
use crate::core::{Event, Guard, State};

/// A transition declared for a source state and event.
///
/// A transition without a target is internal: its actions run but the
/// machine neither exits nor re-enters its current state.
pub struct TransitionDefinition<S: State, E: Event> {
    pub source: S,
    pub event: E,
    pub target: Option<S>,
    pub guard: Option<Guard<S, E>>,
    pub actions: Vec<Action>,
}

impl<S: State, E: Event> TransitionDefinition<S, E> {
    pub fn new(source: S, event: E) -> Self {
        Self {
            source,
            event,
            target: None,
            guard: None,
            actions: Vec::new(),
        }
    }

    /// Check if this transition can be taken for `event` in `current`.
    pub fn can_execute(&self, current: &S, event: &E) -> bool {
        if *current != self.source || *event != self.event {
            return false;
        }

        self.guard.as_ref().is_none_or(|g| g.check(current, event))
    }

    pub fn is_internal(&self) -> bool {
        self.target.is_none()
    }
}

impl<S: State, E: Event> Clone for TransitionDefinition<S, E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            event: self.event.clone(),
            target: self.target.clone(),
            guard: self.guard.clone(),
            actions: self.actions.clone(),
        }
    }
}
