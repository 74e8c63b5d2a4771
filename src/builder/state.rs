//! Builder for the behavior of one state.

use super::transition::TransitionBuilder;
use crate::core::{Event, State};
use crate::definition::{Action, StateDefinition};
use crate::error::ActionError;
use std::future::Future;

/// Declares entry actions, exit actions and transitions of a state.
pub struct StateBuilder<'a, S: State, E: Event> {
    definition: &'a mut StateDefinition<S, E>,
}

impl<'a, S: State, E: Event> StateBuilder<'a, S, E> {
    pub(crate) fn new(definition: &'a mut StateDefinition<S, E>) -> Self {
        Self { definition }
    }

    /// Run `action` whenever the state is entered.
    pub fn on_entry<F>(self, action: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.definition.entry_actions.push(Action::from_fn(action));
        self
    }

    pub fn on_entry_async<F, Fut>(self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.definition.entry_actions.push(Action::from_async(action));
        self
    }

    /// Run `action` whenever the state is left by an external transition.
    pub fn on_exit<F>(self, action: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.definition.exit_actions.push(Action::from_fn(action));
        self
    }

    pub fn on_exit_async<F, Fut>(self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.definition.exit_actions.push(Action::from_async(action));
        self
    }

    /// Declare a transition triggered by `event`.
    pub fn on(self, event: E) -> TransitionBuilder<'a, S, E> {
        TransitionBuilder::new(self.definition, event)
    }
}
