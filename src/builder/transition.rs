//! Builder for the transitions of one state.

use crate::core::{Event, Guard, State};
use crate::definition::{Action, StateDefinition, TransitionDefinition};
use crate::error::ActionError;
use std::future::Future;

/// Configures the most recently declared transition of a state.
///
/// Returned by [`StateBuilder::on`](super::StateBuilder::on). Without
/// [`goto`](Self::goto) the transition is internal.
pub struct TransitionBuilder<'a, S: State, E: Event> {
    definition: &'a mut StateDefinition<S, E>,
    index: usize,
}

impl<'a, S: State, E: Event> TransitionBuilder<'a, S, E> {
    pub(crate) fn new(definition: &'a mut StateDefinition<S, E>, event: E) -> Self {
        let transition = TransitionDefinition::new(definition.id.clone(), event);
        definition.transitions.push(transition);
        let index = definition.transitions.len() - 1;
        Self { definition, index }
    }

    fn transition(&mut self) -> &mut TransitionDefinition<S, E> {
        &mut self.definition.transitions[self.index]
    }

    /// Set the target state.
    pub fn goto(mut self, target: S) -> Self {
        self.transition().target = Some(target);
        self
    }

    /// Add a guard predicate.
    pub fn guard(mut self, guard: Guard<S, E>) -> Self {
        self.transition().guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&S, &E) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Add an action run while the transition is taken.
    pub fn execute<F>(mut self, action: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        self.transition().actions.push(Action::from_fn(action));
        self
    }

    /// Add an async action run while the transition is taken.
    pub fn execute_async<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        self.transition().actions.push(Action::from_async(action));
        self
    }

    /// Declare another transition of the same state.
    pub fn on(self, event: E) -> TransitionBuilder<'a, S, E> {
        TransitionBuilder::new(self.definition, event)
    }
}
