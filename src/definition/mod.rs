//! Declared states, their actions and their transitions.
//!
//! Definitions are assembled by the builder and then owned, read-only, by
//! the machine's processor. Resolving composite states is not part of this
//! crate: every declared state is a leaf.

mod action;
mod transition;

pub use action::{Action, ActionFuture};
pub use transition::TransitionDefinition;

use crate::builder::BuildError;
use crate::core::{Event, State};
use std::collections::HashMap;

/// Behavior attached to one state.
pub struct StateDefinition<S: State, E: Event> {
    pub id: S,
    pub entry_actions: Vec<Action>,
    pub exit_actions: Vec<Action>,
    pub transitions: Vec<TransitionDefinition<S, E>>,
}

impl<S: State, E: Event> StateDefinition<S, E> {
    pub fn new(id: S) -> Self {
        Self {
            id,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            transitions: Vec::new(),
        }
    }
}

/// All states declared for a machine.
pub struct StateDefinitions<S: State, E: Event> {
    states: HashMap<S, StateDefinition<S, E>>,
}

impl<S: State, E: Event> Default for StateDefinitions<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> StateDefinitions<S, E> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    pub fn get(&self, state: &S) -> Option<&StateDefinition<S, E>> {
        self.states.get(state)
    }

    /// Get the definition of `state`, declaring it if needed.
    pub fn declare(&mut self, state: S) -> &mut StateDefinition<S, E> {
        self.states
            .entry(state.clone())
            .or_insert_with(|| StateDefinition::new(state))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Entry actions of `state`; empty when the state was never declared.
    pub fn entry_actions(&self, state: &S) -> &[Action] {
        self.get(state)
            .map(|definition| definition.entry_actions.as_slice())
            .unwrap_or_default()
    }

    /// Exit actions of `state`; empty when the state was never declared.
    pub fn exit_actions(&self, state: &S) -> &[Action] {
        self.get(state)
            .map(|definition| definition.exit_actions.as_slice())
            .unwrap_or_default()
    }

    /// First transition of `current` for `event` whose guard passes.
    pub fn select_transition(&self, current: &S, event: &E) -> Option<&TransitionDefinition<S, E>> {
        self.get(current)?
            .transitions
            .iter()
            .find(|t| t.can_execute(current, event))
    }

    /// Reject definitions containing transitions that can never be taken.
    pub fn validate(&self) -> Result<(), BuildError> {
        for definition in self.states.values() {
            for (index, transition) in definition.transitions.iter().enumerate() {
                if transition.guard.is_some() {
                    continue;
                }
                let shadows_later = definition.transitions[index + 1..]
                    .iter()
                    .any(|later| later.event == transition.event);
                if shadows_later {
                    return Err(BuildError::UnreachableTransition {
                        state: format!("{:?}", definition.id),
                        event: format!("{:?}", transition.event),
                    });
                }
            }
        }
        Ok(())
    }
}
