//! Saving and restoring a machine's position.
//!
//! A machine can be initialized from previously saved data instead of an
//! initial state. Loading installs the saved current state and history map
//! verbatim: no entry action runs until the machine is started, and the
//! saved state is not checked against the declared states.

use crate::core::State;
use std::collections::HashMap;

pub mod checkpoint;
pub mod error;

pub use checkpoint::{Checkpoint, HistoryEntry, CHECKPOINT_VERSION};
pub use error::CheckpointError;

/// Source of previously saved machine data, read once by `load`.
pub trait StateMachineLoader<S: State> {
    /// The saved current state, if one was recorded.
    fn current_state(&self) -> Option<S>;

    /// The saved composite state to last active child mapping.
    fn history_states(&self) -> HashMap<S, S>;
}

/// Loader staging values supplied by the host.
///
/// # Example
///
/// ```rust
/// use passive_fsm::persistence::{MachineLoader, StateMachineLoader};
/// use std::collections::HashMap;
///
/// let mut loader = MachineLoader::<i32>::new();
/// loader.set_current_state(1);
/// loader.set_history_states(HashMap::new());
///
/// assert_eq!(loader.current_state(), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct MachineLoader<S: State> {
    current_state: Option<S>,
    history_states: HashMap<S, S>,
}

impl<S: State> Default for MachineLoader<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> MachineLoader<S> {
    pub fn new() -> Self {
        Self {
            current_state: None,
            history_states: HashMap::new(),
        }
    }

    /// Stage the current state; `None` stages an unset current state.
    pub fn set_current_state(&mut self, state: impl Into<Option<S>>) {
        self.current_state = state.into();
    }

    pub fn set_history_states(&mut self, history_states: HashMap<S, S>) {
        self.history_states = history_states;
    }
}

impl<S: State> StateMachineLoader<S> for MachineLoader<S> {
    fn current_state(&self) -> Option<S> {
        self.current_state.clone()
    }

    fn history_states(&self) -> HashMap<S, S> {
        self.history_states.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_loader_stages_nothing() {
        let loader: MachineLoader<i32> = MachineLoader::new();
        assert_eq!(loader.current_state(), None);
        assert!(loader.history_states().is_empty());
    }

    #[test]
    fn staged_values_are_returned_verbatim() {
        let mut loader = MachineLoader::<i32>::new();
        loader.set_current_state(3);
        loader.set_history_states(HashMap::from([(1, 3)]));

        assert_eq!(loader.current_state(), Some(3));
        assert_eq!(loader.history_states(), HashMap::from([(1, 3)]));
    }

    #[test]
    fn current_state_can_be_cleared() {
        let mut loader = MachineLoader::<i32>::new();
        loader.set_current_state(3);
        loader.set_current_state(None::<i32>);

        assert_eq!(loader.current_state(), None);
    }
}
