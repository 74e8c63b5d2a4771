//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::state::StateBuilder;
use crate::config::MachineConfig;
use crate::core::{Event, State};
use crate::definition::StateDefinitions;
use crate::extension::{Extension, ExtensionRegistry};
use crate::machine::StateMachine;
use crate::processor;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Builder declaring the states of a machine before it is created.
pub struct StateMachineBuilder<S: State, E: Event> {
    config: MachineConfig,
    definitions: StateDefinitions<S, E>,
    extensions: Vec<Arc<dyn Extension<S, E>>>,
}

impl<S: State, E: Event> StateMachineBuilder<S, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: MachineConfig::default(),
            definitions: StateDefinitions::new(),
            extensions: Vec::new(),
        }
    }

    /// Set the machine name used in logs and extension callbacks.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Fail operations whose actions fail.
    pub fn propagate_action_errors(mut self, propagate: bool) -> Self {
        self.config.propagate_action_errors = propagate;
        self
    }

    /// Keep at most `limit` executed transitions in the transition log.
    pub fn transition_history_limit(mut self, limit: usize) -> Self {
        self.config.transition_history_limit = limit;
        self
    }

    /// Register an extension before the machine exists.
    pub fn extension(mut self, extension: Arc<dyn Extension<S, E>>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Declare `state` (if needed) and configure its behavior.
    pub fn in_state(&mut self, state: S) -> StateBuilder<'_, S, E> {
        StateBuilder::new(self.definitions.declare(state))
    }

    /// Build the state machine and spawn its processor on the current
    /// Tokio runtime.
    pub fn build(self) -> Result<StateMachine<S, E>, BuildError> {
        self.definitions.validate()?;
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;

        let extensions = Arc::new(ExtensionRegistry::new());
        for extension in self.extensions {
            extensions.add(extension);
        }

        debug!(
            machine = %self.config.name,
            states = self.definitions.len(),
            "building state machine"
        );
        let queue = processor::spawn(
            &runtime,
            &self.config,
            self.definitions,
            Arc::clone(&extensions),
        );
        Ok(StateMachine::new(self.config.name, extensions, queue))
    }
}

impl<S: State, E: Event> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}
