//! The state machine handle held by the host.

use crate::core::{Event, MachineStatus, State, StateHistory};
use crate::error::MachineError;
use crate::extension::{Extension, ExtensionRegistry};
use crate::lifecycle::{LifecycleController, StartOutcome};
use crate::persistence::{Checkpoint, StateMachineLoader};
use crate::processor::{Deferred, Operation, OperationQueue, WeakOperationQueue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An asynchronous passive state machine.
///
/// Created by [`StateMachineBuilder`](crate::StateMachineBuilder). The
/// machine must be initialized (or loaded) and then started before events
/// are accepted; entry actions first run on start.
///
/// Every operation returns a [`Deferred`] immediately. Lifecycle violations
/// are detected before anything is queued and resolve the handle with an
/// error right away, leaving the status unchanged.
///
/// Clones share the same machine. The processor stops once the last clone
/// is dropped, so actions that fire events at their own machine must hold
/// a [`WeakStateMachine`] from [`downgrade`](Self::downgrade): a strong
/// clone stored inside an action keeps the processor alive forever.
pub struct StateMachine<S: State, E: Event> {
    name: Arc<str>,
    lifecycle: Arc<LifecycleController>,
    extensions: Arc<ExtensionRegistry<S, E>>,
    queue: OperationQueue<S, E>,
}

impl<S: State, E: Event> Clone for StateMachine<S, E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            lifecycle: Arc::clone(&self.lifecycle),
            extensions: Arc::clone(&self.extensions),
            queue: self.queue.clone(),
        }
    }
}

impl<S: State, E: Event> StateMachine<S, E> {
    pub(crate) fn new(
        name: String,
        extensions: Arc<ExtensionRegistry<S, E>>,
        queue: OperationQueue<S, E>,
    ) -> Self {
        Self {
            name: name.into(),
            lifecycle: Arc::new(LifecycleController::new()),
            extensions,
            queue,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle that does not keep the processor running.
    pub fn downgrade(&self) -> WeakStateMachine<S, E> {
        WeakStateMachine {
            name: Arc::clone(&self.name),
            lifecycle: Arc::clone(&self.lifecycle),
            extensions: Arc::clone(&self.extensions),
            queue: self.queue.downgrade(),
        }
    }

    pub fn status(&self) -> MachineStatus {
        self.lifecycle.status()
    }

    /// Register an observer.
    ///
    /// Allowed at any time; the extension sees every notification emitted
    /// after this call.
    pub fn add_extension(&self, extension: Arc<dyn Extension<S, E>>) {
        self.extensions.add(extension);
    }

    /// Make `initial_state` the current state without entering it.
    ///
    /// Fails with [`MachineError::AlreadyInitialized`] if the machine was
    /// already initialized or loaded.
    pub fn initialize(&self, initial_state: S) -> Deferred {
        let queued = self.lifecycle.begin_initialization(|| {
            debug!(machine = %self.name, state = ?initial_state, "queueing initialization");
            self.queue.submit(|reply| Operation::Initialize {
                state: initial_state,
                reply,
            })
        });
        queued.unwrap_or_else(Deferred::failed)
    }

    /// Install a saved current state and history map without entering.
    ///
    /// Shares its guard with [`initialize`](Self::initialize): whichever
    /// runs first wins and the other fails with
    /// [`MachineError::AlreadyInitialized`].
    pub fn load<L>(&self, loader: &L) -> Deferred
    where
        L: StateMachineLoader<S> + ?Sized,
    {
        // Host code runs before the guard is claimed.
        let current_state = loader.current_state();
        let history_states = loader.history_states();
        let queued = self.lifecycle.begin_initialization(|| {
            debug!(machine = %self.name, state = ?current_state, "queueing load");
            self.queue.submit(|reply| Operation::Load {
                current_state,
                history_states,
                reply,
            })
        });
        queued.unwrap_or_else(Deferred::failed)
    }

    /// Enter the current state, running its entry actions.
    ///
    /// Fails with [`MachineError::NotInitialized`] before `initialize` or
    /// `load`. Starting a started machine succeeds without doing anything.
    pub fn start(&self) -> Deferred {
        let queued = self
            .lifecycle
            .begin_start(|| self.queue.submit(|reply| Operation::Start { reply }));
        match queued {
            Ok(StartOutcome::Starting(deferred)) => deferred,
            Ok(StartOutcome::AlreadyStarted) => Deferred::ready(Ok(())),
            Err(error) => Deferred::failed(error),
        }
    }

    /// Queue `event` for processing.
    ///
    /// Fails with [`MachineError::NotStarted`] before `start`.
    pub fn fire(&self, event: E) -> Deferred {
        if let Err(error) = self.lifecycle.ensure_started() {
            debug!(machine = %self.name, event = ?event, "rejecting event");
            return Deferred::failed(error);
        }
        self.queue.submit(|reply| Operation::Fire { event, reply })
    }

    /// The current state once all previously submitted operations ran.
    pub fn current_state(&self) -> Deferred<Option<S>> {
        self.queue.submit(|reply| Operation::CurrentState { reply })
    }

    /// The history map once all previously submitted operations ran.
    pub fn history_states(&self) -> Deferred<HashMap<S, S>> {
        self.queue.submit(|reply| Operation::HistoryStates { reply })
    }

    /// Transitions executed so far, oldest first.
    pub fn transition_history(&self) -> Deferred<StateHistory<S, E>> {
        self.queue.submit(|reply| Operation::TransitionHistory { reply })
    }

    /// Snapshot the current state and history map.
    pub fn save(&self) -> Deferred<Checkpoint<S>> {
        self.queue.submit(|reply| Operation::Save { reply })
    }
}

impl<S: State, E: Event> std::fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("status", &self.status())
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

/// Non-owning handle to a [`StateMachine`].
pub struct WeakStateMachine<S: State, E: Event> {
    name: Arc<str>,
    lifecycle: Arc<LifecycleController>,
    extensions: Arc<ExtensionRegistry<S, E>>,
    queue: WeakOperationQueue<S, E>,
}

impl<S: State, E: Event> Clone for WeakStateMachine<S, E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            lifecycle: Arc::clone(&self.lifecycle),
            extensions: Arc::clone(&self.extensions),
            queue: self.queue.clone(),
        }
    }
}

impl<S: State, E: Event> WeakStateMachine<S, E> {
    /// The machine, unless every strong handle has been dropped.
    pub fn upgrade(&self) -> Option<StateMachine<S, E>> {
        let queue = self.queue.upgrade()?;
        Some(StateMachine {
            name: Arc::clone(&self.name),
            lifecycle: Arc::clone(&self.lifecycle),
            extensions: Arc::clone(&self.extensions),
            queue,
        })
    }
}

impl<S: State, E: Event> std::fmt::Debug for WeakStateMachine<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakStateMachine")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
