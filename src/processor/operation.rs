//! Units of work submitted to the processor.

use super::deferred::{Deferred, Reply};
use crate::core::{Event, State, StateHistory};
use crate::error::MachineError;
use crate::persistence::Checkpoint;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};

/// One queued operation together with the reply completing its handle.
pub(crate) enum Operation<S: State, E: Event> {
    Initialize {
        state: S,
        reply: Reply<()>,
    },
    Load {
        current_state: Option<S>,
        history_states: HashMap<S, S>,
        reply: Reply<()>,
    },
    Start {
        reply: Reply<()>,
    },
    Fire {
        event: E,
        reply: Reply<()>,
    },
    CurrentState {
        reply: Reply<Option<S>>,
    },
    HistoryStates {
        reply: Reply<HashMap<S, S>>,
    },
    TransitionHistory {
        reply: Reply<StateHistory<S, E>>,
    },
    Save {
        reply: Reply<Checkpoint<S>>,
    },
}

impl<S: State, E: Event> Operation<S, E> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "initialize",
            Self::Load { .. } => "load",
            Self::Start { .. } => "start",
            Self::Fire { .. } => "fire",
            Self::CurrentState { .. } => "current_state",
            Self::HistoryStates { .. } => "history_states",
            Self::TransitionHistory { .. } => "transition_history",
            Self::Save { .. } => "save",
        }
    }
}

/// Submission side of the processor's first-in-first-out queue.
pub(crate) struct OperationQueue<S: State, E: Event> {
    sender: mpsc::UnboundedSender<Operation<S, E>>,
}

impl<S: State, E: Event> Clone for OperationQueue<S, E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: State, E: Event> OperationQueue<S, E> {
    pub(crate) fn new(sender: mpsc::UnboundedSender<Operation<S, E>>) -> Self {
        Self { sender }
    }

    /// Append an operation and return the handle it will complete.
    ///
    /// Never blocks; the operation runs after everything submitted before.
    pub(crate) fn submit<T, F>(&self, build: F) -> Deferred<T>
    where
        F: FnOnce(Reply<T>) -> Operation<S, E>,
    {
        let (reply, receiver) = oneshot::channel();
        match self.sender.send(build(reply)) {
            Ok(()) => Deferred::pending(receiver),
            Err(_) => Deferred::failed(MachineError::WorkerStopped),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakOperationQueue<S, E> {
        WeakOperationQueue {
            sender: self.sender.downgrade(),
        }
    }
}

/// Queue handle that does not keep the processor running.
pub(crate) struct WeakOperationQueue<S: State, E: Event> {
    sender: mpsc::WeakUnboundedSender<Operation<S, E>>,
}

impl<S: State, E: Event> Clone for WeakOperationQueue<S, E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: State, E: Event> WeakOperationQueue<S, E> {
    /// `None` once every strong queue handle has been dropped.
    pub(crate) fn upgrade(&self) -> Option<OperationQueue<S, E>> {
        self.sender.upgrade().map(OperationQueue::new)
    }
}
