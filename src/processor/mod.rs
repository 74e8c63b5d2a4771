//! Serialized processing of machine operations.
//!
//! Every accepted machine call becomes one [`Operation`] appended to a
//! first-in-first-out queue. A single spawned task drains the queue and
//! processes one operation at a time; the caller holds a [`Deferred`]
//! handle that resolves once its operation has been fully processed.
//!
//! Actions may fire further events at the machine. Those are queued behind
//! the running operation, so an action must never await the handle of an
//! event it fires itself. The processor runs until every strong machine
//! handle is gone; actions should hold a [`WeakStateMachine`] of their own
//! machine.
//!
//! [`WeakStateMachine`]: crate::WeakStateMachine

mod deferred;
mod operation;
mod worker;

pub use deferred::Deferred;

pub(crate) use operation::{Operation, OperationQueue, WeakOperationQueue};

use crate::config::MachineConfig;
use crate::core::{Event, State};
use crate::definition::StateDefinitions;
use crate::extension::ExtensionRegistry;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info_span, Instrument};
use worker::{MachineCore, Processor};

/// Spawn the processor of one machine on `runtime`.
///
/// The processor stops once every queue handle has been dropped.
pub(crate) fn spawn<S: State, E: Event>(
    runtime: &Handle,
    config: &MachineConfig,
    definitions: StateDefinitions<S, E>,
    extensions: Arc<ExtensionRegistry<S, E>>,
) -> OperationQueue<S, E> {
    let (sender, receiver) = mpsc::unbounded_channel();
    let core = MachineCore::new(config, definitions, extensions);
    let span = info_span!("state_machine", name = %config.name);
    runtime.spawn(Processor::new(receiver, core).run().instrument(span));
    OperationQueue::new(sender)
}
