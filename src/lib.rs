//! Passive FSM: lifecycle and queued event processing for asynchronous
//! state machines.
//!
//! A machine is declared up front, then driven through a strict lifecycle:
//! uninitialized, initialized (by [`StateMachine::initialize`] or
//! [`StateMachine::load`]) and started ([`StateMachine::start`]). Entry
//! actions of the initial state only run on start. Every operation is
//! processed by one worker per machine, strictly in submission order, and
//! reports its outcome through a [`Deferred`] handle.
//!
//! # Core Concepts
//!
//! - **Lifecycle**: `initialize` and `load` share one guard and succeed at
//!   most once; `start` requires an initialized machine
//! - **Queued processing**: operations never interleave; actions and
//!   extension notifications of one operation finish before the next begins
//! - **Persistence**: a saved current state and history map are installed
//!   without replaying entry actions
//! - **Extensions**: observers notified in registration order
//!
//! # Example
//!
//! ```rust
//! use passive_fsm::{MachineError, StateMachineBuilder};
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let entered = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&entered);
//!
//! let mut builder = StateMachineBuilder::<i32, i32>::new();
//! builder.in_state(1).on_entry(move || {
//!     flag.store(true, Ordering::SeqCst);
//!     Ok(())
//! });
//! let machine = builder.build().unwrap();
//!
//! machine.initialize(1).await.unwrap();
//! assert!(!entered.load(Ordering::SeqCst));
//!
//! machine.start().await.unwrap();
//! assert!(entered.load(Ordering::SeqCst));
//!
//! assert_eq!(machine.initialize(1).await, Err(MachineError::AlreadyInitialized));
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod definition;
pub mod error;
pub mod extension;
pub mod lifecycle;
pub mod machine;
pub mod persistence;
pub mod processor;

// Re-export commonly used types
pub use builder::{BuildError, StateMachineBuilder};
pub use config::MachineConfig;
pub use self::core::{Event, Guard, MachineStatus, State, StateHistory, StateTransition};
pub use error::{ActionError, MachineError};
pub use extension::Extension;
pub use machine::{StateMachine, WeakStateMachine};
pub use persistence::{Checkpoint, CheckpointError, MachineLoader, StateMachineLoader};
pub use processor::Deferred;
