//! Core state machine types.
//!
//! This module contains the vocabulary shared by every other part of the
//! crate:
//! - State and event identifiers via the `State` and `Event` traits
//! - The lifecycle `MachineStatus`
//! - Guard predicates for transition control
//! - Immutable transition history

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{Event, MachineStatus, State};
