//! State and event identifiers, and the machine lifecycle status.
//!
//! States and events are plain identifiers: any type that can be cloned,
//! compared, hashed and debugged qualifies. Behavior is attached to them
//! through the builder, not through the types themselves.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Identifier of a declared state.
///
/// Implemented for every type meeting the bounds, so `i32`, `&'static str`
/// or a fieldless enum can be used directly.
///
/// # Example
///
/// ```rust
/// use passive_fsm::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state<S: State>(_: S) {}
///
/// assert_state(Door::Open);
/// assert_state(42);
/// ```
pub trait State: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> State for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Identifier of an event that can be fired at the machine.
pub trait Event: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Event for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Lifecycle phase of a state machine.
///
/// Phases only move forward: `Uninitialized` to `Initialized` (through
/// `initialize` or `load`), then `Initialized` to `Started`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum MachineStatus {
    /// Neither `initialize` nor `load` has been accepted yet.
    #[default]
    Uninitialized,
    /// A current state is staged; entry actions have not run.
    Initialized,
    /// The machine has entered its current state and accepts events.
    Started,
}

impl MachineStatus {
    /// Whether events may be fired in this phase.
    pub fn accepts_events(self) -> bool {
        matches!(self, Self::Started)
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Started => "started",
        };
        f.write_str(name)
    }
}
