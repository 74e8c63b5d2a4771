//! Build errors for state machine definitions.

use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No Tokio runtime available. Build the state machine from within a runtime")]
    NoRuntime,

    #[error("Transition of state {state} on {event} can never be taken: an unguarded transition for the same event is declared before it")]
    UnreachableTransition { state: String, event: String },
}
