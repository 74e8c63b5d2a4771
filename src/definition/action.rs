//! Host-supplied actions run on entry, exit and transition.

use crate::error::ActionError;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future produced by one invocation of an [`Action`].
pub type ActionFuture = BoxFuture<'static, Result<(), ActionError>>;

/// Factory creating a fresh action future on each invocation.
type ActionFactory = Arc<dyn Fn() -> ActionFuture + Send + Sync>;

/// An entry, exit or transition action.
///
/// Synchronous closures and async closures are stored the same way: as a
/// factory producing a boxed future, so the processor awaits both alike.
#[derive(Clone)]
pub struct Action {
    factory: ActionFactory,
}

impl Action {
    /// Wrap a synchronous closure.
    pub fn from_fn<F>(action: F) -> Self
    where
        F: Fn() -> Result<(), ActionError> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(move || future::ready(action()).boxed()),
        }
    }

    /// Wrap a closure returning a future.
    pub fn from_async<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || action().boxed()),
        }
    }

    /// Start one execution of the action.
    pub fn run(&self) -> ActionFuture {
        (self.factory)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}
