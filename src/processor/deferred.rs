//! Caller-side handle of a queued operation.

use crate::error::MachineError;
use futures::future::FusedFuture;
use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Sender half completing a [`Deferred`].
pub(crate) type Reply<T> = oneshot::Sender<Result<T, MachineError>>;

enum DeferredState<T> {
    Ready(Result<T, MachineError>),
    Pending(oneshot::Receiver<Result<T, MachineError>>),
    Done,
}

/// Result of a machine operation, available once the processor has
/// handled it.
///
/// Returned immediately by every machine call. Awaiting it yields the
/// outcome; dropping it does not cancel the operation. Calls rejected by
/// the lifecycle guard return a handle that is already resolved.
///
/// The handle is fused: once it has produced its result, polling it again
/// returns `Poll::Pending` and [`FusedFuture::is_terminated`] is `true`.
#[must_use = "a deferred result reports failures only when awaited"]
pub struct Deferred<T = ()> {
    state: DeferredState<T>,
}

// The result is moved out, never pinned.
impl<T> Unpin for Deferred<T> {}

impl<T> Deferred<T> {
    pub(crate) fn pending(receiver: oneshot::Receiver<Result<T, MachineError>>) -> Self {
        Self {
            state: DeferredState::Pending(receiver),
        }
    }

    pub(crate) fn ready(result: Result<T, MachineError>) -> Self {
        Self {
            state: DeferredState::Ready(result),
        }
    }

    pub(crate) fn failed(error: MachineError) -> Self {
        Self::ready(Err(error))
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T, MachineError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match mem::replace(&mut self.state, DeferredState::Done) {
            DeferredState::Ready(result) => Poll::Ready(result),
            DeferredState::Pending(mut receiver) => match Pin::new(&mut receiver).poll(cx) {
                Poll::Ready(received) => {
                    Poll::Ready(received.unwrap_or(Err(MachineError::WorkerStopped)))
                }
                Poll::Pending => {
                    self.state = DeferredState::Pending(receiver);
                    Poll::Pending
                }
            },
            DeferredState::Done => Poll::Pending,
        }
    }
}

impl<T> FusedFuture for Deferred<T> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, DeferredState::Done)
    }
}
