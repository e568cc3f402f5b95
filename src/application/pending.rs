//! Awaitable completion handles for queued operations.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::application::error::{ApplicationError, ApplicationResult};

/// Completion handle for an operation queued on the app worker.
///
/// The operation is applied whether or not the handle is awaited; awaiting
/// it waits until the tree reflects the operation. Dropping the handle does
/// not cancel; call [`Pending::cancel`] for that.
#[must_use = "await the handle to observe the completed operation"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<ApplicationResult<T>>,
    token: CancellationToken,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<ApplicationResult<T>>, token: CancellationToken) -> Self {
        Self { rx, token }
    }

    /// A handle that is already resolved, used when queueing fails.
    pub(crate) fn ready(result: ApplicationResult<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self::new(rx, CancellationToken::new())
    }

    /// Requests cancellation. Has no effect once the worker applied it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Future for Pending<T> {
    type Output = ApplicationResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(ApplicationError::Closed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
