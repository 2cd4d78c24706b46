//! Bridge from callback futures to `std::future::Future`.
//!
//! The bridged future owns the subscription: dropping it before completion
//! cancels the underlying producer. It is `!Send`, so drive it with a local
//! executor such as `futures::executor::block_on` or a `LocalPool`.

use crate::cancel::Cancel;
use crate::future::Future;
use futures::channel::oneshot;
use std::pin::Pin;
use std::task::{Context, Poll};

pub use futures::channel::oneshot::Canceled;

/// `std::future::Future` adapter returned by [`Future::into_std`].
#[must_use = "dropping a bridged future cancels it"]
pub struct Bridged<T> {
    rx: oneshot::Receiver<T>,
    cancel: Cancel,
}

impl<T: 'static> Future<T> {
    /// Subscribes and exposes the result as a native future.
    ///
    /// Resolves with `Err(Canceled)` if the producer dropped its continuation
    /// without delivering.
    pub fn into_std(&self) -> Bridged<T> {
        let (tx, rx) = oneshot::channel();
        let cancel = self.subscribe(move |value| {
            let _ = tx.send(value);
        });
        Bridged { rx, cancel }
    }
}

impl<T> std::future::Future for Bridged<T> {
    type Output = Result<T, Canceled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        std::future::Future::poll(Pin::new(&mut this.rx), cx)
    }
}

impl<T> Drop for Bridged<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
