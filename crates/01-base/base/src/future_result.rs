//! Futures that resolve with a [`Result`].
//!
//! `FutureResult` chains short-circuit exactly like [`ResultExt`](crate::ResultExt):
//! the `_ok` combinators only run on `Ok` and pass `Err` through untouched,
//! and the `_err` combinators do the opposite.

use crate::cancel::Cancel;
use crate::either::Either;
use crate::error::Elapsed;
use crate::future::{either_future, Continuation, Future, Step};
use crate::timer::{timeout, Timers};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Future resolving with either a value or an error.
pub type FutureResult<V, E> = Future<Result<V, E>>;

/// Lifts `value` into an immediately resolved `Ok`.
pub fn future_ok<V: Clone + 'static, E: 'static>(value: V) -> FutureResult<V, E> {
    Future::new(move |deliver| {
        deliver(Ok(value.clone()));
        Cancel::noop()
    })
}

/// Lifts `error` into an immediately resolved `Err`.
pub fn future_err<V: 'static, E: Clone + 'static>(error: E) -> FutureResult<V, E> {
    Future::new(move |deliver| {
        deliver(Err(error.clone()));
        Cancel::noop()
    })
}

impl<V: 'static, E: 'static> Future<Result<V, E>> {
    /// Runs `f` on `Ok`, passing `Err` through.
    pub fn then_future_ok<U: 'static>(
        self,
        f: impl Fn(V) -> FutureResult<U, E> + 'static,
    ) -> FutureResult<U, E> {
        self.bind(move |result| match result {
            Ok(value) => Step::Later(f(value)),
            Err(error) => Step::Now(Err(error)),
        })
    }

    /// Runs `f` on `Err`, passing `Ok` through.
    pub fn then_future_err<F: 'static>(
        self,
        f: impl Fn(E) -> FutureResult<V, F> + 'static,
    ) -> FutureResult<V, F> {
        self.bind(move |result| match result {
            Ok(value) => Step::Now(Ok(value)),
            Err(error) => Step::Later(f(error)),
        })
    }

    /// Synchronous transform of the `Ok` value.
    pub fn map_future_ok<U: 'static>(self, f: impl Fn(V) -> U + 'static) -> FutureResult<U, E> {
        self.map_future(move |result| result.map(&f))
    }

    /// Synchronous transform of the `Err` value.
    pub fn map_future_err<F: 'static>(self, f: impl Fn(E) -> F + 'static) -> FutureResult<V, F> {
        self.map_future(move |result| result.map_err(&f))
    }
}

impl<T: 'static> Future<Option<T>> {
    /// Runs `f` on `Some`, passing `None` through.
    pub fn then_future_some<U: 'static>(
        self,
        f: impl Fn(T) -> Future<Option<U>> + 'static,
    ) -> Future<Option<U>> {
        self.bind(move |option| match option {
            Some(value) => Step::Later(f(value)),
            None => Step::Now(None),
        })
    }

    /// Synchronous transform of the `Some` value.
    pub fn map_future_some<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Future<Option<U>> {
        self.map_future(move |option| option.map(&f))
    }
}

struct Latch<V, E> {
    settled: Cell<bool>,
    deliver: RefCell<Option<Continuation<Result<V, E>>>>,
}

/// Completion handle passed to the operation wrapped by [`future_async`].
///
/// It may be cloned and invoked any number of times; only the first call is
/// delivered, and nothing is delivered after the future was cancelled.
pub struct Callback<V, E> {
    latch: Rc<Latch<V, E>>,
}

impl<V, E> Clone for Callback<V, E> {
    fn clone(&self) -> Self {
        Self {
            latch: Rc::clone(&self.latch),
        }
    }
}

impl<V, E> Callback<V, E> {
    /// Reports the outcome of the operation.
    pub fn resolve(&self, result: Result<V, E>) {
        if self.latch.settled.replace(true) {
            debug!("async callback invoked again after settling; ignored");
            return;
        }
        let deliver = self.latch.deliver.borrow_mut().take();
        if let Some(deliver) = deliver {
            deliver(result);
        }
    }

    /// Reports success.
    pub fn ok(&self, value: V) {
        self.resolve(Ok(value));
    }

    /// Reports failure.
    pub fn err(&self, error: E) {
        self.resolve(Err(error));
    }

    /// Returns `true` once a result was delivered or the future was cancelled.
    pub fn is_settled(&self) -> bool {
        self.latch.settled.get()
    }
}

/// Adapts a callback-style operation into a [`FutureResult`].
///
/// `start` runs once per subscription and receives a [`Callback`]. Arguments
/// for the operation are captured by the closure. Cancelling cannot abort the
/// underlying operation; it only makes every later callback a no-op.
pub fn future_async<V: 'static, E: 'static>(
    start: impl Fn(Callback<V, E>) + 'static,
) -> FutureResult<V, E> {
    Future::new(move |deliver| {
        let latch = Rc::new(Latch {
            settled: Cell::new(false),
            deliver: RefCell::new(Some(deliver)),
        });
        start(Callback {
            latch: Rc::clone(&latch),
        });
        Cancel::new(move || {
            latch.settled.set(true);
            latch.deliver.borrow_mut().take();
        })
    })
}

/// Races `fut` against a deadline of `after` on `timers`.
///
/// Resolves `Ok` with the value if `fut` wins and `Err(Elapsed)` if the
/// deadline wins; the loser is cancelled either way.
pub fn max_delay<T: 'static>(
    timers: &Timers,
    after: Duration,
    fut: Future<T>,
) -> FutureResult<T, Elapsed> {
    either_future(fut, timeout(timers, after, Elapsed { after })).map_future(Either::a_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::future;

    fn capture<T: 'static>(fut: &Future<T>) -> (Rc<RefCell<Vec<T>>>, Cancel) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&seen);
        let cancel = fut.subscribe(move |v| out.borrow_mut().push(v));
        (seen, cancel)
    }

    #[test]
    fn then_future_err_recovers_and_skips_ok() {
        let recovered = future_err::<u8, &str>("boom")
            .then_future_err(|e: &str| future_ok::<u8, ()>(e.len() as u8));
        let (seen, _) = capture(&recovered);
        assert_eq!(*seen.borrow(), vec![Ok(4)]);

        let untouched =
            future_ok::<u8, &str>(1).then_future_err(|_| future_err::<u8, &str>("never"));
        let (seen, _) = capture(&untouched);
        assert_eq!(*seen.borrow(), vec![Ok(1)]);
    }

    #[test]
    fn map_variants_touch_only_their_branch() {
        let (seen, _) = capture(&future_ok::<u8, String>(2).map_future_ok(|v| v * 5));
        assert_eq!(*seen.borrow(), vec![Ok(10)]);
        let (seen, _) = capture(&future_err::<u8, &str>("e").map_future_ok(|v| v * 5));
        assert_eq!(*seen.borrow(), vec![Err("e")]);
        let (seen, _) = capture(&future_err::<u8, &str>("e").map_future_err(str::len));
        assert_eq!(*seen.borrow(), vec![Err(1)]);
    }

    #[test]
    fn option_futures_short_circuit() {
        let calls = Rc::new(Cell::new(0));
        let spy = Rc::clone(&calls);
        let chained = future(None::<u8>).then_future_some(move |v| {
            spy.set(spy.get() + 1);
            future(Some(v))
        });
        let (seen, _) = capture(&chained);
        assert_eq!(*seen.borrow(), vec![None]);
        assert_eq!(calls.get(), 0);

        let (seen, _) = capture(&future(Some(3u8)).map_future_some(|v| v + 1));
        assert_eq!(*seen.borrow(), vec![Some(4)]);
    }

    #[test]
    fn future_async_ignores_callbacks_after_cancel() {
        let stash: Rc<RefCell<Option<Callback<u8, ()>>>> = Rc::new(RefCell::new(None));
        let keep = Rc::clone(&stash);
        let fut = future_async(move |cb| *keep.borrow_mut() = Some(cb));
        let (seen, mut cancel) = capture(&fut);

        cancel.cancel();
        let cb = stash.borrow_mut().take().expect("operation started");
        assert!(cb.is_settled());
        cb.ok(1);
        assert!(seen.borrow().is_empty());
    }
}
