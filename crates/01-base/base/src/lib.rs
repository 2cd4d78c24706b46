//! Functional-reactive primitives.
//!
//! This crate is the substrate the scheduler and every asynchronous consumer
//! build on:
//! * [`OptionExt`] / [`ResultExt`] / [`Either`] / [`Keyed`] – the value algebra.
//! * [`Future`] – re-runnable, cancellable one-shot producers, with
//!   [`FutureResult`] combinators for fallible pipelines.
//! * [`Emit`] – multi-shot producers.
//! * [`Timers`] – the single-threaded clock that backs [`timeout`] and
//!   [`max_delay`].
//!
//! Everything is single-threaded (`Rc`-based) and callback-driven; nothing
//! requires an external event loop.

mod bridge;
pub mod cancel;
pub mod either;
pub mod emit;
mod error;
pub mod future;
pub mod future_result;
pub mod keyed;
pub mod option;
pub mod result;
pub mod send;
pub mod timer;

pub use bridge::{Bridged, Canceled};
pub use cancel::{Cancel, CancelCell};
pub use either::Either;
pub use emit::Emit;
pub use error::Elapsed;
pub use future::{
    either_future, future, join_all, join_future, select_future, select_indexed, wrap_future,
    Continuation, Future,
};
pub use future_result::{
    future_async, future_err, future_ok, max_delay, Callback, FutureResult,
};
pub use keyed::{keyed, keyed_sink, Keyed};
pub use option::{none, some, OptionExt};
pub use result::{err, ok, ResultExt};
pub use send::{noop_sink, sink, DoneFn, Sink};
pub use timer::{timeout, TimerId, Timers};
