//! One-shot, cancellable value producers.
//!
//! A [`Future`] is a re-runnable producer: every [`Future::subscribe`] starts
//! the underlying operation afresh, hands it a continuation, and gets back a
//! [`Cancel`]. The continuation is `FnOnce`, so a single subscription can
//! deliver at most once. Combinators add a latch on top so that nothing is
//! delivered after cancellation, and they forward cancellation to whichever
//! inner subscription is still in flight.
//!
//! Except for primitives built on [`Timers`](crate::Timers) or callback
//! adapters, everything here completes synchronously inside `subscribe`.

use crate::cancel::{Cancel, CancelCell};
use crate::either::Either;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Boxed continuation handed to a producer.
pub type Continuation<T> = Box<dyn FnOnce(T)>;

/// Cancellable one-shot producer of a `T`.
pub struct Future<T> {
    run: Rc<dyn Fn(Continuation<T>) -> Cancel>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future").finish_non_exhaustive()
    }
}

/// Outcome of one sequencing step inside [`Future::bind`].
pub(crate) enum Step<U> {
    /// Deliver right away.
    Now(U),
    /// Continue with another producer.
    Later(Future<U>),
}

impl<T: 'static> Future<T> {
    /// Builds a future from a producer function.
    ///
    /// The producer must call the continuation at most once and must stop
    /// doing so once the returned [`Cancel`] has run.
    pub fn new(run: impl Fn(Continuation<T>) -> Cancel + 'static) -> Self {
        Self { run: Rc::new(run) }
    }

    /// Resolves synchronously, inside `subscribe`, with a copy of `value`.
    pub fn ready(value: T) -> Self
    where
        T: Clone,
    {
        Future::new(move |deliver| {
            deliver(value.clone());
            Cancel::noop()
        })
    }

    /// Never resolves.
    pub fn never() -> Self {
        Future::new(|_deliver| Cancel::noop())
    }

    /// Starts the producer.
    pub fn subscribe(&self, deliver: impl FnOnce(T) + 'static) -> Cancel {
        (self.run)(Box::new(deliver))
    }

    /// Sequential composition: once this future resolves, runs the future
    /// returned by `f`.
    ///
    /// Cancelling before `f` is invoked cancels this future; afterwards it
    /// cancels the one `f` produced.
    pub fn then_future<U: 'static>(self, f: impl Fn(T) -> Future<U> + 'static) -> Future<U> {
        self.bind(move |value| Step::Later(f(value)))
    }

    /// Synchronous transform of the resolved value.
    pub fn map_future<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Future<U> {
        let f = Rc::new(f);
        Future::new(move |deliver| {
            let f = Rc::clone(&f);
            let live = Rc::new(Cell::new(true));
            let guard = Rc::clone(&live);
            let mut inner = self.subscribe(move |value| {
                if guard.get() {
                    deliver(f(value));
                }
            });
            Cancel::new(move || {
                if live.replace(false) {
                    inner.cancel();
                }
            })
        })
    }

    pub(crate) fn bind<U: 'static>(self, step: impl Fn(T) -> Step<U> + 'static) -> Future<U> {
        let step = Rc::new(step);
        Future::new(move |deliver| {
            let cell = CancelCell::new();
            let stage = cell.clone();
            let step = Rc::clone(&step);
            let first = self.subscribe(move |value| {
                if stage.is_cancelled() {
                    return;
                }
                match step(value) {
                    Step::Now(out) => deliver(out),
                    Step::Later(next) => {
                        let guard = stage.clone();
                        let cancel = next.subscribe(move |out| {
                            if !guard.is_cancelled() {
                                deliver(out);
                            }
                        });
                        stage.replace(cancel);
                    }
                }
            });
            cell.arm_initial(first);
            Cancel::new(move || cell.cancel())
        })
    }
}

/// Lifts `value` into an immediately resolved future.
pub fn future<T: Clone + 'static>(value: T) -> Future<T> {
    Future::ready(value)
}

/// Adapts a plain function into one returning an immediately resolved future.
pub fn wrap_future<A, R, F>(f: F) -> impl Fn(A) -> Future<R>
where
    F: Fn(A) -> R,
    R: Clone + 'static,
{
    move |arg| future(f(arg))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RaceState {
    Open,
    Won(usize),
    Cancelled,
}

struct Race<T> {
    state: Cell<RaceState>,
    deliver: RefCell<Option<Continuation<(usize, T)>>>,
    entrants: RefCell<SmallVec<[(usize, Cancel); 4]>>,
}

impl<T> Race<T> {
    fn settle(&self, winner: usize, value: T) {
        if self.state.get() != RaceState::Open {
            return;
        }
        self.state.set(RaceState::Won(winner));
        let losers = std::mem::take(&mut *self.entrants.borrow_mut());
        for (idx, mut cancel) in losers {
            if idx != winner {
                cancel.cancel();
            }
        }
        trace!(winner, "race settled");
        let deliver = self.deliver.borrow_mut().take();
        if let Some(deliver) = deliver {
            deliver((winner, value));
        }
    }

    fn abort(&self) {
        if self.state.get() != RaceState::Open {
            return;
        }
        self.state.set(RaceState::Cancelled);
        let entrants = std::mem::take(&mut *self.entrants.borrow_mut());
        for (_, mut cancel) in entrants {
            cancel.cancel();
        }
        self.deliver.borrow_mut().take();
    }
}

/// Races `futures` and resolves with the first value together with the
/// index of the future that produced it.
///
/// The moment a winner is known every other entrant is cancelled. Futures
/// that resolve synchronously win in index order, and entrants after a
/// synchronous winner are never started. An empty list never resolves.
pub fn select_indexed<T: 'static>(futures: Vec<Future<T>>) -> Future<(usize, T)> {
    Future::new(move |deliver| {
        let race = Rc::new(Race {
            state: Cell::new(RaceState::Open),
            deliver: RefCell::new(Some(deliver)),
            entrants: RefCell::new(SmallVec::new()),
        });
        for (idx, entrant) in futures.iter().enumerate() {
            let handle = Rc::clone(&race);
            let mut cancel = entrant.subscribe(move |value| handle.settle(idx, value));
            match race.state.get() {
                RaceState::Open => race.entrants.borrow_mut().push((idx, cancel)),
                RaceState::Won(winner) => {
                    if winner != idx {
                        cancel.cancel();
                    }
                    break;
                }
                RaceState::Cancelled => {
                    cancel.cancel();
                    break;
                }
            }
        }
        Cancel::new(move || race.abort())
    })
}

/// Races `futures` and resolves with whichever value arrives first.
pub fn select_future<T: 'static>(futures: Vec<Future<T>>) -> Future<T> {
    select_indexed(futures).map_future(|(_, value)| value)
}

/// Races two differently typed futures, tagging the winner's branch.
pub fn either_future<A: 'static, B: 'static>(
    left: Future<A>,
    right: Future<B>,
) -> Future<Either<A, B>> {
    select_future(vec![
        left.map_future(Either::Left),
        right.map_future(Either::Right),
    ])
}

struct Gather<T> {
    open: Cell<bool>,
    remaining: Cell<usize>,
    slots: RefCell<SmallVec<[Option<T>; 4]>>,
    pending: RefCell<SmallVec<[Option<Cancel>; 4]>>,
    deliver: RefCell<Option<Continuation<Vec<T>>>>,
}

impl<T> Gather<T> {
    fn fill(&self, idx: usize, value: T) {
        if !self.open.get() {
            return;
        }
        self.slots.borrow_mut()[idx] = Some(value);
        if let Some(slot) = self.pending.borrow_mut().get_mut(idx) {
            *slot = None;
        }
        let remaining = self.remaining.get() - 1;
        self.remaining.set(remaining);
        if remaining == 0 {
            self.open.set(false);
            let values: Vec<T> = std::mem::take(&mut *self.slots.borrow_mut())
                .into_iter()
                .flatten()
                .collect();
            let deliver = self.deliver.borrow_mut().take();
            if let Some(deliver) = deliver {
                deliver(values);
            }
        }
    }

    fn abort(&self) {
        if !self.open.replace(false) {
            return;
        }
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        for mut cancel in pending.into_iter().flatten() {
            cancel.cancel();
        }
        self.slots.borrow_mut().clear();
        self.deliver.borrow_mut().take();
    }
}

/// Waits for every future and resolves with their values in positional
/// order, regardless of completion order.
///
/// Cancelling before all have resolved cancels every branch still pending.
/// An empty list resolves immediately with an empty vector.
pub fn join_all<T: 'static>(futures: Vec<Future<T>>) -> Future<Vec<T>> {
    Future::new(move |deliver| {
        let count = futures.len();
        let gather = Rc::new(Gather {
            open: Cell::new(true),
            remaining: Cell::new(count),
            slots: RefCell::new((0..count).map(|_| None).collect()),
            pending: RefCell::new((0..count).map(|_| None).collect()),
            deliver: RefCell::new(Some(deliver)),
        });
        if count == 0 {
            gather.open.set(false);
            let deliver = gather.deliver.borrow_mut().take();
            if let Some(deliver) = deliver {
                deliver(Vec::new());
            }
            return Cancel::noop();
        }
        for (idx, member) in futures.iter().enumerate() {
            let resolved = Rc::new(Cell::new(false));
            let flag = Rc::clone(&resolved);
            let handle = Rc::clone(&gather);
            let mut cancel = member.subscribe(move |value| {
                flag.set(true);
                handle.fill(idx, value);
            });
            if resolved.get() {
                continue;
            }
            if gather.open.get() {
                gather.pending.borrow_mut()[idx] = Some(cancel);
            } else {
                cancel.cancel();
                break;
            }
        }
        Cancel::new(move || gather.abort())
    })
}

/// Joins two differently typed futures into a pair.
pub fn join_future<A: 'static, B: 'static>(first: Future<A>, second: Future<B>) -> Future<(A, B)> {
    join_all(vec![
        first.map_future(Either::Left),
        second.map_future(Either::Right),
    ])
    .map_future(|pair| {
        let mut values = pair.into_iter();
        match (values.next(), values.next()) {
            (Some(Either::Left(a)), Some(Either::Right(b))) => (a, b),
            _ => unreachable!("join_all preserves positional order"),
        }
    })
}
