//! Multi-shot producers.
//!
//! An [`Emit`] pushes any number of values into a [`Sink`] and then signals
//! completion through a [`DoneFn`]. Subscriptions are guarded: the done signal
//! is delivered at most once, and values sent after cancellation or after done
//! are dropped.

use crate::cancel::Cancel;
use crate::future::Future;
use crate::send::{DoneFn, Sink};
use crate::timer::{TimerId, Timers};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Cancellable stream of `T` values.
pub struct Emit<T> {
    run: Rc<dyn Fn(Sink<T>, DoneFn) -> Cancel>,
}

impl<T> Clone for Emit<T> {
    fn clone(&self) -> Self {
        Self {
            run: Rc::clone(&self.run),
        }
    }
}

impl<T: 'static> Emit<T> {
    /// Builds a stream from a producer function.
    pub fn new(run: impl Fn(Sink<T>, DoneFn) -> Cancel + 'static) -> Self {
        Self { run: Rc::new(run) }
    }

    /// Emits every item synchronously, then finishes.
    pub fn from_values(items: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone,
    {
        let items: Vec<T> = items.into_iter().collect();
        Emit::new(move |send, done| {
            for item in items.iter() {
                send(item.clone());
            }
            done();
            Cancel::noop()
        })
    }

    /// Emits the future's value once and finishes.
    pub fn from_future(fut: Future<T>) -> Self {
        Emit::new(move |send, done| {
            fut.subscribe(move |value| {
                send(value);
                done();
            })
        })
    }

    /// Starts the producer.
    pub fn subscribe(&self, send: impl Fn(T) + 'static, done: impl FnOnce() + 'static) -> Cancel {
        let live = Rc::new(Cell::new(true));
        let send_live = Rc::clone(&live);
        let sink: Sink<T> = Rc::new(move |value| {
            if send_live.get() {
                send(value);
            }
        });
        let done_live = Rc::clone(&live);
        let finish: DoneFn = Box::new(move || {
            if done_live.replace(false) {
                done();
            }
        });
        let mut inner = (self.run)(sink, finish);
        Cancel::new(move || {
            if live.replace(false) {
                inner.cancel();
            }
        })
    }

    /// Transforms every value.
    pub fn map_emit<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Emit<U> {
        let f = Rc::new(f);
        Emit::new(move |send, done| {
            let f = Rc::clone(&f);
            self.subscribe(move |value| send(f(value)), done)
        })
    }

    /// Keeps only the values matching `keep`.
    pub fn filter_emit(self, keep: impl Fn(&T) -> bool + 'static) -> Emit<T> {
        let keep = Rc::new(keep);
        Emit::new(move |send, done| {
            let keep = Rc::clone(&keep);
            self.subscribe(
                move |value| {
                    if keep(&value) {
                        send(value);
                    }
                },
                done,
            )
        })
    }

    /// Interleaves several streams; finishes after all of them finished.
    pub fn merge(streams: Vec<Emit<T>>) -> Self {
        Emit::new(move |send, done| {
            if streams.is_empty() {
                done();
                return Cancel::noop();
            }
            let remaining = Rc::new(Cell::new(streams.len()));
            let done = Rc::new(RefCell::new(Some(done)));
            let cancels: Vec<Cancel> = streams
                .iter()
                .map(|stream| {
                    let send = Rc::clone(&send);
                    let remaining = Rc::clone(&remaining);
                    let done = Rc::clone(&done);
                    stream.subscribe(
                        move |value| send(value),
                        move || {
                            remaining.set(remaining.get() - 1);
                            if remaining.get() == 0 {
                                let finish = done.borrow_mut().take();
                                if let Some(finish) = finish {
                                    finish();
                                }
                            }
                        },
                    )
                })
                .collect();
            Cancel::join(cancels)
        })
    }
}

impl Emit<u64> {
    /// Emits `0..count` spaced `period` apart on `timers`, then finishes.
    pub fn interval(timers: &Timers, period: Duration, count: u64) -> Self {
        let timers = timers.clone();
        Emit::new(move |send, done| {
            let armed: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
            let done = Rc::new(RefCell::new(Some(done)));
            arm_tick(timers.clone(), period, 0, count, send, done, Rc::clone(&armed));
            let timers = timers.clone();
            Cancel::new(move || {
                if let Some(id) = armed.take() {
                    timers.clear(id);
                }
            })
        })
    }
}

fn arm_tick(
    timers: Timers,
    period: Duration,
    tick: u64,
    count: u64,
    send: Sink<u64>,
    done: Rc<RefCell<Option<DoneFn>>>,
    armed: Rc<Cell<Option<TimerId>>>,
) {
    if tick >= count {
        armed.set(None);
        let finish = done.borrow_mut().take();
        if let Some(finish) = finish {
            finish();
        }
        return;
    }
    let next = timers.clone();
    let slot = Rc::clone(&armed);
    let id = timers.schedule(period, move || {
        send(tick);
        arm_tick(next, period, tick + 1, count, send, done, slot);
    });
    armed.set(Some(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::future::future;

    fn collect<T: 'static>(stream: &Emit<T>) -> (Rc<RefCell<Vec<T>>>, Rc<Cell<usize>>, Cancel) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let finished = Rc::new(Cell::new(0));
        let out = Rc::clone(&seen);
        let fin = Rc::clone(&finished);
        let cancel = stream.subscribe(
            move |v| out.borrow_mut().push(v),
            move || fin.set(fin.get() + 1),
        );
        (seen, finished, cancel)
    }

    #[test]
    fn from_values_emits_then_finishes() {
        let (seen, finished, _) = collect(&Emit::from_values([1, 2, 3]).map_emit(|v| v * 10));
        assert_eq!(*seen.borrow(), vec![10, 20, 30]);
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn filter_and_from_future() {
        let (seen, _, _) = collect(&Emit::from_values(0..6).filter_emit(|v| v % 2 == 0));
        assert_eq!(*seen.borrow(), vec![0, 2, 4]);
        let (seen, finished, _) = collect(&Emit::from_future(future("once")));
        assert_eq!(*seen.borrow(), vec!["once"]);
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn interval_ticks_and_cancels() {
        let timers = Timers::new();
        let (seen, finished, mut cancel) =
            collect(&Emit::interval(&timers, Duration::from_millis(10), 5));

        timers.advance(Duration::from_millis(25));
        assert_eq!(*seen.borrow(), vec![0, 1]);
        cancel.cancel();
        assert_eq!(timers.pending(), 0);
        timers.run_until_idle();
        assert_eq!(*seen.borrow(), vec![0, 1]);
        assert_eq!(finished.get(), 0);
    }

    #[test]
    fn merge_interleaves_by_time_and_finishes_once() {
        let timers = Timers::new();
        let fast = Emit::interval(&timers, Duration::from_millis(10), 2).map_emit(|t| ("fast", t));
        let slow = Emit::interval(&timers, Duration::from_millis(15), 2).map_emit(|t| ("slow", t));
        let (seen, finished, _) = collect(&Emit::merge(vec![fast, slow]));

        timers.run_until_idle();
        assert_eq!(
            *seen.borrow(),
            vec![("fast", 0), ("slow", 0), ("fast", 1), ("slow", 1)]
        );
        assert_eq!(finished.get(), 1);
    }
}
