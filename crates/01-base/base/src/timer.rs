//! Single-threaded timer driver.
//!
//! Timers are the leaf suspension point of the future algebra: nothing else in
//! this crate introduces delay. The driver keeps its own clock, which tests
//! move explicitly with [`Timers::advance`] and binaries drive against the
//! wall clock with [`Timers::run_realtime`].

use crate::cancel::Cancel;
use crate::future::Future;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::trace;

/// Handle naming one armed timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId {
    deadline: Duration,
    seq: u64,
}

impl TimerId {
    /// Clock reading at which the timer fires.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

struct TimerQueue {
    now: Duration,
    next_seq: u64,
    armed: BTreeMap<TimerId, Box<dyn FnOnce()>>,
}

/// Clonable handle to a timer queue and its clock.
#[derive(Clone)]
pub struct Timers {
    queue: Rc<RefCell<TimerQueue>>,
}

impl Timers {
    /// Creates a driver whose clock starts at zero.
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(TimerQueue {
                now: Duration::ZERO,
                next_seq: 0,
                armed: BTreeMap::new(),
            })),
        }
    }

    /// Current clock reading.
    pub fn now(&self) -> Duration {
        self.queue.borrow().now
    }

    /// Number of timers armed and not yet fired or cleared.
    pub fn pending(&self) -> usize {
        self.queue.borrow().armed.len()
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue
            .borrow()
            .armed
            .keys()
            .next()
            .map(TimerId::deadline)
    }

    /// Arms `callback` to run once `after` has elapsed on this clock.
    ///
    /// Timers sharing a deadline fire in the order they were scheduled.
    pub fn schedule(&self, after: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let id = TimerId {
            deadline: queue.now.saturating_add(after),
            seq: queue.next_seq,
        };
        queue.next_seq += 1;
        queue.armed.insert(id, Box::new(callback));
        trace!(deadline = ?id.deadline, seq = id.seq, "timer armed");
        id
    }

    /// Disarms a timer. Returns `false` if it already fired or was cleared.
    pub fn clear(&self, id: TimerId) -> bool {
        let removed = self.queue.borrow_mut().armed.remove(&id).is_some();
        if removed {
            trace!(deadline = ?id.deadline, seq = id.seq, "timer cleared");
        }
        removed
    }

    /// Moves the clock forward by `by`, firing every timer that falls due.
    ///
    /// Timers armed by callbacks during the call fire too if their deadline
    /// lands inside the window.
    pub fn advance(&self, by: Duration) {
        let until = self.now().saturating_add(by);
        self.advance_to(until);
    }

    /// Jumps from deadline to deadline until no timer is armed.
    pub fn run_until_idle(&self) {
        while let Some(deadline) = self.next_deadline() {
            self.advance_to(deadline);
        }
    }

    /// Like [`Timers::run_until_idle`] but sleeps on the wall clock until each
    /// deadline is actually reached.
    pub fn run_realtime(&self) {
        let origin = Instant::now();
        let base = self.now();
        while let Some(deadline) = self.next_deadline() {
            let target = origin + deadline.saturating_sub(base);
            let now = Instant::now();
            if target > now {
                std::thread::sleep(target - now);
            }
            self.advance_to(deadline);
        }
    }

    fn advance_to(&self, until: Duration) {
        while let Some(callback) = self.pop_due(until) {
            callback();
        }
        let mut queue = self.queue.borrow_mut();
        if queue.now < until {
            queue.now = until;
        }
    }

    fn pop_due(&self, until: Duration) -> Option<Box<dyn FnOnce()>> {
        let mut queue = self.queue.borrow_mut();
        let id = *queue.armed.keys().next()?;
        if id.deadline > until {
            return None;
        }
        queue.now = id.deadline;
        trace!(deadline = ?id.deadline, seq = id.seq, "timer fired");
        queue.armed.remove(&id)
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

/// Future that resolves with `value` once `after` has elapsed on `timers`.
///
/// Cancelling clears the underlying timer.
pub fn timeout<T: Clone + 'static>(timers: &Timers, after: Duration, value: T) -> Future<T> {
    let timers = timers.clone();
    Future::new(move |deliver| {
        let value = value.clone();
        let id = timers.schedule(after, move || deliver(value));
        let timers = timers.clone();
        Cancel::new(move || {
            timers.clear(id);
        })
    })
}
