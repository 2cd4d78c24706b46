//! Cancellation thunks returned by every subscription.
//!
//! A [`Cancel`] wraps the thunk a producer hands back when it is subscribed.
//! Invoking it runs the thunk at most once, so cancelling twice or cancelling
//! a producer that already completed is a no-op. [`CancelCell`] is the shared
//! slot sequential combinators use to forward cancellation to whichever stage
//! is currently in flight.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Idempotent cancellation handle.
#[derive(Default)]
pub struct Cancel {
    thunk: Option<Box<dyn FnOnce()>>,
}

impl Cancel {
    /// Returns a handle that does nothing when cancelled.
    pub fn noop() -> Self {
        Self { thunk: None }
    }

    /// Wraps `thunk` so it runs on the first call to [`Cancel::cancel`].
    pub fn new(thunk: impl FnOnce() + 'static) -> Self {
        Self {
            thunk: Some(Box::new(thunk)),
        }
    }

    /// Merges several handles into one that cancels each of them in order.
    pub fn join(cancels: impl IntoIterator<Item = Cancel>) -> Self {
        let mut all: Vec<Cancel> = cancels.into_iter().collect();
        Cancel::new(move || {
            for cancel in all.iter_mut() {
                cancel.cancel();
            }
        })
    }

    /// Returns `true` while the thunk has not run yet.
    pub fn is_armed(&self) -> bool {
        self.thunk.is_some()
    }

    /// Runs the thunk if it has not already run.
    pub fn cancel(&mut self) {
        if let Some(thunk) = self.thunk.take() {
            thunk();
        }
    }
}

impl fmt::Debug for Cancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancel")
            .field("armed", &self.is_armed())
            .finish()
    }
}

enum Slot {
    Empty,
    Armed(Cancel),
    Cancelled,
}

/// Shared slot holding the cancel of the stage currently in flight.
///
/// Stages may complete synchronously inside `subscribe`, before the caller
/// gets the first stage's handle back, so arming and replacing are ordered:
/// a replaced slot ignores a late [`CancelCell::arm_initial`], and anything
/// stored after [`CancelCell::cancel`] is cancelled on arrival.
#[derive(Clone)]
pub struct CancelCell {
    slot: Rc<RefCell<Slot>>,
}

impl CancelCell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::Empty)),
        }
    }

    /// Returns `true` once [`CancelCell::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        matches!(&*self.slot.borrow(), Slot::Cancelled)
    }

    /// Stores the handle of the first stage unless a later stage already
    /// replaced it.
    pub fn arm_initial(&self, cancel: Cancel) {
        let leftover = {
            let mut slot = self.slot.borrow_mut();
            if matches!(&*slot, Slot::Empty) {
                *slot = Slot::Armed(cancel);
                None
            } else if matches!(&*slot, Slot::Cancelled) {
                Some(cancel)
            } else {
                None
            }
        };
        if let Some(mut cancel) = leftover {
            cancel.cancel();
        }
    }

    /// Swaps in the handle of the stage now in flight.
    pub fn replace(&self, cancel: Cancel) {
        let leftover = {
            let mut slot = self.slot.borrow_mut();
            if matches!(&*slot, Slot::Cancelled) {
                Some(cancel)
            } else {
                *slot = Slot::Armed(cancel);
                None
            }
        };
        if let Some(mut cancel) = leftover {
            cancel.cancel();
        }
    }

    /// Cancels the stage in flight and latches the cell.
    pub fn cancel(&self) {
        let previous = std::mem::replace(&mut *self.slot.borrow_mut(), Slot::Cancelled);
        if let Slot::Armed(mut cancel) = previous {
            cancel.cancel();
        }
    }
}

impl Default for CancelCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(counter: &Rc<Cell<usize>>) -> Cancel {
        let counter = Rc::clone(counter);
        Cancel::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn cancel_runs_thunk_once() {
        let hits = Rc::new(Cell::new(0));
        let mut cancel = counting(&hits);
        assert!(cancel.is_armed());
        cancel.cancel();
        cancel.cancel();
        assert_eq!(hits.get(), 1);
        assert!(!cancel.is_armed());
    }

    #[test]
    fn join_cancels_every_member() {
        let hits = Rc::new(Cell::new(0));
        let mut joined = Cancel::join([counting(&hits), Cancel::noop(), counting(&hits)]);
        joined.cancel();
        joined.cancel();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn cell_cancels_replacement_stage_only() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let cell = CancelCell::new();
        cell.arm_initial(counting(&first));
        cell.replace(counting(&second));
        cell.cancel();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert!(cell.is_cancelled());
    }

    #[test]
    fn late_initial_arm_is_ignored_after_replace() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let cell = CancelCell::new();
        cell.replace(counting(&second));
        cell.arm_initial(counting(&first));
        cell.cancel();
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn handles_stored_after_cancel_fire_immediately() {
        let hits = Rc::new(Cell::new(0));
        let cell = CancelCell::new();
        cell.cancel();
        cell.arm_initial(counting(&hits));
        cell.replace(counting(&hits));
        assert_eq!(hits.get(), 2);
    }
}
