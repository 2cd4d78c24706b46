//! Fork handles: the send/done pairs that feed a [`Scheduler`](crate::Scheduler).

use crate::error::{SchedError, SchedResult};
use crate::sched::Core;
use base::{keyed_sink, Cancel, Emit, Future, Keyed, Sink};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::warn;

/// Clonable factory of forks for one scheduler.
///
/// Holds the scheduler weakly, so it can be captured by the scheduler's own
/// handler without keeping it alive.
pub struct Fork<E> {
    core: Weak<Core<E>>,
}

impl<E> Clone for Fork<E> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<E> fmt::Debug for Fork<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fork")
            .field("alive", &(self.core.strong_count() > 0))
            .finish()
    }
}

impl<E: 'static> Fork<E> {
    pub(crate) fn from_weak(core: Weak<Core<E>>) -> Self {
        Self { core }
    }

    /// Opens a new branch on the scheduler.
    pub fn fork(&self) -> SchedResult<ForkHandle<E>> {
        let core = self.core.upgrade().ok_or(SchedError::SchedulerDropped)?;
        Ok(ForkHandle::open(core))
    }

    /// Forks, sends the future's value and finishes the fork.
    ///
    /// The returned [`Cancel`] cancels the future and still finishes the fork,
    /// so the scheduler can reach quiescence.
    pub fn spawn_future(&self, fut: &Future<E>) -> SchedResult<Cancel> {
        let slot = Rc::new(RefCell::new(Some(self.fork()?)));
        let on_value = Rc::clone(&slot);
        let mut inner = fut.subscribe(move |value| {
            let taken = on_value.borrow_mut().take();
            if let Some(handle) = taken {
                handle.send(value);
                handle.done();
            }
        });
        Ok(Cancel::new(move || {
            inner.cancel();
            finish(&slot);
        }))
    }

    /// Forks and forwards every value of `stream`, finishing the fork when
    /// the stream finishes or the returned [`Cancel`] runs.
    pub fn spawn_emit(&self, stream: &Emit<E>) -> SchedResult<Cancel> {
        let handle = self.fork()?;
        let sender = handle.sender();
        let slot = Rc::new(RefCell::new(Some(handle)));
        let on_done = Rc::clone(&slot);
        let mut inner = stream.subscribe(move |value| sender.send(value), move || finish(&on_done));
        Ok(Cancel::new(move || {
            inner.cancel();
            finish(&slot);
        }))
    }
}

fn finish<E>(slot: &RefCell<Option<ForkHandle<E>>>) {
    let taken = slot.borrow_mut().take();
    if let Some(handle) = taken {
        handle.done();
    }
}

/// One live branch of a scheduler.
///
/// Every handle must be finished with [`ForkHandle::done`]; one that is
/// dropped instead keeps the scheduler from ever completing.
pub struct ForkHandle<E> {
    core: Rc<Core<E>>,
    id: u64,
    finished: bool,
}

impl<E> ForkHandle<E> {
    pub(crate) fn open(core: Rc<Core<E>>) -> Self {
        let id = core.fork_opened();
        Self {
            core,
            id,
            finished: false,
        }
    }

    /// Numeric id of this fork, unique within its scheduler.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queues `event` for delivery.
    pub fn send(&self, event: E) {
        self.core.enqueue(event);
    }

    /// Send-only handle that outlives this fork's borrow.
    pub fn sender(&self) -> Sender<E> {
        Sender {
            core: Rc::clone(&self.core),
        }
    }

    /// Signals that this fork will emit no further events.
    pub fn done(mut self) {
        self.finished = true;
        self.core.fork_closed(self.id);
    }
}

impl<E> fmt::Debug for ForkHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForkHandle")
            .field("sched", &self.core.config.label)
            .field("id", &self.id)
            .finish()
    }
}

impl<E> Drop for ForkHandle<E> {
    fn drop(&mut self) {
        if !self.finished && self.core.config.warn_on_leaked_fork {
            warn!(
                sched = %self.core.config.label,
                fork = self.id,
                "fork dropped without done(); scheduler will never complete"
            );
        }
    }
}

/// Clonable send-only view of a fork.
pub struct Sender<E> {
    core: Rc<Core<E>>,
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<E: 'static> Sender<E> {
    /// Queues `event` for delivery.
    pub fn send(&self, event: E) {
        self.core.enqueue(event);
    }

    /// Adapts this sender into a [`Sink`].
    pub fn as_sink(&self) -> Sink<E> {
        let sender = self.clone();
        Rc::new(move |event| sender.send(event))
    }
}

impl<K, V> Sender<Keyed<K, V>>
where
    K: Clone + 'static,
    V: 'static,
{
    /// Sink that tags every value with `key` before sending it.
    pub fn with_key(&self, key: K) -> Sink<V> {
        keyed_sink(key, self.as_sink())
    }
}

#[cfg(test)]
mod tests {
    use crate::{SchedError, Scheduler};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn forking_a_dropped_scheduler_fails() {
        let sched = Scheduler::<u8>::new(|_| {}, || {});
        let forker = sched.forker();
        drop(sched);
        assert_eq!(forker.fork().unwrap_err(), SchedError::SchedulerDropped);
    }

    #[test]
    fn sender_outlives_done() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let out = Rc::clone(&seen);
        let sched = Scheduler::new(move |e: u8| out.borrow_mut().push(e), || {});
        let fork = sched.fork();
        let sender = fork.sender();
        fork.done();
        sender.send(9);
        sched.run().unwrap();
        assert_eq!(*seen.borrow(), vec![9]);
    }

    #[test]
    fn fork_ids_are_sequential() {
        let sched = Scheduler::<u8>::new(|_| {}, || {});
        let a = sched.fork();
        let b = sched.fork();
        assert_eq!((a.id(), b.id()), (0, 1));
        a.done();
        b.done();
    }
}
