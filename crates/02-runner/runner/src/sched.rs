//! Cooperative single-threaded fork scheduler.
//!
//! One [`Scheduler`] multiplexes any number of logical branches ("forks")
//! onto a single FIFO event queue drained by a single loop. It starts
//! suspended: events sent before [`Scheduler::run`] are only queued. Once
//! running, the first send drains the queue; sends that arrive while an event
//! is being delivered are appended to the tail instead of dispatched inline,
//! which keeps the delivery order strictly FIFO across all forks and the
//! stack depth bounded.
//!
//! Every fork must call `done()` exactly once. When the queue is empty and no
//! fork is active at the end of a drain pass, the completion callback fires.
//! It fires at most once per scheduler.

use crate::config::SchedulerConfig;
use crate::error::{SchedError, SchedResult};
use crate::fork::{Fork, ForkHandle};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Suspended,
    Running,
    Dispatching,
}

/// Counters describing a scheduler's lifetime so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Events handed to the top-level handler.
    pub delivered: u64,
    /// Forks created.
    pub forks_spawned: u64,
    /// Forks that called `done()`.
    pub forks_done: u64,
    /// Largest queue length observed.
    pub peak_queue: usize,
}

pub(crate) struct Core<E> {
    pub(crate) config: SchedulerConfig,
    phase: Cell<Phase>,
    active: Cell<usize>,
    next_fork_id: Cell<u64>,
    completed: Cell<bool>,
    queue: RefCell<VecDeque<E>>,
    handler: RefCell<Box<dyn FnMut(E)>>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
    stats: Cell<SchedulerStats>,
}

impl<E> Core<E> {
    fn update_stats(&self, f: impl FnOnce(&mut SchedulerStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    pub(crate) fn enqueue(&self, event: E) {
        let depth = {
            let mut queue = self.queue.borrow_mut();
            queue.push_back(event);
            queue.len()
        };
        self.update_stats(|stats| stats.peak_queue = stats.peak_queue.max(depth));
        if self.phase.get() == Phase::Running {
            self.drain();
        }
    }

    pub(crate) fn fork_opened(&self) -> u64 {
        let id = self.next_fork_id.get();
        self.next_fork_id.set(id + 1);
        self.active.set(self.active.get() + 1);
        self.update_stats(|stats| stats.forks_spawned += 1);
        debug!(sched = %self.config.label, fork = id, active = self.active.get(), "fork opened");
        id
    }

    pub(crate) fn fork_closed(&self, id: u64) {
        self.active.set(self.active.get().saturating_sub(1));
        self.update_stats(|stats| stats.forks_done += 1);
        debug!(sched = %self.config.label, fork = id, active = self.active.get(), "fork done");
        // A drain already in progress re-checks quiescence when it finishes.
        if self.phase.get() == Phase::Running {
            self.drain();
        }
    }

    fn drain(&self) {
        if self.phase.get() != Phase::Running {
            return;
        }
        self.phase.set(Phase::Dispatching);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            self.update_stats(|stats| stats.delivered += 1);
            trace!(sched = %self.config.label, "dispatching event");
            (self.handler.borrow_mut())(event);
        }
        self.phase.set(Phase::Running);
        self.check_quiescence();
    }

    fn check_quiescence(&self) {
        if self.completed.get() || self.active.get() != 0 || !self.queue.borrow().is_empty() {
            return;
        }
        self.completed.set(true);
        debug!(sched = %self.config.label, stats = ?self.stats.get(), "scheduler quiescent");
        let on_complete = self.on_complete.borrow_mut().take();
        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }
}

/// Owner of one scheduler instance, typically one per mount or per request.
pub struct Scheduler<E> {
    core: Rc<Core<E>>,
}

impl<E: 'static> Scheduler<E> {
    /// Creates a suspended scheduler with the default config.
    ///
    /// `handler` receives every event in FIFO order; `on_complete` runs once
    /// the scheduler reaches quiescence.
    pub fn new(handler: impl FnMut(E) + 'static, on_complete: impl FnOnce() + 'static) -> Self {
        Self::with_config(SchedulerConfig::default(), handler, on_complete)
    }

    /// Creates a suspended scheduler with an explicit config.
    pub fn with_config(
        config: SchedulerConfig,
        handler: impl FnMut(E) + 'static,
        on_complete: impl FnOnce() + 'static,
    ) -> Self {
        Self::new_cyclic(config, move |_| handler, on_complete)
    }

    /// Creates a suspended scheduler whose handler can itself fork.
    ///
    /// `make_handler` receives a [`Fork`] factory bound to the scheduler
    /// being built and returns the top-level handler.
    pub fn new_cyclic<H>(
        config: SchedulerConfig,
        make_handler: impl FnOnce(Fork<E>) -> H,
        on_complete: impl FnOnce() + 'static,
    ) -> Self
    where
        H: FnMut(E) + 'static,
    {
        let core = Rc::new_cyclic(|weak| {
            let handler = make_handler(Fork::from_weak(weak.clone()));
            Core {
                queue: RefCell::new(VecDeque::with_capacity(config.queue_capacity)),
                config,
                phase: Cell::new(Phase::Suspended),
                active: Cell::new(0),
                next_fork_id: Cell::new(0),
                completed: Cell::new(false),
                handler: RefCell::new(Box::new(handler)),
                on_complete: RefCell::new(Some(Box::new(on_complete))),
                stats: Cell::new(SchedulerStats::default()),
            }
        });
        Self { core }
    }

    /// Leaves the suspended state and drains everything queued so far.
    ///
    /// May only be called once.
    pub fn run(&self) -> SchedResult<()> {
        if self.core.phase.get() != Phase::Suspended {
            return Err(SchedError::AlreadyRunning(self.core.config.label.clone()));
        }
        debug!(
            sched = %self.core.config.label,
            queued = self.pending_events(),
            active = self.active_forks(),
            "scheduler running"
        );
        self.core.phase.set(Phase::Running);
        self.core.drain();
        Ok(())
    }

    /// Opens a new fork on this scheduler.
    pub fn fork(&self) -> ForkHandle<E> {
        ForkHandle::open(Rc::clone(&self.core))
    }

    /// Returns a clonable fork factory bound to this scheduler.
    pub fn forker(&self) -> Fork<E> {
        Fork::from_weak(Rc::downgrade(&self.core))
    }

    /// Returns `true` until [`Scheduler::run`] has been called.
    pub fn is_suspended(&self) -> bool {
        self.core.phase.get() == Phase::Suspended
    }

    /// Returns `true` once [`Scheduler::run`] has been called.
    pub fn is_running(&self) -> bool {
        !self.is_suspended()
    }

    /// Returns `true` once the completion callback has fired.
    pub fn is_complete(&self) -> bool {
        self.core.completed.get()
    }

    /// Forks opened and not yet done.
    pub fn active_forks(&self) -> usize {
        self.core.active.get()
    }

    /// Events queued and not yet delivered.
    pub fn pending_events(&self) -> usize {
        self.core.queue.borrow().len()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> SchedulerStats {
        self.core.stats.get()
    }

    /// Config this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.core.config
    }
}
