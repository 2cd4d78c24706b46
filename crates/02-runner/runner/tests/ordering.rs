//! Delivery order and quiescence of the fork scheduler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use runner::{ForkHandle, Scheduler, SchedulerConfig};

type Log = Rc<RefCell<Vec<u32>>>;

fn counter() -> (Rc<Cell<usize>>, impl FnOnce()) {
    let hits = Rc::new(Cell::new(0));
    let bump = Rc::clone(&hits);
    (hits, move || bump.set(bump.get() + 1))
}

/// Events from interleaved forks arrive in enqueue order and completion fires
/// once, only after every fork is done.
#[test]
fn interleaved_forks_deliver_fifo_and_complete_once() {
    let seen: Log = Rc::default();
    let out = Rc::clone(&seen);
    let (completions, on_complete) = counter();
    let sched = Scheduler::new(move |e| out.borrow_mut().push(e), on_complete);

    let a = sched.fork();
    let b = sched.fork();
    a.send(1);
    b.send(3);
    a.send(2);
    a.done();

    sched.run().unwrap();
    assert_eq!(*seen.borrow(), vec![1, 3, 2]);
    assert_eq!(completions.get(), 0, "fork b is still open");

    b.done();
    assert_eq!(completions.get(), 1);
    assert!(sched.is_complete());
}

/// A send made by the handler while it is dispatching is queued behind the
/// events that were already waiting.
#[test]
fn reentrant_send_is_appended_to_tail() {
    let seen: Log = Rc::default();
    let out = Rc::clone(&seen);
    let sched = Scheduler::new_cyclic(
        SchedulerConfig::labelled("reentrant"),
        move |forker| {
            move |e: u32| {
                out.borrow_mut().push(e);
                if e == 1 {
                    let echo = forker.fork().unwrap();
                    echo.send(100);
                    echo.done();
                }
            }
        },
        || {},
    );

    let fork = sched.fork();
    fork.send(1);
    fork.send(2);
    fork.send(3);
    fork.done();
    sched.run().unwrap();

    assert_eq!(*seen.borrow(), vec![1, 2, 3, 100]);
    assert!(sched.is_complete());
}

/// Finishing the last fork from inside the handler completes the scheduler
/// once the current drain pass ends, not in the middle of it.
#[test]
fn done_during_dispatch_waits_for_drain_end() {
    let seen: Log = Rc::default();
    let out = Rc::clone(&seen);
    let slot: Rc<RefCell<Option<ForkHandle<u32>>>> = Rc::default();
    let to_finish = Rc::clone(&slot);
    let observed_at_completion = Rc::new(Cell::new(0));
    let probe = Rc::clone(&observed_at_completion);
    let probe_log = Rc::clone(&seen);
    let sched = Scheduler::new(
        move |e: u32| {
            out.borrow_mut().push(e);
            let handle = to_finish.borrow_mut().take();
            if let Some(handle) = handle {
                handle.done();
            }
        },
        move || probe.set(probe_log.borrow().len()),
    );

    let fork = sched.fork();
    fork.send(1);
    fork.send(2);
    *slot.borrow_mut() = Some(fork);
    sched.run().unwrap();

    assert_eq!(*seen.borrow(), vec![1, 2]);
    assert_eq!(observed_at_completion.get(), 2);
}

/// Once complete, new forks never trigger a second completion.
#[test]
fn completion_fires_at_most_once() {
    let (completions, on_complete) = counter();
    let sched = Scheduler::<u32>::new(|_| {}, on_complete);
    sched.run().unwrap();
    assert_eq!(completions.get(), 1);

    let late = sched.fork();
    late.send(7);
    late.done();
    assert_eq!(completions.get(), 1);
    assert_eq!(sched.stats().delivered, 1);
}

/// A fork that never finishes keeps the scheduler from completing.
#[test]
fn unfinished_fork_blocks_completion() {
    let (completions, on_complete) = counter();
    let config = SchedulerConfig {
        warn_on_leaked_fork: false,
        ..SchedulerConfig::labelled("leaky")
    };
    let sched = Scheduler::<u32>::with_config(config, |_| {}, on_complete);

    let leaked = sched.fork();
    leaked.send(1);
    drop(leaked);
    sched.run().unwrap();

    assert_eq!(completions.get(), 0);
    assert_eq!(sched.active_forks(), 1);
    assert!(!sched.is_complete());
}

/// A second `run()` is rejected and leaves the scheduler untouched.
#[test]
fn second_run_is_an_error() {
    let sched = Scheduler::<u32>::new(|_| {}, || {});
    let fork = sched.fork();
    sched.run().unwrap();
    assert!(sched.run().is_err());
    assert!(sched.is_running());
    fork.done();
    assert!(sched.is_complete());
}
