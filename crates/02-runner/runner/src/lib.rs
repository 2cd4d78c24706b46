//! Cooperative fork/task scheduler.
//!
//! A [`Scheduler`] owns one FIFO event queue and one top-level handler.
//! Concurrent sub-computations each take a [`ForkHandle`] and push events
//! through it; the scheduler delivers them one at a time in emission order
//! and fires its completion callback once every fork is done.
//!
//! ```
//! use runner::Scheduler;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let out = Rc::clone(&seen);
//! let sched = Scheduler::new(move |event: u32| out.borrow_mut().push(event), || {});
//!
//! let fork = sched.fork();
//! fork.send(1);
//! fork.send(2);
//! fork.done();
//! sched.run().unwrap();
//!
//! assert_eq!(*seen.borrow(), vec![1, 2]);
//! assert!(sched.is_complete());
//! ```

pub mod config;
pub mod error;
pub mod fork;
pub mod sched;

pub use config::{SchedulerConfig, DEFAULT_QUEUE_CAPACITY};
pub use error::{ConfigError, SchedError, SchedResult};
pub use fork::{Fork, ForkHandle, Sender};
pub use sched::{Scheduler, SchedulerStats};
