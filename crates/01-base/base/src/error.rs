use std::time::Duration;
use thiserror::Error;

/// Failure payload produced when [`max_delay`](crate::max_delay) hits its deadline.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[error("deadline of {after:?} elapsed")]
pub struct Elapsed {
    /// Deadline that was exceeded.
    pub after: Duration,
}

impl Elapsed {
    /// Deadline in whole milliseconds.
    pub fn as_millis(&self) -> u128 {
        self.after.as_millis()
    }
}
