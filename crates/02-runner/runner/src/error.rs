use std::path::PathBuf;
use thiserror::Error;

/// Convenience result alias for scheduler operations.
pub type SchedResult<T> = Result<T, SchedError>;

/// Misuse of a scheduler that can be reported instead of asserted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedError {
    /// `run()` was called on a scheduler that already left the suspended state.
    #[error("scheduler `{0}` is already running")]
    AlreadyRunning(String),

    /// A fork factory outlived the scheduler it points to.
    #[error("scheduler was dropped before the fork was requested")]
    SchedulerDropped,
}

/// Failures while loading a [`SchedulerConfig`](crate::SchedulerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scheduler config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scheduler config: {0}")]
    Parse(#[from] serde_json::Error),
}
