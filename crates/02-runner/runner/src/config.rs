//! Scheduler tunables.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Default initial capacity of the event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Per-instance scheduler settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Name attached to every log line the scheduler emits.
    pub label: String,
    /// Initial capacity of the shared event queue.
    pub queue_capacity: usize,
    /// Whether dropping a fork without `done()` is logged.
    pub warn_on_leaked_fork: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            label: "sched".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            warn_on_leaked_fork: true,
        }
    }
}

impl SchedulerConfig {
    /// Builds a default config carrying `label`.
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SchedulerConfig::from_json_str(r#"{ "label": "request-42" }"#).unwrap();
        assert_eq!(config.label, "request-42");
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert!(config.warn_on_leaked_fork);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SchedulerConfig::from_json_str(r#"{ "budget": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SchedulerConfig::from_path("/nonexistent/sched.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sched.json"));
    }
}
