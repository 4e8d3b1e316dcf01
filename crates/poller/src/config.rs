//! Poller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default name of the polling thread.
pub const DEFAULT_THREAD_NAME: &str = "rowwatch-poller";

fn default_thread_name() -> String {
    DEFAULT_THREAD_NAME.to_string()
}

/// Engine configuration.
///
/// Durations are expressed in milliseconds so the struct maps directly onto
/// flat config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Connection string handed to the connector
    pub connection_string: String,
    /// Query executed every cycle
    pub query: String,
    /// Delay between cycles; 0 polls back to back
    #[serde(default)]
    pub poll_interval_ms: u64,
    /// Upper bound for the delay after consecutive failures. Unset keeps the
    /// fixed interval.
    #[serde(default)]
    pub backoff_max_ms: Option<u64>,
    /// Name given to the polling thread
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

impl PollerConfig {
    /// Create a config with a zero interval and no backoff
    pub fn new(connection_string: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            query: query.into(),
            poll_interval_ms: 0,
            backoff_max_ms: None,
            thread_name: default_thread_name(),
        }
    }

    /// Set poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = duration_to_millis(interval);
        self
    }

    /// Enable exponential backoff after failures, capped at `max`
    pub fn with_backoff_max(mut self, max: Duration) -> Self {
        self.backoff_max_ms = Some(duration_to_millis(max));
        self
    }

    /// Set the polling thread's name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn backoff_max(&self) -> Option<Duration> {
        self.backoff_max_ms.map(Duration::from_millis)
    }

    /// Check the connection string and query are present
    pub fn validate(&self) -> Result<()> {
        if self.connection_string.is_empty() {
            return Err(Error::invalid_configuration(
                "connection string must not be empty",
            ));
        }
        if self.query.trim().is_empty() {
            return Err(Error::invalid_configuration("query text must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(Error::invalid_configuration(
                "thread name must not contain NUL bytes",
            ));
        }
        Ok(())
    }
}

fn duration_to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
