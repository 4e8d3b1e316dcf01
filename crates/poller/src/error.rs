//! Error types for rowwatch.
//!
//! Classified so the poll loop can tell fatal configuration problems from
//! recoverable per-cycle failures:
//! - Fatal at construction (invalid configuration)
//! - Recoverable (connection failure, query failure), retried next cycle

use thiserror::Error;

/// Result type for rowwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced by a data-source driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for driver operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad connection descriptor or query (not retriable)
    Configuration,
    /// Could not open a connection (retriable)
    Connection,
    /// Query execution or materialization failed (retriable)
    Query,
    /// Snapshot construction errors
    Snapshot,
    /// Background worker could not be managed
    Worker,
}

impl ErrorCategory {
    /// Whether errors in this category are retried by the poll loop
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection | Self::Query)
    }
}

/// Main error type for rowwatch
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// Construction-time configuration error
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Opening a connection failed
    #[error("connection failure: {message}")]
    ConnectionFailure {
        message: String,
        #[source]
        source: Option<DriverError>,
    },

    /// Executing the query failed
    #[error("query failure: {message}")]
    QueryFailure {
        message: String,
        query: Option<String>,
        #[source]
        source: Option<DriverError>,
    },

    /// A captured result could not be assembled into a snapshot
    #[error(transparent)]
    Snapshot(#[from] rowwatch_core::Error),

    /// The polling worker could not be spawned or joined
    #[error("worker error: {message}")]
    Worker { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            Self::ConnectionFailure { .. } => ErrorCategory::Connection,
            Self::QueryFailure { .. } => ErrorCategory::Query,
            Self::Snapshot(_) => ErrorCategory::Snapshot,
            Self::Worker { .. } => ErrorCategory::Worker,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error wrapping the driver's error
    pub fn connection_with_source(message: impl Into<String>, source: DriverError) -> Self {
        Self::ConnectionFailure {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a query error carrying the query text and the driver's error
    pub fn query_with_source(
        message: impl Into<String>,
        query: impl Into<String>,
        source: DriverError,
    ) -> Self {
        Self::QueryFailure {
            message: message.into(),
            query: Some(query.into()),
            source: Some(source),
        }
    }

    /// Create a worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_categories() {
        assert_eq!(
            Error::invalid_configuration("empty").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(Error::connection("refused").category(), ErrorCategory::Connection);
        assert_eq!(Error::worker("spawn").category(), ErrorCategory::Worker);
        assert_eq!(
            Error::from(rowwatch_core::Error::arity_mismatch(2, 1)).category(),
            ErrorCategory::Snapshot
        );
    }

    #[test]
    fn test_retriable() {
        assert!(Error::connection("refused").is_retriable());
        assert!(Error::query_with_source("bad", "SELECT 1", "boom".into()).is_retriable());
        assert!(!Error::invalid_configuration("empty").is_retriable());
        assert!(!Error::worker("spawn").is_retriable());
    }

    #[test]
    fn test_source_is_preserved() {
        let err = Error::connection_with_source("open failed", "host unreachable".into());
        assert_eq!(err.to_string(), "connection failure: open failed");
        assert_eq!(err.source().unwrap().to_string(), "host unreachable");

        match Error::query_with_source("exec failed", "SELECT * FROM t", "syntax".into()) {
            Error::QueryFailure { query, .. } => assert_eq!(query.as_deref(), Some("SELECT * FROM t")),
            _ => panic!("Wrong error type"),
        }
    }
}
