//! Error types for rowwatch core types.

use alloc::string::String;
use core::fmt;

/// Result type alias for core operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while building snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A row's width does not match the snapshot's column count.
    ArityMismatch { expected: usize, got: usize },
    /// Column not found.
    ColumnNotFound { column: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ArityMismatch { expected, got } => {
                write!(f, "Row width mismatch: expected {} columns, got {}", expected, got)
            }
            Error::ColumnNotFound { column } => {
                write!(f, "Column not found: {}", column)
            }
        }
    }
}

impl core::error::Error for Error {}

impl Error {
    /// Creates a row width mismatch error.
    pub fn arity_mismatch(expected: usize, got: usize) -> Self {
        Error::ArityMismatch { expected, got }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::arity_mismatch(2, 3);
        assert!(err.to_string().contains("expected 2 columns, got 3"));

        let err = Error::column_not_found("name");
        assert!(err.to_string().contains("name"));
    }
}
