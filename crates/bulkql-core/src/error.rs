//! Error types for bulkql

use std::fmt;

use thiserror::Error;

/// Classification of a failed statement execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionErrorKind {
    /// A unique, foreign key, NOT NULL or CHECK constraint rejected a row
    ConstraintViolation,
    /// The connection was lost or could not be used
    Connection,
    /// The database refused to parse or plan the statement
    SyntaxRejected,
    /// Anything the driver did not let us classify
    Other,
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExecutionErrorKind::ConstraintViolation => "constraint violation",
            ExecutionErrorKind::Connection => "connection",
            ExecutionErrorKind::SyntaxRejected => "syntax rejected",
            ExecutionErrorKind::Other => "other",
        };
        f.write_str(label)
    }
}

impl ExecutionErrorKind {
    /// Best-effort classification of a driver error message.
    ///
    /// Drivers that expose structured error codes should build
    /// `BulkqlError::Execution` directly instead of relying on this.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("constraint")
            || lower.contains("duplicate key")
            || lower.contains("duplicate entry")
            || lower.contains("violates")
        {
            ExecutionErrorKind::ConstraintViolation
        } else if lower.contains("syntax error") || lower.contains("near \"") {
            ExecutionErrorKind::SyntaxRejected
        } else if lower.contains("connection")
            || lower.contains("broken pipe")
            || lower.contains("database is locked")
        {
            ExecutionErrorKind::Connection
        } else {
            ExecutionErrorKind::Other
        }
    }
}

/// Core error type for bulkql operations
#[derive(Error, Debug)]
pub enum BulkqlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported option: {option} is not supported by the {dialect} dialect")]
    UnsupportedOption {
        option: &'static str,
        dialect: &'static str,
    },

    #[error("Row shape error: {0}")]
    RowShape(String),

    #[error("Execution error ({kind}): {message}")]
    Execution {
        kind: ExecutionErrorKind,
        message: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl BulkqlError {
    /// Convert a driver-level failure into an `Execution` error.
    ///
    /// Errors that are already `Execution` pass through unchanged; errors that
    /// were never about running a statement (configuration, row shape) are
    /// returned as they are.
    pub fn into_execution(self) -> Self {
        match self {
            BulkqlError::Connection(message) => BulkqlError::Execution {
                kind: ExecutionErrorKind::Connection,
                message,
            },
            BulkqlError::Query(message) => BulkqlError::Execution {
                kind: ExecutionErrorKind::classify(&message),
                message,
            },
            other => other,
        }
    }

    /// The execution classification, if this is an execution failure
    pub fn execution_kind(&self) -> Option<ExecutionErrorKind> {
        match self {
            BulkqlError::Execution { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` for errors raised before any statement was run.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BulkqlError::Configuration(_) | BulkqlError::UnsupportedOption { .. }
        )
    }
}

/// Result type alias for bulkql operations
pub type Result<T> = std::result::Result<T, BulkqlError>;
