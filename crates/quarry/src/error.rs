//! Error types for the quarry crate.

use thiserror::Error;

/// Errors that can occur when building, translating or executing queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An argument was malformed: an unknown operator symbol, a BETWEEN
    /// predicate without a range, an empty attribute path, and so on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operator is not implemented by the translator or engine in use.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An attribute path segment does not exist on the target.
    #[error("cannot resolve '{segment}' in attribute path '{path}'")]
    Resolution { path: String, segment: String },

    /// Value type is incompatible with the field it is compared against.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// A LIKE pattern could not be compiled.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl QueryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        QueryError::InvalidArgument(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        QueryError::UnsupportedOperation(msg.into())
    }

    pub(crate) fn unresolved(path: &str, segment: &str) -> Self {
        QueryError::Resolution {
            path: path.to_string(),
            segment: segment.to_string(),
        }
    }
}

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QueryError>;
