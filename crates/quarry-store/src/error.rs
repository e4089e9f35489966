//! Error types for the quarry-store crate.

use quarry::QueryError;
use thiserror::Error;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The query could not be evaluated.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The entity has no key, so it cannot be looked up or removed.
    #[error("entity has no key")]
    MissingKey,
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
