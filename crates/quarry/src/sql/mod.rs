//! SQL rendering backend.
//!
//! A concrete [`CriteriaRoot`](crate::CriteriaRoot) and
//! [`CriteriaBuilder`](crate::CriteriaBuilder) pair that turns the query
//! model into parameterized SQL text:
//!
//! - [`Schema`] maps entities to tables, attributes to typed columns and
//!   relations to join columns.
//! - [`SqlRoot`] resolves dotted attribute paths, registering a `LEFT JOIN`
//!   per relation crossed.
//! - [`SqlCriteria`] builds [`SqlCondition`] trees and checks operand kinds
//!   against column types.
//! - [`SqlQuery`] composes the pieces into a [`Statement`].
//!
//! Executing statements is left to the caller's database driver.

mod condition;
mod dialect;
mod root;
mod schema;
mod statement;

use thiserror::Error;

use crate::error::QueryError;

pub use condition::{SqlCondition, SqlCriteria, SqlOrder};
pub use dialect::{Placeholder, SqlDialect};
pub use root::{ColumnRef, FieldTarget, Join, SqlField, SqlRoot, ROOT_ALIAS};
pub use schema::{Column, ColumnType, EntityDef, Relation, Schema};
pub use statement::{SqlQuery, Statement};

/// Errors raised while translating a query to SQL.
#[derive(Debug, Error)]
pub enum SqlError {
    /// Raised by the translator itself.
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("entity '{entity}' has no attribute '{attribute}'")]
    UnknownAttribute { entity: String, attribute: String },

    /// A path segment was joined through something that is not a relation.
    #[error("'{0}' is not a relation")]
    NotARelation(String),

    /// A relation was used where a column is required.
    #[error("'{0}' is a relation, not a column")]
    NotAColumn(String),

    #[error("type mismatch on '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },
}
