//! Quarry - Persistence-agnostic query model and translators.
//!
//! Client code describes what it wants with a small algebra of value types,
//! without knowing where the data lives:
//!
//! - [`Predicate`]: one attribute path, an [`Operator`], an [`Operand`], an
//!   optional negation
//! - [`Filter`]: predicates joined by one [`Connective`] (AND / OR)
//! - [`OrderBy`]: sort keys in precedence order
//! - [`Query`]: filter, ordering, limit and offset, all optional
//!
//! Two targets execute that model:
//!
//! - [`CriteriaTranslator`] drives a backend's [`CriteriaRoot`] and
//!   [`CriteriaBuilder`] to produce native conditions and orders. The
//!   [`sql`] module ships one such backend, rendering SQL text.
//! - [`InMemoryQueryEngine`] evaluates the model directly against
//!   [`Queryable`] entities.
//!
//! # Quick Start
//!
//! ```rust
//! use quarry::{Filter, InMemoryQueryEngine, Number, Operator, OrderBy, Query, Queryable, Value};
//!
//! struct Person {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Queryable for Person {
//!     fn field(&self, name: &str) -> Option<Value<'_>> {
//!         match name {
//!             "id" => Some(Value::Number(Number::I64(self.id))),
//!             "name" => Some(Value::String(&self.name)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let people = vec![
//!     Person { id: 1, name: "Jack".into() },
//!     Person { id: 2, name: "Jill".into() },
//!     Person { id: 3, name: "Joe".into() },
//! ];
//!
//! let query = Query::new()
//!     .filter(Filter::new().add("name", Operator::Like, "J%").add("id", Operator::Gt, 1))
//!     .order_by(OrderBy::desc("id"));
//!
//! let found = InMemoryQueryEngine::new().query(&people, &query).unwrap();
//! let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
//! assert_eq!(names, vec!["Joe", "Jill"]);
//! ```
//!
//! # Operators
//!
//! | Operator | Symbol | Operand |
//! |----------|--------|---------|
//! | `Eq` | `=` | scalar or null |
//! | `Gt`, `Gte`, `Lt`, `Lte` | `>`, `>=`, `<`, `<=` | scalar |
//! | `Like` | `LIKE` | pattern, `%` any run, `_` one character |
//! | `Between` | `BETWEEN` | [`Range`], inclusive |
//! | `In` | `IN` | list |
//!
//! # Derive
//!
//! With the `macros` feature, `#[derive(Queryable)]` generates the accessor
//! from field annotations.

mod config;
mod criteria;
mod engine;
mod entity;
mod error;
mod like;
mod operator;
mod ordering;
mod predicate;
mod query;
mod range;
mod value;

pub mod sql;

// Re-export public API
pub use config::{EngineConfig, LikeOptions, NullOrder};
pub use criteria::{CriteriaBuilder, CriteriaRoot, CriteriaTranslator};
pub use engine::InMemoryQueryEngine;
pub use entity::{resolve_path, Queryable};
pub use error::{QueryError, Result};
pub use like::LikePattern;
pub use operator::Operator;
pub use ordering::{OrderBy, SortOrder, SortSpecification};
pub use predicate::{Connective, Filter, Predicate};
pub use query::Query;
pub use range::Range;
pub use value::{Number, Operand, QueryTimestamp, Timestamp, Value};

#[cfg(feature = "macros")]
pub use quarry_macros::Queryable;
