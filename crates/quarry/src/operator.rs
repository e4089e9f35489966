//! Comparison operators for predicates.
//!
//! The [`Operator`] enum is the closed set of comparisons a [`Predicate`]
//! can express. Every operator has a canonical symbol, and the mapping
//! between operators and symbols is one-to-one.
//!
//! [`Predicate`]: crate::Predicate

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Comparison operator for a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Equal.
    Eq,
    /// Pattern match, `%` matching any run of characters and `_` any single one.
    Like,
    /// Inclusive range membership. Requires a [`Range`](crate::Range) operand.
    Between,
    /// Membership in a list of operands.
    In,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 8] = [
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Eq,
        Operator::Like,
        Operator::Between,
        Operator::In,
    ];

    /// Returns the canonical symbol of this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Eq => "=",
            Operator::Like => "LIKE",
            Operator::Between => "BETWEEN",
            Operator::In => "IN",
        }
    }

    /// Returns the operator for the given symbol, e.g. `"="` yields [`Operator::Eq`].
    ///
    /// Fails with [`QueryError::InvalidArgument`] on unknown symbols.
    pub fn for_symbol(symbol: &str) -> Result<Operator> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| QueryError::invalid(format!("no operator with symbol '{symbol}'")))
    }

    /// Evaluates an ordering comparison given the ordering of field to operand.
    ///
    /// Operators that are not decided by an ordering alone return `false`.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Lte => ordering != Ordering::Greater,
            Operator::Like | Operator::Between | Operator::In => false,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Operator::for_symbol(s)
    }
}

impl TryFrom<String> for Operator {
    type Error = QueryError;

    fn try_from(s: String) -> Result<Self> {
        Operator::for_symbol(&s)
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.symbol().to_string()
    }
}
