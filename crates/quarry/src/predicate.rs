//! Single comparisons and the filters that combine them.
//!
//! A [`Predicate`] compares one attribute path against an [`Operand`]. A
//! [`Filter`] joins an ordered list of predicates with one [`Connective`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::operator::Operator;
use crate::value::Operand;

/// A single comparison: attribute path, operator, value, optional negation.
///
/// The attribute path may be dotted (`contact.email`) to reach into related
/// entities.
///
/// # Example
///
/// ```
/// use quarry::{Operator, Predicate};
///
/// let adults = Predicate::new("age", Operator::Gte, 18);
/// let not_admins = Predicate::new("contact.email", Operator::Like, "admin@%").not();
/// assert!(not_admins.is_negated());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    path: String,
    op: Operator,
    value: Operand,
    #[serde(default)]
    negated: bool,
}

impl Predicate {
    /// Creates a new predicate.
    pub fn new(path: impl Into<String>, op: Operator, value: impl Into<Operand>) -> Self {
        Predicate {
            path: path.into(),
            op,
            value: value.into(),
            negated: false,
        }
    }

    /// Creates an equality predicate.
    pub fn eq(path: impl Into<String>, value: impl Into<Operand>) -> Self {
        Predicate::new(path, Operator::Eq, value)
    }

    /// Creates a predicate from an operator symbol such as `">="`.
    pub fn with_symbol(
        path: impl Into<String>,
        symbol: &str,
        value: impl Into<Operand>,
    ) -> Result<Self> {
        Ok(Predicate::new(path, Operator::for_symbol(symbol)?, value))
    }

    /// Negates the predicate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(mut self) -> Self {
        self.negated = true;
        self
    }

    /// The attribute path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The comparison operator.
    pub fn operator(&self) -> Operator {
        self.op
    }

    /// The value compared against.
    pub fn value(&self) -> &Operand {
        &self.value
    }

    /// Returns `true` if the comparison result is inverted.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn set_operator(&mut self, op: Operator) {
        self.op = op;
    }

    pub fn set_value(&mut self, value: impl Into<Operand>) {
        self.value = value.into();
    }

    pub fn set_negated(&mut self, negated: bool) {
        self.negated = negated;
    }

    /// Splits the attribute path into its segments.
    ///
    /// Fails with [`QueryError::InvalidArgument`] if the path or any segment
    /// is empty.
    pub fn segments(&self) -> Result<Vec<&str>> {
        split_path(&self.path)
    }
}

/// Splits a dotted attribute path, rejecting empty paths and segments.
pub(crate) fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(QueryError::invalid("attribute path must not be empty"));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(QueryError::invalid(format!(
            "attribute path '{path}' contains an empty segment"
        )));
    }
    Ok(segments)
}

/// Logical join type for the predicates of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connective {
    /// All predicates must hold.
    #[default]
    And,
    /// At least one predicate must hold.
    Or,
}

impl Connective {
    pub fn as_str(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl std::fmt::Display for Connective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Connective {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Connective::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Connective::Or)
        } else {
            Err(QueryError::invalid(format!("unknown connective '{s}'")))
        }
    }
}

/// An ordered set of predicates joined by one connective.
///
/// An empty filter places no constraint on the result, whatever its
/// connective.
///
/// # Example
///
/// ```
/// use quarry::{Connective, Filter, Operator, Predicate};
///
/// let filter = Filter::with_connective(Connective::Or)
///     .add("id", Operator::Eq, 1)
///     .add_predicate(Predicate::eq("id", 2));
/// assert_eq!(filter.predicates().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    connective: Connective,
    #[serde(default)]
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Creates an empty AND filter.
    pub fn new() -> Self {
        Filter::default()
    }

    /// Creates an empty filter with the given connective.
    pub fn with_connective(connective: Connective) -> Self {
        Filter {
            connective,
            predicates: Vec::new(),
        }
    }

    /// Creates an AND filter over the given predicates.
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Filter {
            connective: Connective::And,
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Creates an OR filter over the given predicates.
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Filter {
            connective: Connective::Or,
            predicates: predicates.into_iter().collect(),
        }
    }

    /// Appends a predicate built from its parts.
    pub fn add(self, path: impl Into<String>, op: Operator, value: impl Into<Operand>) -> Self {
        self.add_predicate(Predicate::new(path, op, value))
    }

    /// Appends a predicate.
    pub fn add_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn set_connective(&mut self, connective: Connective) {
        self.connective = connective;
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn predicates_mut(&mut self) -> &mut Vec<Predicate> {
        &mut self.predicates
    }

    /// Returns `true` if this filter has no predicates (matches everything).
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl From<Predicate> for Filter {
    fn from(predicate: Predicate) -> Self {
        Filter::and([predicate])
    }
}
