//! Backend-agnostic translation of the query model.
//!
//! A backend plugs in through two capabilities:
//!
//! - [`CriteriaRoot`] resolves attribute names into native field references,
//!   following relations one segment at a time.
//! - [`CriteriaBuilder`] constructs native comparison, logical and ordering
//!   nodes from those references.
//!
//! [`CriteriaTranslator`] walks [`Filter`]s and [`OrderBy`]s and drives both.
//! It validates only what it owns (BETWEEN operands, empty paths); every other
//! failure originates in the backend and is returned unmodified, since the
//! builder's error type is the translator's error type.

use tracing::{debug, trace};

use crate::error::QueryError;
use crate::operator::Operator;
use crate::ordering::{OrderBy, SortOrder};
use crate::predicate::{split_path, Connective, Filter, Predicate};
use crate::range::Range;
use crate::value::Operand;

/// Resolves attribute names into native field references.
pub trait CriteriaRoot {
    /// Native field reference.
    type Field;
    /// Backend error.
    type Error;

    /// Resolves the first segment of a path against the root entity.
    fn get(&self, attribute: &str) -> Result<Self::Field, Self::Error>;

    /// Resolves a further segment against a previously resolved field,
    /// joining through the relation it names.
    fn join(&self, parent: &Self::Field, attribute: &str) -> Result<Self::Field, Self::Error>;
}

/// Constructs native condition and ordering nodes.
///
/// Comparison methods receive the resolved field and the predicate's operand.
/// Type checks against the field's type belong here: the translator does not
/// pre-validate operand kinds.
pub trait CriteriaBuilder {
    type Field;
    type Condition;
    type Order;
    type Error: From<QueryError>;

    fn equal(&self, field: &Self::Field, value: &Operand) -> Result<Self::Condition, Self::Error>;

    fn greater_than(
        &self,
        field: &Self::Field,
        value: &Operand,
    ) -> Result<Self::Condition, Self::Error>;

    fn greater_than_or_equal(
        &self,
        field: &Self::Field,
        value: &Operand,
    ) -> Result<Self::Condition, Self::Error>;

    fn less_than(&self, field: &Self::Field, value: &Operand)
        -> Result<Self::Condition, Self::Error>;

    fn less_than_or_equal(
        &self,
        field: &Self::Field,
        value: &Operand,
    ) -> Result<Self::Condition, Self::Error>;

    /// Pattern match; the pattern is the operand's string form.
    fn like(&self, field: &Self::Field, pattern: &str) -> Result<Self::Condition, Self::Error>;

    /// Inclusive range membership.
    fn between(
        &self,
        field: &Self::Field,
        start: &Operand,
        end: &Operand,
    ) -> Result<Self::Condition, Self::Error>;

    /// List membership. Backends without a membership node keep the default,
    /// which reports the operation as unsupported.
    fn is_in(
        &self,
        _field: &Self::Field,
        _items: &[Operand],
    ) -> Result<Self::Condition, Self::Error> {
        Err(QueryError::unsupported("IN").into())
    }

    fn not(&self, condition: Self::Condition) -> Result<Self::Condition, Self::Error>;

    /// Conjunction. An empty list must be always-true.
    fn and(&self, conditions: Vec<Self::Condition>) -> Result<Self::Condition, Self::Error>;

    /// Disjunction.
    fn or(&self, conditions: Vec<Self::Condition>) -> Result<Self::Condition, Self::Error>;

    fn asc(&self, field: Self::Field) -> Result<Self::Order, Self::Error>;

    fn desc(&self, field: Self::Field) -> Result<Self::Order, Self::Error>;
}

/// Translates filters and orderings through a root and a builder.
///
/// # Example
///
/// Given a backend implementing both capabilities:
///
/// ```ignore
/// let translator = CriteriaTranslator::new(&root, &builder);
/// let condition = translator.translate_filter(&filter)?;
/// let orders = translator.translate_order_by(&order_by)?;
/// ```
pub struct CriteriaTranslator<'a, R, B> {
    root: &'a R,
    builder: &'a B,
}

impl<'a, R, B> CriteriaTranslator<'a, R, B>
where
    B: CriteriaBuilder,
    R: CriteriaRoot<Field = B::Field, Error = B::Error>,
{
    pub fn new(root: &'a R, builder: &'a B) -> Self {
        CriteriaTranslator { root, builder }
    }

    /// Resolves a dotted path: the first segment against the root, each later
    /// segment as a join off the previous field.
    pub fn resolve_path(&self, path: &str) -> Result<B::Field, B::Error> {
        let segments = split_path(path)?;
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return Err(QueryError::invalid("attribute path must not be empty").into()),
        };
        let mut field = self.root.get(first)?;
        for segment in rest {
            field = self.root.join(&field, segment)?;
        }
        Ok(field)
    }

    /// Translates one predicate, wrapping it in a negation if requested.
    pub fn translate_predicate(&self, predicate: &Predicate) -> Result<B::Condition, B::Error> {
        let field = self.resolve_path(predicate.path())?;
        let value = predicate.value();
        let b = self.builder;

        trace!(
            path = predicate.path(),
            op = %predicate.operator(),
            negated = predicate.is_negated(),
            "translating predicate"
        );

        let condition = match predicate.operator() {
            Operator::Eq => b.equal(&field, value)?,
            Operator::Gt => b.greater_than(&field, value)?,
            Operator::Gte => b.greater_than_or_equal(&field, value)?,
            Operator::Lt => b.less_than(&field, value)?,
            Operator::Lte => b.less_than_or_equal(&field, value)?,
            Operator::Like => b.like(&field, &value.to_string())?,
            Operator::Between => {
                let Range { start, end } = value.as_range().ok_or_else(|| {
                    QueryError::invalid(format!(
                        "BETWEEN operator requires a range, was {}",
                        value.type_name()
                    ))
                })?;
                b.between(&field, start, end)?
            }
            Operator::In => {
                let items = value.as_list().ok_or_else(|| {
                    QueryError::invalid(format!(
                        "IN operator requires a list, was {}",
                        value.type_name()
                    ))
                })?;
                b.is_in(&field, items)?
            }
        };

        if predicate.is_negated() {
            b.not(condition)
        } else {
            Ok(condition)
        }
    }

    /// Translates every predicate and joins them by the filter's connective.
    ///
    /// An empty filter translates to the empty conjunction, whatever its
    /// connective: it places no constraint on the result.
    pub fn translate_filter(&self, filter: &Filter) -> Result<B::Condition, B::Error> {
        if filter.is_empty() {
            return self.builder.and(Vec::new());
        }
        let conditions = filter
            .predicates()
            .iter()
            .map(|p| self.translate_predicate(p))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            connective = %filter.connective(),
            predicates = conditions.len(),
            "translated filter"
        );

        match filter.connective() {
            Connective::And => self.builder.and(conditions),
            Connective::Or => self.builder.or(conditions),
        }
    }

    /// Translates an ordering into native order clauses, in precedence order.
    /// `None` directions are omitted.
    pub fn translate_order_by(&self, order: &OrderBy) -> Result<Vec<B::Order>, B::Error> {
        order
            .specifications()
            .iter()
            .filter_map(|spec| match spec.direction {
                SortOrder::None => None,
                SortOrder::Asc => Some(
                    self.resolve_path(&spec.key)
                        .and_then(|f| self.builder.asc(f)),
                ),
                SortOrder::Desc => Some(
                    self.resolve_path(&spec.key)
                        .and_then(|f| self.builder.desc(f)),
                ),
            })
            .collect()
    }
}
