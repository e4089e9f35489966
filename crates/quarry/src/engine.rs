//! In-memory query execution.
//!
//! The [`InMemoryQueryEngine`] applies a [`Query`] directly to a sequence of
//! [`Queryable`] entities: filter, then sort, then page. Every call is a pure
//! function of its inputs; callers that share a mutable collection must hand
//! the engine a consistent snapshot.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::config::{EngineConfig, NullOrder};
use crate::entity::Queryable;
use crate::error::{QueryError, Result};
use crate::like::LikePattern;
use crate::operator::Operator;
use crate::ordering::{OrderBy, SortOrder};
use crate::predicate::{split_path, Connective, Filter, Predicate};
use crate::query::Query;
use crate::range::Range;
use crate::value::{Operand, Value};

/// Evaluates filters, orderings and page windows against in-memory entities.
///
/// All operations accept anything iterable over [`Queryable`] items, so both
/// `&[T]` (yielding `&T`) and owned collections work.
///
/// # Example
///
/// ```
/// use quarry::{Filter, InMemoryQueryEngine, Number, Operator, OrderBy, Query, Queryable, Value};
///
/// struct Item {
///     id: i64,
/// }
///
/// impl Queryable for Item {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "id" => Some(Value::Number(Number::I64(self.id))),
///             _ => None,
///         }
///     }
/// }
///
/// let items: Vec<Item> = (1..=5).map(|id| Item { id }).collect();
/// let query = Query::new()
///     .filter(Filter::new().add("id", Operator::Gt, 2))
///     .order_by(OrderBy::desc("id"))
///     .limit(2)
///     .offset(1);
///
/// let page = InMemoryQueryEngine::new().query(&items, &query).unwrap();
/// let ids: Vec<i64> = page.iter().map(|item| item.id).collect();
/// assert_eq!(ids, vec![4, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryQueryEngine {
    config: EngineConfig,
}

impl InMemoryQueryEngine {
    /// Creates an engine with the default configuration.
    pub fn new() -> Self {
        InMemoryQueryEngine::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        InMemoryQueryEngine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Filtering
    // ========================================================================

    /// Tests whether a single entity satisfies the filter.
    pub fn matches<E: Queryable>(&self, entity: &E, filter: &Filter) -> Result<bool> {
        CompiledFilter::compile(filter, &self.config)?.matches(entity)
    }

    /// Keeps the entities that satisfy the filter, in input order.
    ///
    /// An empty filter keeps every entity.
    pub fn filter<E, I>(&self, entities: I, filter: &Filter) -> Result<Vec<E>>
    where
        E: Queryable,
        I: IntoIterator<Item = E>,
    {
        let compiled = CompiledFilter::compile(filter, &self.config)?;
        let mut kept = Vec::new();
        for entity in entities {
            if compiled.matches(&entity)? {
                kept.push(entity);
            }
        }
        Ok(kept)
    }

    /// Counts the entities that satisfy the filter.
    pub fn count<E, I>(&self, entities: I, filter: &Filter) -> Result<usize>
    where
        E: Queryable,
        I: IntoIterator<Item = E>,
    {
        let compiled = CompiledFilter::compile(filter, &self.config)?;
        let mut count = 0;
        for entity in entities {
            if compiled.matches(&entity)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the first entity that satisfies the filter.
    pub fn find_one<E, I>(&self, entities: I, filter: &Filter) -> Result<Option<E>>
    where
        E: Queryable,
        I: IntoIterator<Item = E>,
    {
        let compiled = CompiledFilter::compile(filter, &self.config)?;
        for entity in entities {
            if compiled.matches(&entity)? {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Sorting and paging
    // ========================================================================

    /// Stable multi-key sort.
    ///
    /// Each specification breaks the ties of the ones before it; `None`
    /// directions are skipped. Entities with equal keys keep their relative
    /// input order. Null values sort according to [`EngineConfig::nulls`],
    /// whatever the direction.
    pub fn sort<E: Queryable>(&self, entities: Vec<E>, order: &OrderBy) -> Result<Vec<E>> {
        let specs: Vec<(&str, SortOrder)> = order
            .effective()
            .map(|spec| (spec.key.as_str(), spec.direction))
            .collect();
        if specs.is_empty() {
            return Ok(entities);
        }

        let permutation = {
            let mut keys: Vec<Vec<Value<'_>>> = Vec::with_capacity(entities.len());
            for entity in &entities {
                let row = specs
                    .iter()
                    .map(|(path, _)| entity.resolve(path))
                    .collect::<Result<Vec<_>>>()?;
                keys.push(row);
            }
            for column in 0..specs.len() {
                check_sortable(keys.iter().map(|row| &row[column]))?;
            }

            let mut indices: Vec<usize> = (0..entities.len()).collect();
            indices.sort_by(|&a, &b| {
                specs
                    .iter()
                    .enumerate()
                    .map(|(k, (_, dir))| self.compare_keys(&keys[a][k], &keys[b][k], *dir))
                    .find(|ordering| *ordering != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
            indices
        };

        let mut slots: Vec<Option<E>> = entities.into_iter().map(Some).collect();
        Ok(permutation
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }

    /// Slices out the page window starting at `offset` and taking up to
    /// `limit` entities.
    ///
    /// An offset beyond the end yields an empty page.
    pub fn page<E>(entities: Vec<E>, limit: Option<usize>, offset: Option<usize>) -> Vec<E> {
        entities
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    // ========================================================================
    // Full queries
    // ========================================================================

    /// Applies filter, then ordering, then the page window.
    ///
    /// The order is fixed so that paging operates on the fully filtered and
    /// ordered set.
    pub fn query<E, I>(&self, entities: I, query: &Query) -> Result<Vec<E>>
    where
        E: Queryable,
        I: IntoIterator<Item = E>,
    {
        let filtered = match query.get_filter() {
            Some(filter) => self.filter(entities, filter)?,
            None => entities.into_iter().collect(),
        };
        let matched = filtered.len();

        let sorted = match query.get_order_by() {
            Some(order) => self.sort(filtered, order)?,
            None => filtered,
        };

        let page = Self::page(sorted, query.get_limit(), query.get_offset());
        debug!(
            matched,
            returned = page.len(),
            limit = ?query.get_limit(),
            offset = ?query.get_offset(),
            "executed in-memory query"
        );
        Ok(page)
    }

    fn compare_keys(&self, a: &Value<'_>, b: &Value<'_>, dir: SortOrder) -> Ordering {
        let nulls_last = self.config.nulls == NullOrder::Last;
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if nulls_last => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, true) if nulls_last => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => dir.apply(total_order(a, b)),
        }
    }
}

/// Rejects sort columns whose present values are not all of one comparable kind.
fn check_sortable<'v, 'a: 'v>(column: impl Iterator<Item = &'v Value<'a>>) -> Result<()> {
    let mut kind: Option<&'static str> = None;
    for value in column {
        if value.is_null() {
            continue;
        }
        if let Value::Entity(_) = value {
            return Err(QueryError::TypeMismatch {
                expected: "comparable value",
                actual: "entity",
            });
        }
        match kind {
            None => kind = Some(value.type_name()),
            Some(expected) if expected != value.type_name() => {
                return Err(QueryError::TypeMismatch {
                    expected,
                    actual: value.type_name(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Total order over values already checked to share a kind.
fn total_order(a: &Value<'_>, b: &Value<'_>) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => a
            .compare(*b)
            .unwrap_or_else(|| a.to_f64().total_cmp(&b.to_f64())),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// A filter with its per-predicate work (pattern compilation, operand shape
/// checks) done once up front.
struct CompiledFilter<'f> {
    connective: Connective,
    predicates: Vec<CompiledPredicate<'f>>,
}

struct CompiledPredicate<'f> {
    predicate: &'f Predicate,
    test: Test<'f>,
}

enum Test<'f> {
    Equal(&'f Operand),
    Ordered(Operator, &'f Operand),
    Like(LikePattern),
    Between(&'f Range<Operand>),
    In(&'f [Operand]),
}

impl<'f> CompiledFilter<'f> {
    fn compile(filter: &'f Filter, config: &EngineConfig) -> Result<Self> {
        let predicates = filter
            .predicates()
            .iter()
            .map(|p| CompiledPredicate::compile(p, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompiledFilter {
            connective: filter.connective(),
            predicates,
        })
    }

    fn matches<E: Queryable>(&self, entity: &E) -> Result<bool> {
        if self.predicates.is_empty() {
            return Ok(true);
        }
        match self.connective {
            Connective::And => {
                for p in &self.predicates {
                    if !p.evaluate(entity)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Connective::Or => {
                for p in &self.predicates {
                    if p.evaluate(entity)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl<'f> CompiledPredicate<'f> {
    fn compile(predicate: &'f Predicate, config: &EngineConfig) -> Result<Self> {
        split_path(predicate.path())?;
        let value = predicate.value();
        let test = match predicate.operator() {
            Operator::Eq => Test::Equal(value),
            op @ (Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte) => {
                Test::Ordered(op, value)
            }
            Operator::Like => Test::Like(LikePattern::new(&value.to_string(), &config.like)?),
            Operator::Between => match value.as_range() {
                Some(range) => Test::Between(range),
                None => {
                    return Err(QueryError::invalid(format!(
                        "BETWEEN operator requires a range, was {}",
                        value.type_name()
                    )))
                }
            },
            Operator::In => match value.as_list() {
                Some(items) => Test::In(items),
                None => {
                    return Err(QueryError::invalid(format!(
                        "IN operator requires a list, was {}",
                        value.type_name()
                    )))
                }
            },
        };
        trace!(path = predicate.path(), op = %predicate.operator(), "compiled predicate");
        Ok(CompiledPredicate { predicate, test })
    }

    fn evaluate<E: Queryable>(&self, entity: &E) -> Result<bool> {
        let field = entity.resolve(self.predicate.path())?;
        let outcome = match &self.test {
            Test::Equal(operand) => field.equals_operand(operand)?,
            Test::Ordered(op, operand) => field
                .compare_operand(operand)?
                .is_some_and(|ordering| op.eval_ordering(ordering)),
            Test::Like(pattern) => match field {
                Value::String(s) => pattern.is_match(s),
                Value::Null => false,
                other => {
                    return Err(QueryError::TypeMismatch {
                        expected: "string",
                        actual: other.type_name(),
                    })
                }
            },
            Test::Between(range) => {
                range.includes_by(true, |bound| field.compare_operand(bound))?
            }
            Test::In(items) => {
                let mut found = false;
                for item in *items {
                    if field.equals_operand(item)? {
                        found = true;
                        break;
                    }
                }
                found
            }
        };
        Ok(outcome != self.predicate.is_negated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::SortSpecification;
    use crate::value::Number;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
        score: Option<f64>,
    }

    impl Queryable for Row {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "id" => Some(Value::Number(Number::I64(self.id))),
                "name" => Some(Value::String(self.name)),
                "score" => Some(self.score.map_or(Value::Null, |s| Value::Number(Number::F64(s)))),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "b", score: Some(2.0) },
            Row { id: 2, name: "a", score: None },
            Row { id: 3, name: "b", score: Some(1.0) },
            Row { id: 4, name: "a", score: Some(3.0) },
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let data = rows();
        let engine = InMemoryQueryEngine::new();
        assert_eq!(ids(&engine.filter(&data, &Filter::new()).unwrap()), vec![1, 2, 3, 4]);
        let or = Filter::with_connective(Connective::Or);
        assert_eq!(engine.filter(&data, &or).unwrap().len(), 4);
    }

    #[test]
    fn and_requires_all() {
        let data = rows();
        let f = Filter::new()
            .add("name", Operator::Eq, "b")
            .add("id", Operator::Gt, 1);
        let result = InMemoryQueryEngine::new().filter(&data, &f).unwrap();
        assert_eq!(ids(&result), vec![3]);
    }

    #[test]
    fn or_requires_any() {
        let data = rows();
        let f = Filter::with_connective(Connective::Or)
            .add("id", Operator::Eq, 1)
            .add("id", Operator::Eq, 4);
        let result = InMemoryQueryEngine::new().filter(&data, &f).unwrap();
        assert_eq!(ids(&result), vec![1, 4]);
    }

    #[test]
    fn negation_complements() {
        let data = rows();
        let f = Filter::new().add_predicate(Predicate::eq("id", 2).not());
        let result = InMemoryQueryEngine::new().filter(&data, &f).unwrap();
        assert_eq!(ids(&result), vec![1, 3, 4]);
    }

    #[test]
    fn null_never_satisfies_ordering() {
        let data = rows();
        let engine = InMemoryQueryEngine::new();
        let gt = Filter::new().add("score", Operator::Gt, 0.0);
        assert_eq!(ids(&engine.filter(&data, &gt).unwrap()), vec![1, 3, 4]);

        let not_gt = Filter::new().add_predicate(Predicate::new("score", Operator::Gt, 0.0).not());
        assert_eq!(ids(&engine.filter(&data, &not_gt).unwrap()), vec![2]);
    }

    #[test]
    fn eq_null_matches_null() {
        let data = rows();
        let f = Filter::new().add("score", Operator::Eq, Operand::Null);
        assert_eq!(ids(&InMemoryQueryEngine::new().filter(&data, &f).unwrap()), vec![2]);
    }

    #[test]
    fn between_is_inclusive() {
        let data = rows();
        let f = Filter::new().add("id", Operator::Between, Range::new(2, 3));
        assert_eq!(ids(&InMemoryQueryEngine::new().filter(&data, &f).unwrap()), vec![2, 3]);
    }

    #[test]
    fn between_without_range_fails_even_on_empty_input() {
        let f = Filter::new().add("id", Operator::Between, 0);
        let empty: Vec<Row> = Vec::new();
        let err = InMemoryQueryEngine::new().filter(&empty, &f).unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(ref m) if m.contains("number")));
    }

    #[test]
    fn in_checks_membership() {
        let data = rows();
        let f = Filter::new().add("id", Operator::In, vec![1, 3, 9]);
        assert_eq!(ids(&InMemoryQueryEngine::new().filter(&data, &f).unwrap()), vec![1, 3]);

        let bad = Filter::new().add("id", Operator::In, 1);
        assert!(InMemoryQueryEngine::new().filter(&data, &bad).is_err());
    }

    #[test]
    fn like_on_non_string_is_type_mismatch() {
        let data = rows();
        let f = Filter::new().add("id", Operator::Like, "1%");
        assert!(matches!(
            InMemoryQueryEngine::new().filter(&data, &f),
            Err(QueryError::TypeMismatch { expected: "string", actual: "number" })
        ));
    }

    #[test]
    fn type_mismatch_aborts_the_call() {
        let data = rows();
        let f = Filter::new().add("name", Operator::Gt, 3);
        assert!(matches!(
            InMemoryQueryEngine::new().filter(&data, &f),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unknown_attribute_is_resolution_error() {
        let data = rows();
        let f = Filter::new().add("missing", Operator::Eq, 1);
        assert!(matches!(
            InMemoryQueryEngine::new().count(&data, &f),
            Err(QueryError::Resolution { .. })
        ));
    }

    #[test]
    fn sort_is_stable_and_multi_key() {
        let data = rows();
        let engine = InMemoryQueryEngine::new();
        let all: Vec<&Row> = data.iter().collect();

        let by_name = engine.sort(all.clone(), &OrderBy::asc("name")).unwrap();
        assert_eq!(ids(&by_name), vec![2, 4, 1, 3]);

        let by_name_then_id = engine
            .sort(
                all,
                &OrderBy::asc("name").by(SortSpecification::desc("id")),
            )
            .unwrap();
        assert_eq!(ids(&by_name_then_id), vec![4, 2, 3, 1]);
    }

    #[test]
    fn sort_none_direction_keeps_input_order() {
        let data = rows();
        let all: Vec<&Row> = data.iter().collect();
        let sorted = InMemoryQueryEngine::new()
            .sort(all, &OrderBy::new("name", SortOrder::None))
            .unwrap();
        assert_eq!(ids(&sorted), vec![1, 2, 3, 4]);
    }

    #[test]
    fn sort_mixes_integers_and_floats_exactly() {
        struct Key(&'static str, Number);
        impl Queryable for Key {
            fn field(&self, name: &str) -> Option<Value<'_>> {
                (name == "n").then_some(Value::Number(self.1))
            }
        }
        const P53: i64 = 1 << 53;
        let data = [
            Key("above", Number::I64(P53 + 1)),
            Key("float", Number::F64(P53 as f64)),
            Key("exact", Number::I64(P53)),
            Key("below", Number::I64(P53 - 1)),
        ];
        let all: Vec<&Key> = data.iter().collect();
        let sorted = InMemoryQueryEngine::new().sort(all, &OrderBy::asc("n")).unwrap();
        let labels: Vec<&str> = sorted.iter().map(|k| k.0).collect();
        assert_eq!(labels, vec!["below", "float", "exact", "above"]);
    }

    #[test]
    fn nulls_sort_last_in_both_directions_by_default() {
        let data = rows();
        let engine = InMemoryQueryEngine::new();
        let all: Vec<&Row> = data.iter().collect();
        assert_eq!(ids(&engine.sort(all.clone(), &OrderBy::asc("score")).unwrap()), vec![3, 1, 4, 2]);
        assert_eq!(ids(&engine.sort(all, &OrderBy::desc("score")).unwrap()), vec![4, 1, 3, 2]);
    }

    #[test]
    fn nulls_first_when_configured() {
        let data = rows();
        let engine = InMemoryQueryEngine::with_config(EngineConfig {
            nulls: NullOrder::First,
            ..EngineConfig::default()
        });
        let all: Vec<&Row> = data.iter().collect();
        assert_eq!(ids(&engine.sort(all, &OrderBy::asc("score")).unwrap()), vec![2, 3, 1, 4]);
    }

    #[test]
    fn page_windows() {
        let v = vec![1, 2, 3, 4];
        assert_eq!(InMemoryQueryEngine::page(v.clone(), Some(2), Some(1)), vec![2, 3]);
        assert_eq!(InMemoryQueryEngine::page(v.clone(), None, Some(3)), vec![4]);
        assert_eq!(InMemoryQueryEngine::page(v.clone(), Some(3), None), vec![1, 2, 3]);
        assert!(InMemoryQueryEngine::page(v.clone(), Some(2), Some(10)).is_empty());
        assert_eq!(InMemoryQueryEngine::page(v, None, None), vec![1, 2, 3, 4]);
    }

    #[test]
    fn query_filters_then_sorts_then_pages() {
        let data: Vec<Row> = (1..=5)
            .map(|id| Row { id, name: "x", score: None })
            .collect();
        let query = Query::new()
            .filter(Filter::new().add("id", Operator::Gt, 2))
            .order_by(OrderBy::desc("id"))
            .limit(2)
            .offset(1);
        let result = InMemoryQueryEngine::new().query(&data, &query).unwrap();
        assert_eq!(ids(&result), vec![4, 3]);
    }

    #[test]
    fn find_one_returns_first_match() {
        let data = rows();
        let f = Filter::new().add("name", Operator::Eq, "a");
        let found = InMemoryQueryEngine::new().find_one(&data, &f).unwrap();
        assert_eq!(found.map(|r| r.id), Some(2));

        let none = Filter::new().add("name", Operator::Eq, "z");
        assert!(InMemoryQueryEngine::new().find_one(&data, &none).unwrap().is_none());
    }

    #[test]
    fn matches_single_entity() {
        let row = Row { id: 5, name: "Jack", score: None };
        let f = Filter::new().add("name", Operator::Like, "J%");
        assert!(InMemoryQueryEngine::new().matches(&row, &f).unwrap());
    }
}
