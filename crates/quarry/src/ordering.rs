//! Ordering types for query result sorting.
//!
//! Provides [`SortOrder`] for sort direction, [`SortSpecification`] for a
//! single sort key and [`OrderBy`] for the ordered list of keys.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    /// Unsorted. Contributes no ordering clause.
    None,
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl SortOrder {
    /// Applies this direction to an ordering.
    ///
    /// `Asc` returns the ordering unchanged, `Desc` reverses it and `None`
    /// treats everything as equal.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
            SortOrder::None => Ordering::Equal,
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single sort key: attribute path and direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpecification {
    /// The attribute path to sort by.
    pub key: String,
    /// The sort direction.
    #[serde(default)]
    pub direction: SortOrder,
}

impl SortSpecification {
    /// Creates a new sort key with the given direction.
    pub fn new(key: impl Into<String>, direction: SortOrder) -> Self {
        SortSpecification {
            key: key.into(),
            direction,
        }
    }

    /// Creates a new ascending sort key.
    pub fn asc(key: impl Into<String>) -> Self {
        SortSpecification::new(key, SortOrder::Asc)
    }

    /// Creates a new descending sort key.
    pub fn desc(key: impl Into<String>) -> Self {
        SortSpecification::new(key, SortOrder::Desc)
    }
}

/// Ordered, duplicate-free list of sort keys.
///
/// The first entry is the primary sort key, the second breaks its ties, and
/// so on. Adding a specification equal to one already present is a no-op.
///
/// # Example
///
/// ```
/// use quarry::{OrderBy, SortOrder};
///
/// let order = OrderBy::new("lastName", SortOrder::Asc)
///     .by_key("firstName", SortOrder::Asc)
///     .by_key("lastName", SortOrder::Asc);
/// assert_eq!(order.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<SortSpecification>", into = "Vec<SortSpecification>")]
pub struct OrderBy {
    sort: Vec<SortSpecification>,
}

impl OrderBy {
    /// Creates an ordering with a single key.
    pub fn new(key: impl Into<String>, direction: SortOrder) -> Self {
        OrderBy::empty().by(SortSpecification::new(key, direction))
    }

    /// Creates an ordering with no keys.
    pub fn empty() -> Self {
        OrderBy::default()
    }

    /// Creates an ascending ordering on a single key.
    pub fn asc(key: impl Into<String>) -> Self {
        OrderBy::new(key, SortOrder::Asc)
    }

    /// Creates a descending ordering on a single key.
    pub fn desc(key: impl Into<String>) -> Self {
        OrderBy::new(key, SortOrder::Desc)
    }

    /// Appends a sort specification unless an equal one is already present.
    pub fn by(mut self, spec: SortSpecification) -> Self {
        self.push(spec);
        self
    }

    /// Appends a sort key built from its parts.
    pub fn by_key(self, key: impl Into<String>, direction: SortOrder) -> Self {
        self.by(SortSpecification::new(key, direction))
    }

    /// Appends in place. Returns `false` if an equal specification existed.
    pub fn push(&mut self, spec: SortSpecification) -> bool {
        if self.sort.contains(&spec) {
            return false;
        }
        self.sort.push(spec);
        true
    }

    /// The sort specifications in precedence order.
    pub fn specifications(&self) -> &[SortSpecification] {
        &self.sort
    }

    /// Iterates the specifications that contribute ordering (skipping `None`).
    pub fn effective(&self) -> impl Iterator<Item = &SortSpecification> {
        self.sort
            .iter()
            .filter(|spec| spec.direction != SortOrder::None)
    }

    pub fn len(&self) -> usize {
        self.sort.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sort.is_empty()
    }
}

impl From<Vec<SortSpecification>> for OrderBy {
    fn from(specs: Vec<SortSpecification>) -> Self {
        specs.into_iter().fold(OrderBy::empty(), OrderBy::by)
    }
}

impl From<OrderBy> for Vec<SortSpecification> {
    fn from(order: OrderBy) -> Self {
        order.sort
    }
}

impl From<SortSpecification> for OrderBy {
    fn from(spec: SortSpecification) -> Self {
        OrderBy::empty().by(spec)
    }
}

impl<'a> IntoIterator for &'a OrderBy {
    type Item = &'a SortSpecification;
    type IntoIter = std::slice::Iter<'a, SortSpecification>;

    fn into_iter(self) -> Self::IntoIter {
        self.sort.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_apply() {
        assert_eq!(SortOrder::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(SortOrder::None.apply(Ordering::Greater), Ordering::Equal);
    }

    #[test]
    fn default_direction_is_ascending() {
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn duplicates_collapse_keeping_first_position() {
        let order = OrderBy::asc("a")
            .by(SortSpecification::desc("b"))
            .by(SortSpecification::asc("a"))
            .by(SortSpecification::desc("a"));

        let keys: Vec<(&str, SortOrder)> = order
            .specifications()
            .iter()
            .map(|s| (s.key.as_str(), s.direction))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a", SortOrder::Asc),
                ("b", SortOrder::Desc),
                ("a", SortOrder::Desc)
            ]
        );
    }

    #[test]
    fn effective_skips_none() {
        let order = OrderBy::new("a", SortOrder::None).by(SortSpecification::desc("b"));
        let keys: Vec<&str> = order.effective().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["b"]);
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn equality_is_key_and_direction() {
        assert_eq!(SortSpecification::asc("a"), SortSpecification::asc("a"));
        assert_ne!(SortSpecification::asc("a"), SortSpecification::desc("a"));
    }

    #[test]
    fn deserializing_collapses_duplicates() {
        let order: OrderBy = serde_json::from_str(
            r#"[{"key":"id","direction":"DESC"},{"key":"id","direction":"DESC"},{"key":"name"}]"#,
        )
        .unwrap();
        assert_eq!(order, OrderBy::desc("id").by(SortSpecification::asc("name")));
    }
}
