//! The full constraint bundle passed to a query execution surface.

use serde::{Deserialize, Serialize};

use crate::ordering::{OrderBy, SortOrder};
use crate::predicate::Filter;

/// A filter, an ordering, a limit and an offset, all optional.
///
/// An absent filter is unconstrained, an absent ordering leaves results in
/// input order, an absent limit is unbounded and an absent offset is zero.
///
/// # Example
///
/// ```
/// use quarry::{Filter, Operator, OrderBy, Query};
///
/// let query = Query::new()
///     .filter(Filter::new().add("id", Operator::Gt, 2))
///     .order_by(OrderBy::desc("id"))
///     .limit(2)
///     .offset(1);
/// assert_eq!(query.get_limit(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
}

impl Query {
    /// Creates a new unconstrained query.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a query holding only a filter.
    pub fn filtered(filter: Filter) -> Self {
        Query::new().filter(filter)
    }

    /// Creates a query holding only a page window.
    pub fn page(limit: usize, offset: usize) -> Self {
        Query::new().limit(limit).offset(offset)
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Sets the filter.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the ordering.
    pub fn order_by(mut self, order_by: impl Into<OrderBy>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Appends a sort key, creating the ordering if needed.
    pub fn sort(mut self, key: &str, direction: SortOrder) -> Self {
        let order = self.order_by.take().unwrap_or_default();
        self.order_by = Some(order.by_key(key, direction));
        self
    }

    /// Sets the maximum number of results to return.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the number of results to skip.
    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn get_filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn get_order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn set_filter(&mut self, filter: Option<Filter>) {
        self.filter = filter;
    }

    pub fn set_order_by(&mut self, order_by: Option<OrderBy>) {
        self.order_by = order_by;
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: Option<usize>) {
        self.offset = offset;
    }

    /// Returns `true` if no component constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        self.filter.as_ref().map_or(true, Filter::is_empty)
            && self.order_by.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
    }
}

impl From<Filter> for Query {
    fn from(filter: Filter) -> Self {
        Query::filtered(filter)
    }
}

impl From<OrderBy> for Query {
    fn from(order_by: OrderBy) -> Self {
        Query::new().order_by(order_by)
    }
}
