//! Repository traits.

use std::fmt::Debug;

use quarry::{Filter, Operand, Operator, OrderBy, Query};

use crate::error::Result;

/// An entity with a key.
///
/// The key is `None` until the entity is first saved; repositories assign
/// one on save.
pub trait Identifiable {
    type Key: Clone + Ord + Debug;

    fn id(&self) -> Option<Self::Key>;

    fn set_id(&mut self, id: Self::Key);
}

/// Read access to a collection of entities.
pub trait Finder<T: Identifiable> {
    /// Number of entities held.
    fn count(&self) -> usize;

    /// Number of entities satisfying the filter. Always equals the length
    /// of `find` with that filter.
    fn count_matching(&self, filter: &Filter) -> Result<usize>;

    fn get(&self, id: &T::Key) -> Option<T>;

    fn get_all(&self) -> Vec<T>;

    fn get_all_ordered(&self, order: &OrderBy) -> Result<Vec<T>>;

    /// One page of all entities, optionally ordered.
    fn get_page(&self, order: Option<&OrderBy>, limit: usize, offset: usize) -> Result<Vec<T>> {
        let mut query = Query::page(limit, offset);
        query.set_order_by(order.cloned());
        self.find(&query)
    }

    /// Entities satisfying the query, filtered, then ordered, then paged.
    fn find(&self, query: &Query) -> Result<Vec<T>>;

    /// The first entity whose attribute equals the value.
    fn find_one_by_attribute(&self, attribute: &str, value: Operand) -> Result<Option<T>> {
        let query = Query::filtered(Filter::new().add(attribute, Operator::Eq, value)).limit(1);
        Ok(self.find(&query)?.into_iter().next())
    }
}

/// Read-write access to a collection of entities.
pub trait Repository<T: Identifiable>: Finder<T> {
    /// Inserts or replaces an entity, assigning a key first if it has none.
    /// Returns the entity's key.
    fn save(&self, entity: &mut T) -> Result<T::Key>;

    fn save_all(&self, entities: &mut [T]) -> Result<Vec<T::Key>> {
        entities.iter_mut().map(|e| self.save(e)).collect()
    }

    /// Removes the entity with this entity's key, returning what was stored.
    fn remove(&self, entity: &T) -> Result<Option<T>>;

    /// Removes every given entity. Returns how many were present.
    fn remove_all(&self, entities: &[T]) -> Result<usize> {
        let mut removed = 0;
        for entity in entities {
            if self.remove(entity)?.is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
