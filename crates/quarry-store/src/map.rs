//! Thread-safe in-memory repository.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use quarry::{EngineConfig, Filter, InMemoryQueryEngine, OrderBy, Query, Queryable};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::repository::{Finder, Identifiable, Repository};

/// Produces keys for entities saved without one.
pub trait KeyGenerator<K> {
    fn next_key(&self) -> K;

    /// Called with every key stored, generated or not, so later keys can
    /// avoid it.
    fn observe(&self, _key: &K) {}
}

/// Sequential `u64` keys: 1, 2, 3, ...
///
/// Observed keys move the counter forward, so explicitly keyed entities
/// never collide with generated keys.
#[derive(Debug, Default)]
pub struct SequentialKeys {
    last: AtomicU64,
}

impl SequentialKeys {
    pub fn new() -> Self {
        SequentialKeys::default()
    }

    /// A generator whose first key is `last + 1`.
    pub fn starting_after(last: u64) -> Self {
        SequentialKeys {
            last: AtomicU64::new(last),
        }
    }
}

impl KeyGenerator<u64> for SequentialKeys {
    fn next_key(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn observe(&self, key: &u64) {
        self.last.fetch_max(*key, Ordering::SeqCst);
    }
}

/// A repository holding entities in a map, in key order.
///
/// Reads evaluate queries with an [`InMemoryQueryEngine`] while holding the
/// read lock, so every query sees one consistent snapshot. Results are
/// clones of the stored entities.
///
/// # Example
///
/// ```
/// use quarry::{Number, Queryable, Value};
/// use quarry_store::{Finder, Identifiable, MapRepository, Repository};
///
/// #[derive(Clone)]
/// struct Note {
///     id: Option<u64>,
///     text: String,
/// }
///
/// impl Identifiable for Note {
///     type Key = u64;
///     fn id(&self) -> Option<u64> {
///         self.id
///     }
///     fn set_id(&mut self, id: u64) {
///         self.id = Some(id);
///     }
/// }
///
/// impl Queryable for Note {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "id" => Some(self.id.map_or(Value::Null, |id| Value::Number(Number::U64(id)))),
///             "text" => Some(Value::String(&self.text)),
///             _ => None,
///         }
///     }
/// }
///
/// let repo = MapRepository::new();
/// let mut note = Note { id: None, text: "hello".into() };
/// assert_eq!(repo.save(&mut note).unwrap(), 1);
/// assert_eq!(note.id, Some(1));
/// assert_eq!(repo.count(), 1);
/// ```
#[derive(Debug)]
pub struct MapRepository<T: Identifiable, G = SequentialKeys> {
    registry: RwLock<BTreeMap<T::Key, T>>,
    keys: G,
    engine: InMemoryQueryEngine,
}

impl<T: Identifiable<Key = u64>> MapRepository<T> {
    /// An empty repository with sequential keys.
    pub fn new() -> Self {
        MapRepository::with_generator(SequentialKeys::new())
    }

    /// A repository seeded with existing entries. Generated keys continue
    /// after the highest existing key.
    pub fn with_entries(entries: impl IntoIterator<Item = (u64, T)>) -> Self {
        let registry: BTreeMap<u64, T> = entries.into_iter().collect();
        let last = registry.keys().next_back().copied().unwrap_or(0);
        MapRepository {
            registry: RwLock::new(registry),
            keys: SequentialKeys::starting_after(last),
            engine: InMemoryQueryEngine::new(),
        }
    }
}

impl<T: Identifiable<Key = u64>> Default for MapRepository<T> {
    fn default() -> Self {
        MapRepository::new()
    }
}

impl<T: Identifiable, G: KeyGenerator<T::Key>> MapRepository<T, G> {
    /// An empty repository with a custom key generator.
    pub fn with_generator(keys: G) -> Self {
        MapRepository {
            registry: RwLock::new(BTreeMap::new()),
            keys,
            engine: InMemoryQueryEngine::new(),
        }
    }

    /// Replaces the configuration of the query engine.
    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine = InMemoryQueryEngine::with_config(config);
        self
    }

    pub fn engine(&self) -> &InMemoryQueryEngine {
        &self.engine
    }
}

impl<T, G> Finder<T> for MapRepository<T, G>
where
    T: Identifiable + Queryable + Clone,
    G: KeyGenerator<T::Key>,
{
    fn count(&self) -> usize {
        self.registry.read().len()
    }

    fn count_matching(&self, filter: &Filter) -> Result<usize> {
        let registry = self.registry.read();
        Ok(self.engine.count(registry.values(), filter)?)
    }

    fn get(&self, id: &T::Key) -> Option<T> {
        self.registry.read().get(id).cloned()
    }

    fn get_all(&self) -> Vec<T> {
        self.registry.read().values().cloned().collect()
    }

    fn get_all_ordered(&self, order: &OrderBy) -> Result<Vec<T>> {
        let registry = self.registry.read();
        let sorted = self.engine.sort(registry.values().collect(), order)?;
        Ok(sorted.into_iter().cloned().collect())
    }

    fn find(&self, query: &Query) -> Result<Vec<T>> {
        let registry = self.registry.read();
        let found = self.engine.query(registry.values(), query)?;
        Ok(found.into_iter().cloned().collect())
    }
}

impl<T, G> Repository<T> for MapRepository<T, G>
where
    T: Identifiable + Queryable + Clone,
    G: KeyGenerator<T::Key>,
{
    fn save(&self, entity: &mut T) -> Result<T::Key> {
        let key = match entity.id() {
            Some(key) => key,
            None => {
                let key = self.keys.next_key();
                entity.set_id(key.clone());
                key
            }
        };
        self.keys.observe(&key);

        let replaced = self
            .registry
            .write()
            .insert(key.clone(), entity.clone())
            .is_some();
        debug!(key = ?key, replaced, "saved entity");
        Ok(key)
    }

    fn remove(&self, entity: &T) -> Result<Option<T>> {
        let key = entity.id().ok_or(StoreError::MissingKey)?;
        let removed = self.registry.write().remove(&key);
        debug!(key = ?key, found = removed.is_some(), "removed entity");
        Ok(removed)
    }
}
