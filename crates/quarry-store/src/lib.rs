//! Quarry Store - Repository traits and an in-memory repository.
//!
//! - [`Identifiable`]: entities with a key assigned on first save
//! - [`Finder`]: count, get, and query entities with [`quarry::Query`]
//! - [`Repository`]: save and remove on top of [`Finder`]
//! - [`MapRepository`]: a thread-safe, map-backed implementation that runs
//!   queries through [`quarry::InMemoryQueryEngine`]
//!
//! Paging follows the engine: an offset beyond the end yields an empty page.

mod error;
mod map;
mod repository;

pub use error::{Result, StoreError};
pub use map::{KeyGenerator, MapRepository, SequentialKeys};
pub use repository::{Finder, Identifiable, Repository};
