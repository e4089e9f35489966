//! Implementation of the `#[derive(Queryable)]` macro.
//!
//! Generates the entity accessor and field name constants from
//! `#[query(...)]` field annotations.

mod attrs;
mod derive;

pub use derive::queryable_derive_impl;
