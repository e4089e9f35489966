//! Proc macros for Quarry.
//!
//! - [`Queryable`] - Generate the in-memory entity accessor from struct
//!   field annotations
//!
//! Re-exported by `quarry` behind its `macros` feature; generated code
//! refers to `::quarry`.

mod queryable;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `quarry::Queryable` for a struct with named fields.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | String field (`String`, `&str`, anything derefing to `str`) |
/// | `Number` | Numeric field, any primitive number type |
/// | `Timestamp` | Timestamp field, requires `QueryTimestamp` |
/// | `Bool` | Boolean field |
/// | `Entity` | Related entity implementing `Queryable`, traversed by dotted paths |
/// | `skip` | Exclude this field from queries |
/// | `rename = "..."` | Use a custom attribute name |
///
/// Fields without a `#[query(...)]` attribute are not exposed. A field of
/// type `Option<T>` exposes `Null` when it is `None`; for `Entity` fields
/// this makes the whole dotted path resolve to `Null`.
///
/// # Generated Code
///
/// 1. Attribute name constants (e.g. `Person::FIRST_NAME`)
/// 2. An implementation of `Queryable::field()`
///
/// # Example
///
/// ```ignore
/// use quarry::{Filter, InMemoryQueryEngine, Operator, Queryable};
///
/// #[derive(Queryable)]
/// struct Contact {
///     #[query(String)]
///     email: String,
/// }
///
/// #[derive(Queryable)]
/// struct Person {
///     #[query(Number)]
///     id: u64,
///     #[query(String, rename = "firstName")]
///     first_name: String,
///     #[query(Entity)]
///     contact: Option<Contact>,
/// }
///
/// let filter = Filter::new().add("contact.email", Operator::Like, "admin@%");
/// let admins = InMemoryQueryEngine::new().filter(&people, &filter)?;
/// ```
#[proc_macro_derive(Queryable, attributes(query))]
pub fn queryable_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    queryable::queryable_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
