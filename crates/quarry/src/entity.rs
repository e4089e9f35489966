//! Entity accessor capability.
//!
//! The in-memory engine reads attribute values off entities through the
//! [`Queryable`] trait. It is typically derived with `#[derive(Queryable)]`
//! from the `quarry-macros` crate, but can also be implemented by hand.

use crate::error::{QueryError, Result};
use crate::predicate::split_path;
use crate::value::Value;

/// Trait for entities that can be queried in memory.
///
/// Implementors expose one attribute per call to [`field`](Self::field).
/// Related entities are exposed as [`Value::Entity`], which lets dotted
/// attribute paths such as `contact.email` traverse them.
///
/// # Manual Implementation
///
/// ```
/// use quarry::{Queryable, Value};
///
/// struct Contact {
///     email: String,
/// }
///
/// struct Person {
///     name: String,
///     contact: Option<Contact>,
/// }
///
/// impl Queryable for Contact {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "email" => Some(Value::String(&self.email)),
///             _ => None,
///         }
///     }
/// }
///
/// impl Queryable for Person {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "name" => Some(Value::String(&self.name)),
///             "contact" => Some(self.contact.as_ref().map_or(Value::Null, Value::entity)),
///             _ => None,
///         }
///     }
/// }
///
/// let jack = Person {
///     name: "Jack".into(),
///     contact: Some(Contact { email: "admin@example.com".into() }),
/// };
/// assert_eq!(jack.resolve("contact.email").unwrap(), Value::String("admin@example.com"));
/// ```
pub trait Queryable {
    /// Returns the value of a single, undotted attribute.
    ///
    /// Returns `None` if the attribute does not exist on this entity.
    fn field(&self, name: &str) -> Option<Value<'_>>;

    /// Resolves a possibly dotted attribute path.
    ///
    /// See [`resolve_path`] for the traversal rules.
    fn resolve(&self, path: &str) -> Result<Value<'_>>
    where
        Self: Sized,
    {
        resolve_path(self, path)
    }
}

/// Resolves a possibly dotted attribute path against an entity.
///
/// - Each segment but the last must name a related entity.
/// - A segment that does not exist is a [`QueryError::Resolution`].
/// - A scalar in the middle of the path is a [`QueryError::Resolution`].
/// - An absent relation (`Null`) in the middle of the path resolves the
///   whole path to `Null`.
pub fn resolve_path<'a>(entity: &'a dyn Queryable, path: &str) -> Result<Value<'a>> {
    let segments = split_path(path)?;
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Err(QueryError::invalid("attribute path must not be empty")),
    };

    let mut current = entity;
    for segment in parents {
        match current.field(segment) {
            Some(Value::Entity(next)) => current = next,
            Some(Value::Null) => return Ok(Value::Null),
            Some(_) | None => return Err(QueryError::unresolved(path, segment)),
        }
    }

    current
        .field(last)
        .ok_or_else(|| QueryError::unresolved(path, last))
}

impl<T: Queryable + ?Sized> Queryable for &T {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

impl<T: Queryable + ?Sized> Queryable for Box<T> {
    fn field(&self, name: &str) -> Option<Value<'_>> {
        (**self).field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    struct Address {
        city: String,
    }

    struct Contact {
        email: String,
        address: Option<Address>,
    }

    struct Person {
        id: u64,
        contact: Contact,
    }

    impl Queryable for Address {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "city" => Some(Value::String(&self.city)),
                _ => None,
            }
        }
    }

    impl Queryable for Contact {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "email" => Some(Value::String(&self.email)),
                "address" => Some(self.address.as_ref().map_or(Value::Null, Value::entity)),
                _ => None,
            }
        }
    }

    impl Queryable for Person {
        fn field(&self, name: &str) -> Option<Value<'_>> {
            match name {
                "id" => Some(Value::Number(Number::from(self.id))),
                "contact" => Some(Value::entity(&self.contact)),
                _ => None,
            }
        }
    }

    fn person(address: Option<&str>) -> Person {
        Person {
            id: 7,
            contact: Contact {
                email: "jack@example.com".to_string(),
                address: address.map(|city| Address {
                    city: city.to_string(),
                }),
            },
        }
    }

    #[test]
    fn resolves_simple_attribute() {
        let p = person(None);
        assert_eq!(p.resolve("id").unwrap(), Value::Number(Number::U64(7)));
    }

    #[test]
    fn resolves_dotted_paths() {
        let p = person(Some("Vienna"));
        assert_eq!(
            p.resolve("contact.email").unwrap(),
            Value::String("jack@example.com")
        );
        assert_eq!(
            p.resolve("contact.address.city").unwrap(),
            Value::String("Vienna")
        );
    }

    #[test]
    fn absent_relation_resolves_to_null() {
        let p = person(None);
        assert!(p.resolve("contact.address.city").unwrap().is_null());
    }

    #[test]
    fn unknown_segment_is_resolution_error() {
        let p = person(None);
        match p.resolve("contact.phone") {
            Err(QueryError::Resolution { path, segment }) => {
                assert_eq!(path, "contact.phone");
                assert_eq!(segment, "phone");
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
        assert!(p.resolve("nope.email").is_err());
    }

    #[test]
    fn scalar_in_the_middle_is_resolution_error() {
        let p = person(None);
        assert!(matches!(
            p.resolve("id.value"),
            Err(QueryError::Resolution { .. })
        ));
    }

    #[test]
    fn empty_path_is_invalid_argument() {
        let p = person(None);
        assert!(matches!(p.resolve(""), Err(QueryError::InvalidArgument(_))));
    }

    #[test]
    fn references_are_queryable() {
        let p = person(None);
        let r = &p;
        assert_eq!(r.resolve("id").unwrap(), Value::Number(Number::U64(7)));
    }
}
