//! Runtime value types for field comparison.
//!
//! [`Value`] is the value of an entity field at execution time, borrowed from
//! the entity. [`Operand`] is the owned value a predicate compares against.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Queryable;
use crate::error::{QueryError, Result};
use crate::range::Range;

/// Runtime value of an entity field, borrowed from the entity.
///
/// # Example
///
/// ```
/// use quarry::{Number, Queryable, Value};
///
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Queryable for Person {
///     fn field(&self, name: &str) -> Option<Value<'_>> {
///         match name {
///             "name" => Some(Value::String(&self.name)),
///             "age" => Some(Value::Number(Number::from(self.age))),
///             _ => None,
///         }
///     }
/// }
/// ```
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// String value (borrowed).
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// Absent value or absent relation.
    Null,
    /// A related entity, traversed by dotted attribute paths.
    Entity(&'a dyn Queryable),
}

impl<'a> Value<'a> {
    /// Wraps a related entity.
    pub fn entity<E: Queryable>(entity: &'a E) -> Self {
        Value::Entity(entity)
    }

    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the value kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Entity(_) => "entity",
        }
    }

    /// Compares this field value against an operand.
    ///
    /// Returns `Ok(None)` when the values are of the same kind but not
    /// comparable (a `Null` on either side, or NaN). A kind mismatch is a
    /// [`QueryError::TypeMismatch`].
    pub fn compare_operand(&self, operand: &Operand) -> Result<Option<Ordering>> {
        match (self, operand) {
            (Value::String(a), Operand::String(b)) => Ok(Some((*a).cmp(b.as_str()))),
            (Value::Number(a), Operand::Number(b)) => Ok(a.compare(*b)),
            (Value::Timestamp(a), Operand::Timestamp(b)) => Ok(Some(a.cmp(b))),
            (Value::Bool(a), Operand::Bool(b)) => Ok(Some(a.cmp(b))),
            (Value::Null, _) | (_, Operand::Null) => Ok(None),
            _ => Err(QueryError::TypeMismatch {
                expected: self.type_name(),
                actual: operand.type_name(),
            }),
        }
    }

    /// Equality against an operand. `Null` equals `Null` and nothing else.
    pub fn equals_operand(&self, operand: &Operand) -> Result<bool> {
        match (self, operand) {
            (Value::Null, Operand::Null) => Ok(true),
            (Value::Null, _) | (_, Operand::Null) => Ok(false),
            _ => Ok(self.compare_operand(operand)? == Some(Ordering::Equal)),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Timestamp(t) => f.debug_tuple("Timestamp").field(t).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Null => f.write_str("Null"),
            Value::Entity(_) => f.write_str("Entity(..)"),
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Entity(a), Value::Entity(b)) => std::ptr::addr_eq(*a, *b),
            _ => false,
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Comparisons between different variants are exact: an integer and a float
/// compare by mathematical value, never through a lossy `f64` cast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64. Lossy above 2^53.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            (Number::I64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => compare_int_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => compare_int_float(i128::from(b), a).map(Ordering::reverse),
            (Number::F64(a), Number::U64(b)) => compare_int_float(i128::from(b), a).map(Ordering::reverse),
        }
    }
}

/// Exact comparison of an integer against a float. NaN is incomparable.
fn compare_int_float(int: i128, float: f64) -> Option<Ordering> {
    // 2^64 bounds every i64 and u64
    const BOUND: f64 = 18_446_744_073_709_551_616.0;
    if float.is_nan() {
        return None;
    }
    if float >= BOUND {
        return Some(Ordering::Less);
    }
    if float < -BOUND {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    // Exact: |whole| < 2^64 and whole is integral
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $target)
                }
            }
        )*
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch, saturating at
    /// the bounds of `i64` milliseconds.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }
}

/// Helper trait for converting types to timestamps.
///
/// Used by `#[derive(Queryable)]` for fields marked `#[query(Timestamp)]`.
pub trait QueryTimestamp {
    /// Converts this value to a [`Timestamp`].
    fn query_timestamp(&self) -> Timestamp;
}

impl QueryTimestamp for Timestamp {
    fn query_timestamp(&self) -> Timestamp {
        *self
    }
}

impl QueryTimestamp for i64 {
    fn query_timestamp(&self) -> Timestamp {
        Timestamp::from_millis(*self)
    }
}

impl QueryTimestamp for std::time::SystemTime {
    fn query_timestamp(&self) -> Timestamp {
        match self.duration_since(std::time::UNIX_EPOCH) {
            Ok(d) => Timestamp(i64::try_from(d.as_millis()).unwrap_or(i64::MAX)),
            Err(e) => Timestamp(-i64::try_from(e.duration().as_millis()).unwrap_or(i64::MAX)),
        }
    }
}

/// Owned value stored in a predicate.
///
/// Unlike [`Value`], which borrows from an entity, an `Operand` owns its data
/// so it can be stored in filters and serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Null literal.
    Null,
    /// String value.
    String(String),
    /// Numeric value.
    Number(Number),
    /// Timestamp value.
    Timestamp(Timestamp),
    /// Boolean value.
    Bool(bool),
    /// List of values, for [`Operator::In`](crate::Operator::In).
    List(Vec<Operand>),
    /// Interval, for [`Operator::Between`](crate::Operator::Between).
    Range(Box<Range<Operand>>),
}

impl Operand {
    /// Name of the operand kind, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Operand::Null => "null",
            Operand::String(_) => "string",
            Operand::Number(_) => "number",
            Operand::Timestamp(_) => "timestamp",
            Operand::Bool(_) => "bool",
            Operand::List(_) => "list",
            Operand::Range(_) => "range",
        }
    }

    /// Returns the range, if this operand is one.
    pub fn as_range(&self) -> Option<&Range<Operand>> {
        match self {
            Operand::Range(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the list items, if this operand is a list.
    pub fn as_list(&self) -> Option<&[Operand]> {
        match self {
            Operand::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialOrd for Operand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Operand::String(a), Operand::String(b)) => a.partial_cmp(b),
            (Operand::Number(a), Operand::Number(b)) => a.compare(*b),
            (Operand::Timestamp(a), Operand::Timestamp(b)) => a.partial_cmp(b),
            (Operand::Bool(a), Operand::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Null => f.write_str("null"),
            Operand::String(s) => f.write_str(s),
            Operand::Number(n) => write!(f, "{n}"),
            Operand::Timestamp(t) => write!(f, "{}", t.0),
            Operand::Bool(b) => write!(f, "{b}"),
            Operand::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Operand::Range(r) => write!(f, "{}..{}", r.start, r.end),
        }
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::String(s)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::String(s.to_string())
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Number(n)
    }
}

impl From<Timestamp> for Operand {
    fn from(t: Timestamp) -> Self {
        Operand::Timestamp(t)
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Bool(b)
    }
}

impl<T: Into<Operand>> From<Range<T>> for Operand {
    fn from(r: Range<T>) -> Self {
        Operand::Range(Box::new(Range::new(r.start.into(), r.end.into())))
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(items: Vec<T>) -> Self {
        Operand::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        value.map_or(Operand::Null, Into::into)
    }
}

macro_rules! operand_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(n: $t) -> Self {
                    Operand::Number(Number::from(n))
                }
            }
        )*
    };
}

operand_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_comparisons_same_type() {
        assert_eq!(Number::I64(5).compare(Number::I64(10)), Some(Ordering::Less));
        assert_eq!(Number::U64(10).compare(Number::U64(5)), Some(Ordering::Greater));
        assert_eq!(Number::F64(5.0).compare(Number::F64(5.0)), Some(Ordering::Equal));
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(Number::I64(5).compare(Number::U64(10)), Some(Ordering::Less));
        assert_eq!(Number::I64(-1).compare(Number::U64(0)), Some(Ordering::Less));
        assert_eq!(Number::U64(3).compare(Number::I64(2)), Some(Ordering::Greater));
        assert_eq!(Number::I64(5).compare(Number::F64(5.0)), Some(Ordering::Equal));
        assert_eq!(Number::U64(10).compare(Number::F64(5.5)), Some(Ordering::Greater));
    }

    #[test]
    fn number_nan_is_incomparable() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(Number::I64(1).compare(Number::F64(f64::NAN)), None);
    }

    #[test]
    fn compare_operand_kinds() {
        let v = Value::Number(Number::I64(3));
        assert_eq!(v.compare_operand(&Operand::from(2)).unwrap(), Some(Ordering::Greater));
        assert_eq!(v.compare_operand(&Operand::Null).unwrap(), None);
        assert_eq!(Value::Null.compare_operand(&Operand::from(2)).unwrap(), None);

        let err = v.compare_operand(&Operand::from("3")).unwrap_err();
        assert!(matches!(
            err,
            QueryError::TypeMismatch {
                expected: "number",
                actual: "string"
            }
        ));
    }

    #[test]
    fn equals_operand_null_rules() {
        assert!(Value::Null.equals_operand(&Operand::Null).unwrap());
        assert!(!Value::Null.equals_operand(&Operand::from(1)).unwrap());
        assert!(!Value::Bool(true).equals_operand(&Operand::Null).unwrap());
        assert!(Value::String("a").equals_operand(&Operand::from("a")).unwrap());
    }

    #[test]
    fn integer_float_comparison_is_exact_beyond_f64_precision() {
        const P53: i64 = 1 << 53;
        let float = Number::F64(P53 as f64);
        assert_eq!(Number::I64(P53 + 1).compare(float), Some(Ordering::Greater));
        assert_eq!(Number::I64(P53).compare(float), Some(Ordering::Equal));
        assert_eq!(float.compare(Number::I64(P53 + 1)), Some(Ordering::Less));
        assert_eq!(Number::U64(u64::MAX).compare(Number::F64(u64::MAX as f64)), Some(Ordering::Less));
        assert_eq!(Number::I64(i64::MIN).compare(Number::F64(i64::MIN as f64)), Some(Ordering::Equal));
    }

    #[test]
    fn integer_float_comparison_uses_fraction_and_infinities() {
        assert_eq!(Number::I64(2).compare(Number::F64(2.5)), Some(Ordering::Less));
        assert_eq!(Number::I64(-2).compare(Number::F64(-2.5)), Some(Ordering::Greater));
        assert_eq!(Number::I64(-3).compare(Number::F64(-2.5)), Some(Ordering::Less));
        assert_eq!(Number::U64(u64::MAX).compare(Number::F64(f64::INFINITY)), Some(Ordering::Less));
        assert_eq!(Number::I64(i64::MIN).compare(Number::F64(f64::NEG_INFINITY)), Some(Ordering::Greater));
    }

    #[test]
    fn operand_display_is_string_form() {
        assert_eq!(Operand::from("admin@%").to_string(), "admin@%");
        assert_eq!(Operand::from(42).to_string(), "42");
        assert_eq!(Operand::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Operand::from(Range::new(1, 3)).to_string(), "1..3");
    }

    #[test]
    fn operand_conversions() {
        assert_eq!(Operand::from(7u8), Operand::Number(Number::U64(7)));
        assert_eq!(Operand::from(None::<i32>), Operand::Null);
        assert_eq!(
            Operand::from(Range::new(5i64, 7i64)).as_range(),
            Some(&Range::new(Operand::from(5i64), Operand::from(7i64)))
        );
        assert_eq!(Operand::from(vec!["a"]).as_list().map(<[Operand]>::len), Some(1));
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
        assert_eq!(Timestamp::from_secs(i64::MAX), Timestamp(i64::MAX));
        assert_eq!(Timestamp::from_secs(i64::MIN), Timestamp(i64::MIN));
        assert_eq!(1500i64.query_timestamp(), Timestamp(1500));
        assert_eq!(std::time::UNIX_EPOCH.query_timestamp(), Timestamp(0));
    }
}
