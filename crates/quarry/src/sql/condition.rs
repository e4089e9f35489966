//! SQL condition trees and the builder that produces them.

use crate::criteria::CriteriaBuilder;
use crate::operator::Operator;
use crate::ordering::SortOrder;
use crate::value::Operand;

use super::root::{ColumnRef, SqlField};
use super::schema::ColumnType;
use super::SqlError;

/// A WHERE-clause expression. Operands are kept aside and bound as
/// parameters when rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlCondition {
    True,
    False,
    Compare {
        column: ColumnRef,
        op: Operator,
        value: Operand,
    },
    IsNull(ColumnRef),
    Like {
        column: ColumnRef,
        pattern: String,
    },
    Between {
        column: ColumnRef,
        start: Operand,
        end: Operand,
    },
    In {
        column: ColumnRef,
        items: Vec<Operand>,
    },
    Not(Box<SqlCondition>),
    And(Vec<SqlCondition>),
    Or(Vec<SqlCondition>),
}

impl SqlCondition {
    /// The column a single-column test reads, if this is one.
    fn tested_column(&self) -> Option<&ColumnRef> {
        match self {
            SqlCondition::Compare { column, .. }
            | SqlCondition::Like { column, .. }
            | SqlCondition::Between { column, .. }
            | SqlCondition::In { column, .. } => Some(column),
            _ => None,
        }
    }
}

/// Two-valued negation. A column test is `UNKNOWN` over `NULL` and so is
/// its plain `NOT`; widen it with `OR column IS NULL`. Connectives are
/// pushed down with De Morgan.
fn negate(condition: SqlCondition) -> SqlCondition {
    match condition {
        SqlCondition::True => SqlCondition::False,
        SqlCondition::False => SqlCondition::True,
        SqlCondition::Not(inner) => *inner,
        SqlCondition::IsNull(column) => {
            SqlCondition::Not(Box::new(SqlCondition::IsNull(column)))
        }
        SqlCondition::And(parts) => SqlCondition::Or(parts.into_iter().map(negate).collect()),
        SqlCondition::Or(parts) => SqlCondition::And(parts.into_iter().map(negate).collect()),
        test => match test.tested_column().cloned() {
            Some(column) => SqlCondition::Or(vec![
                SqlCondition::Not(Box::new(test)),
                SqlCondition::IsNull(column),
            ]),
            None => SqlCondition::Not(Box::new(test)),
        },
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOrder {
    pub column: ColumnRef,
    pub direction: SortOrder,
}

/// [`CriteriaBuilder`] producing [`SqlCondition`]s.
///
/// Operand kinds are checked against column types here. A comparison
/// against `NULL` follows the in-memory semantics: `=` becomes `IS NULL`,
/// ordered comparisons never match. Negation keeps rows whose column is
/// `NULL`, since the positive test never matched them.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlCriteria;

impl SqlCriteria {
    fn typed<'f>(
        &self,
        field: &'f SqlField,
        value: &Operand,
    ) -> Result<(&'f ColumnRef, ColumnType), SqlError> {
        let (column, ty) = field.column()?;
        if !ty.accepts(value) {
            return Err(SqlError::TypeMismatch {
                path: field.path.clone(),
                expected: ty.as_str(),
                actual: value.type_name(),
            });
        }
        Ok((column, ty))
    }

    fn compare(&self, field: &SqlField, op: Operator, value: &Operand) -> Result<SqlCondition, SqlError> {
        let (column, _) = self.typed(field, value)?;
        Ok(match value {
            Operand::Null if op == Operator::Eq => SqlCondition::IsNull(column.clone()),
            Operand::Null => SqlCondition::False,
            _ => SqlCondition::Compare {
                column: column.clone(),
                op,
                value: value.clone(),
            },
        })
    }
}

impl CriteriaBuilder for SqlCriteria {
    type Field = SqlField;
    type Condition = SqlCondition;
    type Order = SqlOrder;
    type Error = SqlError;

    fn equal(&self, field: &SqlField, value: &Operand) -> Result<SqlCondition, SqlError> {
        self.compare(field, Operator::Eq, value)
    }

    fn greater_than(&self, field: &SqlField, value: &Operand) -> Result<SqlCondition, SqlError> {
        self.compare(field, Operator::Gt, value)
    }

    fn greater_than_or_equal(
        &self,
        field: &SqlField,
        value: &Operand,
    ) -> Result<SqlCondition, SqlError> {
        self.compare(field, Operator::Gte, value)
    }

    fn less_than(&self, field: &SqlField, value: &Operand) -> Result<SqlCondition, SqlError> {
        self.compare(field, Operator::Lt, value)
    }

    fn less_than_or_equal(
        &self,
        field: &SqlField,
        value: &Operand,
    ) -> Result<SqlCondition, SqlError> {
        self.compare(field, Operator::Lte, value)
    }

    fn like(&self, field: &SqlField, pattern: &str) -> Result<SqlCondition, SqlError> {
        let (column, ty) = field.column()?;
        if ty != ColumnType::Text {
            return Err(SqlError::TypeMismatch {
                path: field.path.clone(),
                expected: "text",
                actual: ty.as_str(),
            });
        }
        Ok(SqlCondition::Like {
            column: column.clone(),
            pattern: pattern.to_string(),
        })
    }

    fn between(
        &self,
        field: &SqlField,
        start: &Operand,
        end: &Operand,
    ) -> Result<SqlCondition, SqlError> {
        let (column, _) = self.typed(field, start)?;
        self.typed(field, end)?;
        if start == &Operand::Null || end == &Operand::Null {
            return Ok(SqlCondition::False);
        }
        Ok(SqlCondition::Between {
            column: column.clone(),
            start: start.clone(),
            end: end.clone(),
        })
    }

    fn is_in(&self, field: &SqlField, items: &[Operand]) -> Result<SqlCondition, SqlError> {
        let (column, _) = field.column()?;
        for item in items {
            self.typed(field, item)?;
        }
        let mut any = Vec::new();
        let mut values = Vec::new();
        for item in items {
            match item {
                Operand::Null => any.push(SqlCondition::IsNull(column.clone())),
                other => values.push(other.clone()),
            }
        }
        if !values.is_empty() {
            any.insert(
                0,
                SqlCondition::In {
                    column: column.clone(),
                    items: values,
                },
            );
        }
        Ok(match any.len() {
            0 => SqlCondition::False,
            1 => any.remove(0),
            _ => SqlCondition::Or(any),
        })
    }

    fn not(&self, condition: SqlCondition) -> Result<SqlCondition, SqlError> {
        Ok(negate(condition))
    }

    fn and(&self, conditions: Vec<SqlCondition>) -> Result<SqlCondition, SqlError> {
        Ok(match conditions.len() {
            0 => SqlCondition::True,
            1 => conditions.into_iter().next().unwrap_or(SqlCondition::True),
            _ => SqlCondition::And(conditions),
        })
    }

    fn or(&self, conditions: Vec<SqlCondition>) -> Result<SqlCondition, SqlError> {
        Ok(match conditions.len() {
            0 => SqlCondition::False,
            1 => conditions.into_iter().next().unwrap_or(SqlCondition::False),
            _ => SqlCondition::Or(conditions),
        })
    }

    fn asc(&self, field: SqlField) -> Result<SqlOrder, SqlError> {
        Ok(SqlOrder {
            column: field.column()?.0.clone(),
            direction: SortOrder::Asc,
        })
    }

    fn desc(&self, field: SqlField) -> Result<SqlOrder, SqlError> {
        Ok(SqlOrder {
            column: field.column()?.0.clone(),
            direction: SortOrder::Desc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::root::FieldTarget;

    fn field(ty: ColumnType) -> SqlField {
        SqlField {
            path: "f".into(),
            alias: "t0".into(),
            target: FieldTarget::Column {
                column: ColumnRef {
                    alias: "t0".into(),
                    column: "f".into(),
                },
                ty,
            },
        }
    }

    #[test]
    fn ordered_comparison_checks_kind() {
        let err = SqlCriteria
            .greater_than(&field(ColumnType::Text), &Operand::from(3))
            .unwrap_err();
        assert!(matches!(
            err,
            SqlError::TypeMismatch { expected: "text", actual: "number", .. }
        ));
        assert!(SqlCriteria
            .greater_than(&field(ColumnType::Integer), &Operand::from(3))
            .is_ok());
    }

    #[test]
    fn like_requires_text() {
        assert!(SqlCriteria.like(&field(ColumnType::Integer), "1%").is_err());
        assert!(SqlCriteria.like(&field(ColumnType::Text), "1%").is_ok());
    }

    #[test]
    fn null_operands() {
        let f = field(ColumnType::Text);
        assert!(matches!(
            SqlCriteria.equal(&f, &Operand::Null).unwrap(),
            SqlCondition::IsNull(_)
        ));
        assert_eq!(SqlCriteria.less_than(&f, &Operand::Null).unwrap(), SqlCondition::False);
    }

    #[test]
    fn in_splits_nulls() {
        let f = field(ColumnType::Integer);
        let cond = SqlCriteria
            .is_in(&f, &[Operand::from(1), Operand::Null])
            .unwrap();
        assert!(matches!(cond, SqlCondition::Or(ref parts) if parts.len() == 2));
        assert_eq!(SqlCriteria.is_in(&f, &[]).unwrap(), SqlCondition::False);
    }

    #[test]
    fn logical_identities() {
        assert_eq!(SqlCriteria.and(vec![]).unwrap(), SqlCondition::True);
        assert_eq!(SqlCriteria.or(vec![]).unwrap(), SqlCondition::False);
        assert_eq!(SqlCriteria.not(SqlCondition::True).unwrap(), SqlCondition::False);
        assert_eq!(SqlCriteria.not(SqlCondition::False).unwrap(), SqlCondition::True);
        assert_eq!(
            SqlCriteria.and(vec![SqlCondition::False]).unwrap(),
            SqlCondition::False
        );
    }

    #[test]
    fn negated_test_keeps_null_rows() {
        let f = field(ColumnType::Text);
        let column = ColumnRef {
            alias: "t0".into(),
            column: "f".into(),
        };
        let like = SqlCriteria.like(&f, "a%").unwrap();
        assert_eq!(
            SqlCriteria.not(like.clone()).unwrap(),
            SqlCondition::Or(vec![
                SqlCondition::Not(Box::new(like)),
                SqlCondition::IsNull(column.clone()),
            ])
        );
        let is_null = SqlCriteria.equal(&f, &Operand::Null).unwrap();
        assert_eq!(
            SqlCriteria.not(is_null).unwrap(),
            SqlCondition::Not(Box::new(SqlCondition::IsNull(column)))
        );
    }

    #[test]
    fn negated_in_with_null_excludes_null_rows() {
        let f = field(ColumnType::Text);
        let items = [Operand::from("a"), Operand::Null];
        let any = SqlCriteria.is_in(&f, &items).unwrap();
        let SqlCondition::And(parts) = SqlCriteria.not(any).unwrap() else {
            panic!("expected a conjunction");
        };
        assert_eq!(parts.len(), 2);
        assert!(matches!(
            &parts[1],
            SqlCondition::Not(inner) if matches!(**inner, SqlCondition::IsNull(_))
        ));
    }
}
