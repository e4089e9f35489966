//! Attribute resolution with join tracking.

use std::cell::RefCell;

use super::schema::{ColumnType, EntityDef, Schema};
use super::SqlError;
use crate::criteria::CriteriaRoot;

/// A column qualified by its table alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

/// What a resolved attribute path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    Column { column: ColumnRef, ty: ColumnType },
    /// A relation declared on `owner` under `attribute`.
    Relation { owner: String, attribute: String },
}

/// A resolved attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlField {
    pub path: String,
    pub alias: String,
    pub target: FieldTarget,
}

impl SqlField {
    /// The column and its type, or [`SqlError::NotAColumn`] for a relation.
    pub fn column(&self) -> Result<(&ColumnRef, ColumnType), SqlError> {
        match &self.target {
            FieldTarget::Column { column, ty } => Ok((column, *ty)),
            FieldTarget::Relation { .. } => Err(SqlError::NotAColumn(self.path.clone())),
        }
    }
}

/// A `LEFT JOIN` registered while resolving a relation segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Attribute path of the relation, e.g. `contact` or `contact.address`.
    pub path: String,
    pub alias: String,
    pub table: String,
    pub parent_alias: String,
    pub local_column: String,
    pub target_column: String,
}

/// Alias of the root table.
pub const ROOT_ALIAS: &str = "t0";

/// Resolves attribute paths against one root entity.
///
/// Joins are recorded as relation segments are crossed, each under a
/// stable alias (`t1`, `t2`, ... in first-use order). Crossing the same
/// relation path twice reuses its join.
#[derive(Debug)]
pub struct SqlRoot<'s> {
    schema: &'s Schema,
    entity: &'s EntityDef,
    joins: RefCell<Vec<Join>>,
}

impl<'s> SqlRoot<'s> {
    pub fn new(schema: &'s Schema, entity: &str) -> Result<Self, SqlError> {
        Ok(SqlRoot {
            schema,
            entity: schema.get(entity)?,
            joins: RefCell::new(Vec::new()),
        })
    }

    pub fn entity(&self) -> &EntityDef {
        self.entity
    }

    /// The joins registered so far, in registration order.
    pub fn joins(&self) -> Vec<Join> {
        self.joins.borrow().clone()
    }

    fn resolve_on(
        &self,
        entity: &EntityDef,
        alias: &str,
        path: String,
        attribute: &str,
    ) -> Result<SqlField, SqlError> {
        if let Some(col) = entity.columns.get(attribute) {
            return Ok(SqlField {
                path,
                alias: alias.to_string(),
                target: FieldTarget::Column {
                    column: ColumnRef {
                        alias: alias.to_string(),
                        column: col.name.clone(),
                    },
                    ty: col.ty,
                },
            });
        }
        if entity.relations.contains_key(attribute) {
            return Ok(SqlField {
                path,
                alias: alias.to_string(),
                target: FieldTarget::Relation {
                    owner: entity.name.clone(),
                    attribute: attribute.to_string(),
                },
            });
        }
        Err(SqlError::UnknownAttribute {
            entity: entity.name.clone(),
            attribute: attribute.to_string(),
        })
    }

    /// Returns the alias for the relation at `field`, registering the join
    /// on first use.
    fn join_alias(
        &self,
        field: &SqlField,
        owner: &str,
        attribute: &str,
    ) -> Result<(String, &'s EntityDef), SqlError> {
        let relation = self
            .schema
            .get(owner)?
            .relations
            .get(attribute)
            .ok_or_else(|| SqlError::NotARelation(field.path.clone()))?;
        let target = self.schema.get(&relation.target)?;

        let mut joins = self.joins.borrow_mut();
        if let Some(existing) = joins.iter().find(|j| j.path == field.path) {
            return Ok((existing.alias.clone(), target));
        }
        let alias = format!("t{}", joins.len() + 1);
        joins.push(Join {
            path: field.path.clone(),
            alias: alias.clone(),
            table: target.table.clone(),
            parent_alias: field.alias.clone(),
            local_column: relation.local_column.clone(),
            target_column: relation.target_column.clone(),
        });
        Ok((alias, target))
    }
}

impl CriteriaRoot for SqlRoot<'_> {
    type Field = SqlField;
    type Error = SqlError;

    fn get(&self, attribute: &str) -> Result<SqlField, SqlError> {
        self.resolve_on(self.entity, ROOT_ALIAS, attribute.to_string(), attribute)
    }

    fn join(&self, parent: &SqlField, attribute: &str) -> Result<SqlField, SqlError> {
        let (owner, relation) = match &parent.target {
            FieldTarget::Relation {
                owner,
                attribute: relation,
            } => (owner, relation),
            FieldTarget::Column { .. } => return Err(SqlError::NotARelation(parent.path.clone())),
        };
        let (alias, target) = self.join_alias(parent, owner, relation)?;
        let path = format!("{}.{attribute}", parent.path);
        self.resolve_on(target, &alias, path, attribute)
    }
}
