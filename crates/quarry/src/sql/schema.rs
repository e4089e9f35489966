//! Table definitions the SQL backend resolves attribute paths against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::SqlError;
use crate::value::Operand;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Real => "real",
            ColumnType::Boolean => "boolean",
            ColumnType::Timestamp => "timestamp",
        }
    }

    /// Whether an operand of this kind can be compared against the column.
    /// `Null` is accepted by every column.
    pub fn accepts(self, operand: &Operand) -> bool {
        matches!(
            (self, operand),
            (_, Operand::Null)
                | (ColumnType::Text, Operand::String(_))
                | (ColumnType::Integer | ColumnType::Real, Operand::Number(_))
                | (ColumnType::Boolean, Operand::Bool(_))
                | (ColumnType::Timestamp, Operand::Timestamp(_))
        )
    }
}

/// A mapped column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ColumnType,
}

/// A to-one relation: `local_column` on this table references
/// `target_column` on the target entity's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub target: String,
    pub local_column: String,
    pub target_column: String,
}

/// One entity: its table, its columns and its relations, keyed by attribute
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub columns: BTreeMap<String, Column>,
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        EntityDef {
            name: name.into(),
            table: table.into(),
            columns: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Maps an attribute to a column of the same name.
    pub fn column(self, attribute: &str, ty: ColumnType) -> Self {
        self.column_as(attribute, attribute, ty)
    }

    /// Maps an attribute to a differently named column.
    pub fn column_as(mut self, attribute: &str, column: &str, ty: ColumnType) -> Self {
        self.columns.insert(
            attribute.to_string(),
            Column {
                name: column.to_string(),
                ty,
            },
        );
        self
    }

    /// Declares a to-one relation.
    pub fn relation(
        mut self,
        attribute: &str,
        target: &str,
        local_column: &str,
        target_column: &str,
    ) -> Self {
        self.relations.insert(
            attribute.to_string(),
            Relation {
                target: target.to_string(),
                local_column: local_column.to_string(),
                target_column: target_column.to_string(),
            },
        );
        self
    }
}

/// The set of entities known to the backend.
///
/// # Example
///
/// ```
/// use quarry::sql::{ColumnType, EntityDef, Schema};
///
/// let schema = Schema::new()
///     .entity(
///         EntityDef::new("person", "people")
///             .column("id", ColumnType::Integer)
///             .column("name", ColumnType::Text)
///             .relation("contact", "contact", "contact_id", "id"),
///     )
///     .entity(
///         EntityDef::new("contact", "contacts")
///             .column("id", ColumnType::Integer)
///             .column("email", ColumnType::Text),
///     );
/// assert!(schema.get("person").is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    entities: BTreeMap<String, EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Adds an entity, replacing any previous one of the same name.
    pub fn entity(mut self, def: EntityDef) -> Self {
        self.entities.insert(def.name.clone(), def);
        self
    }

    pub fn get(&self, name: &str) -> Result<&EntityDef, SqlError> {
        self.entities
            .get(name)
            .ok_or_else(|| SqlError::UnknownEntity(name.to_string()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }
}
