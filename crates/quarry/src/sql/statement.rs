//! Composing translated conditions into SQL statements.

use tracing::debug;

use crate::criteria::CriteriaTranslator;
use crate::ordering::SortOrder;
use crate::predicate::Filter;
use crate::query::Query;
use crate::value::Operand;

use super::condition::{SqlCondition, SqlCriteria, SqlOrder};
use super::dialect::SqlDialect;
use super::root::{ColumnRef, Join, SqlRoot, ROOT_ALIAS};
use super::schema::Schema;
use super::SqlError;

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Operand>,
}

/// Renders [`Query`]s against a [`Schema`] as SQL statements.
///
/// # Example
///
/// ```
/// use quarry::sql::{ColumnType, EntityDef, Schema, SqlQuery};
/// use quarry::{Filter, Operator, OrderBy, Query};
///
/// let schema = Schema::new().entity(
///     EntityDef::new("person", "people")
///         .column("id", ColumnType::Integer)
///         .column("name", ColumnType::Text),
/// );
/// let query = Query::new()
///     .filter(Filter::new().add("id", Operator::Gt, 2))
///     .order_by(OrderBy::desc("id"))
///     .limit(2);
///
/// let stmt = SqlQuery::new(&schema).select("person", &query).unwrap();
/// assert_eq!(
///     stmt.sql,
///     "SELECT t0.* FROM people AS t0 WHERE t0.id > ? ORDER BY t0.id DESC LIMIT 2"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SqlQuery<'s> {
    schema: &'s Schema,
    dialect: SqlDialect,
}

impl<'s> SqlQuery<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        SqlQuery {
            schema,
            dialect: SqlDialect::default(),
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn dialect(&self) -> &SqlDialect {
        &self.dialect
    }

    /// Renders a `SELECT` of the root entity's columns.
    ///
    /// Filter paths are resolved before ordering paths, so join aliases
    /// follow that order.
    pub fn select(&self, entity: &str, query: &Query) -> Result<Statement, SqlError> {
        let root = SqlRoot::new(self.schema, entity)?;
        let translator = CriteriaTranslator::new(&root, &SqlCriteria);

        let condition = match query.get_filter() {
            Some(filter) => translator.translate_filter(filter)?,
            None => SqlCondition::True,
        };
        let orders = match query.get_order_by() {
            Some(order) => translator.translate_order_by(order)?,
            None => Vec::new(),
        };

        let mut w = Writer::new(&self.dialect);
        w.push(&format!("SELECT {}.* FROM ", self.dialect.ident(ROOT_ALIAS)));
        w.from(&root.entity().table, &root.joins());
        w.filter(&condition);

        if !orders.is_empty() {
            w.push(" ORDER BY ");
            for (i, order) in orders.iter().enumerate() {
                if i > 0 {
                    w.push(", ");
                }
                w.order(order);
            }
        }

        match (query.get_limit(), query.get_offset()) {
            (Some(limit), Some(offset)) => w.push(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => w.push(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => match self.dialect.unbounded_limit {
                Some(unbounded) => w.push(&format!(" LIMIT {unbounded} OFFSET {offset}")),
                None => w.push(&format!(" OFFSET {offset}")),
            },
            (None, None) => {}
        }

        let stmt = w.finish();
        debug!(
            entity,
            joins = root.joins().len(),
            params = stmt.params.len(),
            "rendered select"
        );
        Ok(stmt)
    }

    /// Renders a `SELECT COUNT(*)` over the rows matching the filter.
    pub fn count(&self, entity: &str, filter: Option<&Filter>) -> Result<Statement, SqlError> {
        let root = SqlRoot::new(self.schema, entity)?;
        let translator = CriteriaTranslator::new(&root, &SqlCriteria);
        let condition = match filter {
            Some(filter) => translator.translate_filter(filter)?,
            None => SqlCondition::True,
        };

        let mut w = Writer::new(&self.dialect);
        w.push("SELECT COUNT(*) FROM ");
        w.from(&root.entity().table, &root.joins());
        w.filter(&condition);

        let stmt = w.finish();
        debug!(entity, params = stmt.params.len(), "rendered count");
        Ok(stmt)
    }
}

struct Writer<'d> {
    dialect: &'d SqlDialect,
    sql: String,
    params: Vec<Operand>,
}

impl<'d> Writer<'d> {
    fn new(dialect: &'d SqlDialect) -> Self {
        Writer {
            dialect,
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn param(&mut self, value: Operand) {
        self.params.push(value);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    fn column(&mut self, column: &ColumnRef) {
        let rendered = format!(
            "{}.{}",
            self.dialect.ident(&column.alias),
            self.dialect.ident(&column.column)
        );
        self.sql.push_str(&rendered);
    }

    fn from(&mut self, table: &str, joins: &[Join]) {
        let d = self.dialect;
        self.push(&format!("{} AS {}", d.ident(table), d.ident(ROOT_ALIAS)));
        for join in joins {
            self.push(&format!(
                " LEFT JOIN {} AS {} ON {}.{} = {}.{}",
                d.ident(&join.table),
                d.ident(&join.alias),
                d.ident(&join.alias),
                d.ident(&join.target_column),
                d.ident(&join.parent_alias),
                d.ident(&join.local_column),
            ));
        }
    }

    fn filter(&mut self, condition: &SqlCondition) {
        if *condition != SqlCondition::True {
            self.push(" WHERE ");
            self.condition(condition);
        }
    }

    fn condition(&mut self, condition: &SqlCondition) {
        match condition {
            SqlCondition::True => self.push("1 = 1"),
            SqlCondition::False => self.push("1 = 0"),
            SqlCondition::Compare { column, op, value } => {
                self.column(column);
                self.push(&format!(" {} ", op.symbol()));
                self.param(value.clone());
            }
            SqlCondition::IsNull(column) => {
                self.column(column);
                self.push(" IS NULL");
            }
            SqlCondition::Like { column, pattern } => {
                self.column(column);
                self.push(" LIKE ");
                self.param(Operand::String(pattern.clone()));
                if let Some(escape) = self.dialect.like_escape {
                    let escaped = if escape == '\'' {
                        "''".to_string()
                    } else {
                        escape.to_string()
                    };
                    self.push(&format!(" ESCAPE '{escaped}'"));
                }
            }
            SqlCondition::Between { column, start, end } => {
                self.column(column);
                self.push(" BETWEEN ");
                self.param(start.clone());
                self.push(" AND ");
                self.param(end.clone());
            }
            SqlCondition::In { column, items } => {
                self.column(column);
                self.push(" IN (");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.param(item.clone());
                }
                self.push(")");
            }
            SqlCondition::Not(inner) => {
                self.push("NOT (");
                self.condition(inner);
                self.push(")");
            }
            SqlCondition::And(parts) => self.join(parts, " AND "),
            SqlCondition::Or(parts) => self.join(parts, " OR "),
        }
    }

    fn join(&mut self, parts: &[SqlCondition], sep: &str) {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            let nested = matches!(part, SqlCondition::And(_) | SqlCondition::Or(_));
            if nested {
                self.push("(");
            }
            self.condition(part);
            if nested {
                self.push(")");
            }
        }
    }

    fn order(&mut self, order: &SqlOrder) {
        self.column(&order.column);
        self.push(match order.direction {
            SortOrder::Desc => " DESC",
            SortOrder::Asc | SortOrder::None => " ASC",
        });
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}
