//! Rendering options that differ between SQL engines.

use serde::{Deserialize, Serialize};

/// How bound parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// `?`
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Numbered,
}

/// SQL dialect settings.
///
/// The default renders `?` placeholders, unquoted identifiers and
/// `LIMIT -1` when an offset is given without a limit (SQLite, MySQL-style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlDialect {
    pub placeholder: Placeholder,
    /// Identifier quote character, if identifiers should be quoted.
    pub quote: Option<char>,
    /// Limit rendered when only an offset is given. `None` renders the
    /// `OFFSET` clause alone.
    pub unbounded_limit: Option<i64>,
    /// Escape character declared on LIKE clauses.
    pub like_escape: Option<char>,
}

impl Default for SqlDialect {
    fn default() -> Self {
        SqlDialect {
            placeholder: Placeholder::Question,
            quote: None,
            unbounded_limit: Some(-1),
            like_escape: Some('\\'),
        }
    }
}

impl SqlDialect {
    /// PostgreSQL: `$n` placeholders, double-quoted identifiers, bare OFFSET.
    pub fn postgres() -> Self {
        SqlDialect {
            placeholder: Placeholder::Numbered,
            quote: Some('"'),
            unbounded_limit: None,
            like_escape: Some('\\'),
        }
    }

    pub(crate) fn ident(&self, name: &str) -> String {
        match self.quote {
            Some(q) => {
                let doubled: String = [q, q].iter().collect();
                format!("{q}{}{q}", name.replace(q, &doubled))
            }
            None => name.to_string(),
        }
    }

    pub(crate) fn placeholder(&self, index: usize) -> String {
        match self.placeholder {
            Placeholder::Question => "?".to_string(),
            Placeholder::Numbered => format!("${index}"),
        }
    }
}
