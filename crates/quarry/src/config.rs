//! Engine configuration.
//!
//! Options deserialize with serde, with every field optional, so they can be
//! embedded in an application's own configuration file.

use serde::{Deserialize, Serialize};

/// Where `Null` values sort relative to present values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullOrder {
    /// Nulls sort before every other value.
    First,
    /// Nulls sort after every other value, regardless of direction.
    #[default]
    Last,
}

/// How LIKE patterns are matched in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LikeOptions {
    /// Match without regard to case.
    pub case_insensitive: bool,
    /// Character that makes the following `%` or `_` literal.
    pub escape: Option<char>,
}

impl Default for LikeOptions {
    fn default() -> Self {
        LikeOptions {
            case_insensitive: false,
            escape: Some('\\'),
        }
    }
}

/// Configuration for the [`InMemoryQueryEngine`](crate::InMemoryQueryEngine).
///
/// # Example
///
/// ```
/// use quarry::{EngineConfig, NullOrder};
///
/// let config = EngineConfig::default();
/// assert_eq!(config.nulls, NullOrder::Last);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub nulls: NullOrder,
    pub like: LikeOptions,
}
