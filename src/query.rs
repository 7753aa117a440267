use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::SqlValue;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// A SQL statement ready to execute: final query text plus the values bound
/// to its `$N` placeholders, in placeholder order.
///
/// Produced by [`compose`](crate::template::compose), or wrapped directly
/// from an already-complete statement:
/// ```rust
/// use pg_shim::ComposedQuery;
///
/// let query = ComposedQuery::raw("SELECT 1");
/// assert_eq!(query.sql(), "SELECT 1");
/// assert!(query.params().is_empty());
/// ```
///
/// The fields stay private so composed text cannot be edited after the
/// identifier quoting and value binding have been done.
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    query: String,
    params: Vec<SqlValue>,
}

impl ComposedQuery {
    /// Wrap a complete statement with no bound parameters.
    pub fn raw(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            params: Vec::new(),
        }
    }

    pub(crate) fn from_parts(query: String, params: Vec<SqlValue>) -> Self {
        Self { query, params }
    }

    /// The final SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.query
    }

    /// The values bound to `$1..$N`.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

impl fmt::Display for ComposedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query)
    }
}

impl From<&str> for ComposedQuery {
    fn from(query: &str) -> Self {
        ComposedQuery::raw(query)
    }
}

impl From<String> for ComposedQuery {
    fn from(query: String) -> Self {
        ComposedQuery::raw(query)
    }
}

/// Collapse whitespace runs to single spaces and trim the ends, so
/// multi-line statements log as one line.
#[must_use]
pub fn compact_sql(sql: &str) -> String {
    WHITESPACE_RUN.replace_all(sql, " ").trim().to_string()
}
