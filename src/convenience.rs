//! Maintenance and inspection shortcuts over the two execute paths.
//!
//! Everything here composes through the template layer, so table names are
//! quoted and limits are bound the same way user queries are.

use crate::connection::Db;
use crate::error::PgShimError;
use crate::ident::SqlIdent;
use crate::query::ComposedQuery;
use crate::results::ResultSet;
use crate::template::{TemplateArg, compose};
use crate::types::SqlValue;

impl Db {
    /// `VACUUM ANALYZE` one table.
    ///
    /// Runs on the batch path, which stays outside a transaction the way
    /// `VACUUM` requires.
    ///
    /// # Errors
    ///
    /// Propagates connection and execution failures.
    pub fn vacuum_analyze(&self, table: &SqlIdent) -> Result<(), PgShimError> {
        let query = compose(
            "VACUUM ANALYZE {table}",
            &[("table", TemplateArg::Ident(table.clone()))],
        )?;
        self.execute_noreturn(&query)
    }

    /// `VACUUM ANALYZE` the whole database.
    ///
    /// # Errors
    ///
    /// Propagates connection and execution failures.
    pub fn vacuum_analyze_all(&self) -> Result<(), PgShimError> {
        self.execute_noreturn(&ComposedQuery::raw("VACUUM ANALYZE"))
    }

    /// Exact row count of a table.
    ///
    /// # Errors
    ///
    /// Propagates connection and execution failures; `PgShimError::Other`
    /// if the count comes back in an unexpected shape.
    pub fn row_count(&self, table: &SqlIdent) -> Result<i64, PgShimError> {
        let query = compose(
            "SELECT count(*) FROM {table}",
            &[("table", TemplateArg::Ident(table.clone()))],
        )?;
        let rows = self.execute_returning(&query)?;
        rows.rows
            .first()
            .and_then(|row| row.get_by_index(0))
            .and_then(|v| v.as_int().copied())
            .ok_or_else(|| PgShimError::Other("count(*) returned no usable row".to_string()))
    }

    /// The first `limit` rows of a table, for a quick look at its content.
    ///
    /// # Errors
    ///
    /// Propagates connection and execution failures.
    pub fn head(&self, table: &SqlIdent, limit: i64) -> Result<ResultSet, PgShimError> {
        let query = compose(
            "SELECT * FROM {table} LIMIT {limit}",
            &[
                ("table", TemplateArg::Ident(table.clone())),
                ("limit", TemplateArg::Value(SqlValue::Int(limit))),
            ],
        )?;
        self.execute_returning(&query)
    }

    /// The server's `version()` string.
    ///
    /// # Errors
    ///
    /// Propagates connection and execution failures; `PgShimError::Other`
    /// if the version comes back in an unexpected shape.
    pub fn server_version(&self) -> Result<String, PgShimError> {
        let rows = self.execute_returning(&ComposedQuery::raw("SELECT version()"))?;
        rows.rows
            .first()
            .and_then(|row| row.get_by_index(0))
            .and_then(|v| v.as_text())
            .map(ToString::to_string)
            .ok_or_else(|| PgShimError::Other("version() returned no usable row".to_string()))
    }
}
