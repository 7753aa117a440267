use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::{Row, Statement};
use serde_json::Value as JsonValue;

use crate::error::PgShimError;
use crate::types::SqlValue;

/// A single row from a query result.
///
/// Column names are shared across all rows of a result set, so a row can
/// answer both positional and by-name access without duplicating metadata.
#[derive(Debug, Clone)]
pub struct ResultRow {
    columns: Arc<Vec<String>>,
    values: Vec<SqlValue>,
}

impl ResultRow {
    /// Value by column name, or `None` if the name is unknown.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    /// Value by select-list position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Column names, in select-list order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All values, in select-list order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Materialized rows from [`Db::execute_returning`](crate::connection::Db::execute_returning).
///
/// Column names come from statement metadata, so they are present even when
/// the query matched nothing.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Arc<Vec<String>>,
    /// The rows returned by the query.
    pub rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Empty result set with known column names.
    #[must_use]
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns: Arc::new(columns),
            rows: Vec::new(),
        }
    }

    /// Append a row; values align positionally with the column names.
    pub fn push_row(&mut self, values: Vec<SqlValue>) {
        self.rows.push(ResultRow {
            columns: Arc::clone(&self.columns),
            values,
        });
    }

    /// Column names shared by every row.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build a result set from prepared-statement metadata and fetched rows.
///
/// # Errors
///
/// Returns `PgShimError::QueryError` if a cell cannot be decoded.
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, PgShimError> {
    let columns: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = columns.len();

    let mut result_set = ResultSet::with_columns(columns);
    result_set.rows.reserve(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(extract_value(row, idx)?);
        }
        result_set.push_row(values);
    }

    Ok(result_set)
}

/// Decode one cell into a `SqlValue`, keyed off the column's declared type.
fn extract_value(row: &Row, idx: usize) -> Result<SqlValue, PgShimError> {
    let type_name = row.columns()[idx].type_().name();

    match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Int))
        }
        // the driver's FromSql impls are width-strict, so each float width
        // gets its own read type
        "float4" => {
            let val: Option<f32> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bool))
        }
        "timestamp" => {
            let val: Option<NaiveDateTime> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Timestamp))
        }
        "timestamptz" => {
            let val: Option<DateTime<Utc>> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, |v| SqlValue::Timestamp(v.naive_utc())))
        }
        "date" => {
            let val: Option<NaiveDate> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, |v| {
                SqlValue::Timestamp(v.and_time(NaiveTime::MIN))
            }))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Json))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Bytes))
        }
        // text/varchar/char and anything else that casts to text
        _ => {
            let val: Option<String> = row.try_get(idx).map_err(PgShimError::QueryError)?;
            Ok(val.map_or(SqlValue::Null, SqlValue::Text))
        }
    }
}
