//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use forum_core::errors::CoreError;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column through the type's `FromStr` (forum-core enums).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the stored string is not a known variant.
pub fn parse_column<T>(s: &str) -> Result<T, DatabaseError>
where
    T: FromStr<Err = CoreError>,
{
    s.parse()
        .map_err(|e| DatabaseError::Query(format!("Unexpected stored value '{s}': {e}")))
}

/// Convert a non-negative `COUNT(*)` column into `u64`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for a negative count.
pub fn count_from_row(row: &libsql::Row, idx: i32) -> Result<u64, DatabaseError> {
    let n = row.get::<i64>(idx)?;
    u64::try_from(n).map_err(|_| DatabaseError::Query(format!("Negative count: {n}")))
}

/// Run a single-value `COUNT(*)` query.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or returns no row.
pub async fn query_count(
    conn: &libsql::Connection,
    sql: &str,
    params: impl libsql::params::IntoParams,
) -> Result<u64, DatabaseError> {
    let mut rows = conn.query(sql, params).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    count_from_row(&row, 0)
}
