//! Read-only query execution.
//!
//! Executes a validated query and captures the outcome into a [`ResultSet`].
//! Execution never raises past this boundary: store errors are recorded in
//! `execution_error`, and "no rows" is distinct from "failed".

use datachat_core::{AppError, AppResult};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Result of executing one query.
///
/// Rows share the executed query's projection; `columns` carries the
/// projection order since JSON objects do not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    /// Column names in projection order
    pub columns: Vec<String>,

    /// Rows as column-name to scalar mappings
    pub rows: Vec<HashMap<String, Value>>,

    /// Present when execution failed; rows are empty in that case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
}

impl ResultSet {
    /// Build a successful result set.
    pub fn ok(columns: Vec<String>, rows: Vec<HashMap<String, Value>>) -> Self {
        Self {
            columns,
            rows,
            execution_error: None,
        }
    }

    /// Build a failed result set. Partial results are never carried.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            execution_error: Some(error.into()),
        }
    }

    /// Whether execution failed.
    pub fn is_failed(&self) -> bool {
        self.execution_error.is_some()
    }

    /// Number of rows returned.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Execute a query on an open connection, collecting all rows.
pub fn run_query(conn: &Connection, sql: &str) -> AppResult<ResultSet> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| AppError::Store(e.to_string()))?;

    let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();

    let mut rows = stmt
        .query([])
        .map_err(|e| AppError::Store(e.to_string()))?;

    let mut collected = Vec::new();
    loop {
        let row = match rows.next() {
            Ok(Some(row)) => row,
            Ok(None) => break,
            Err(e) => return Err(AppError::Store(e.to_string())),
        };

        let mut record = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            let value = row
                .get_ref(i)
                .map_err(|e| AppError::Store(e.to_string()))?;
            record.insert(column.clone(), value_to_json(value));
        }
        collected.push(record);
    }

    tracing::debug!("Query returned {} rows", collected.len());

    Ok(ResultSet::ok(columns, collected))
}

/// Convert a SQLite value to a JSON scalar.
fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE sales (category TEXT, total REAL, note TEXT);
            INSERT INTO sales VALUES ('Electronics', 5000.0, NULL);
            INSERT INTO sales VALUES ('Clothing', 3000.0, 'seasonal');
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_run_query_rows_and_columns() {
        let conn = seeded_conn();
        let results = run_query(&conn, "SELECT category, total, note FROM sales").unwrap();

        assert_eq!(results.columns, vec!["category", "total", "note"]);
        assert_eq!(results.row_count(), 2);
        assert!(!results.is_failed());

        assert_eq!(results.rows[0]["category"], Value::from("Electronics"));
        assert_eq!(results.rows[0]["total"], Value::from(5000.0));
        assert_eq!(results.rows[0]["note"], Value::Null);
    }

    #[test]
    fn test_run_query_empty_is_not_failure() {
        let conn = seeded_conn();
        let results = run_query(&conn, "SELECT category FROM sales WHERE total > 99999").unwrap();

        assert_eq!(results.row_count(), 0);
        assert!(!results.is_failed());
        assert_eq!(results.columns, vec!["category"]);
    }

    #[test]
    fn test_run_query_bad_sql_errors() {
        let conn = seeded_conn();
        let result = run_query(&conn, "SELECT nope FROM missing");
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_result_set_carries_no_rows() {
        let results = ResultSet::failed("no such table: missing");
        assert!(results.is_failed());
        assert_eq!(results.row_count(), 0);
        assert!(results.columns.is_empty());
    }
}
