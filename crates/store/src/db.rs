//! Store handle: connection lifecycle and the store-boundary operations.

use crate::exec::{run_query, ResultSet};
use crate::schema::{describe_schema, introspect, TableSchema};
use datachat_core::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// Handle to the relational store.
///
/// Holds only the database path. A connection is opened, used, and released
/// within the scope of each operation, so a failed query cannot leak a
/// connection into the next call.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Create a handle for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-only connection. The store boundary never mutates state.
    fn open(&self) -> AppResult<Connection> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| AppError::Store(format!("Failed to open database {:?}: {}", self.path, e)))
    }

    /// Introspect all table schemas.
    pub fn schema(&self) -> AppResult<Vec<TableSchema>> {
        let conn = self.open()?;
        introspect(&conn)
    }

    /// Render the schema as a flat textual description for prompts.
    pub fn schema_description(&self) -> AppResult<String> {
        Ok(describe_schema(&self.schema()?))
    }

    /// Execute a query, capturing any store error into the result set.
    ///
    /// Execution is all-or-nothing per call: on error the result set is
    /// empty and carries only the error text.
    pub fn execute_query(&self, sql: &str) -> ResultSet {
        let conn = match self.open() {
            Ok(conn) => conn,
            Err(e) => return ResultSet::failed(e.to_string()),
        };

        match run_query(&conn, sql) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Query execution failed: {}", e);
                ResultSet::failed(e.to_string())
            }
        }
    }

    /// Fetch up to `limit` sample rows from a table, for display.
    pub fn sample_rows(&self, table: &str, limit: usize) -> ResultSet {
        self.execute_query(&format!("SELECT * FROM \"{}\" LIMIT {}", table, limit))
    }
}
