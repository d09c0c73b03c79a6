//! Schema introspection for the relational store.
//!
//! Reads table structure out of SQLite and renders it as a flat textual
//! description for prompt construction.

use datachat_core::{AppError, AppResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// A column in a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// Declared SQL type
    pub col_type: String,

    /// Whether this column is part of the primary key
    pub primary_key: bool,

    /// Whether NULL values are allowed
    pub nullable: bool,
}

/// A foreign-key edge from one table to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column in this table
    pub column: String,

    /// Referenced table
    pub referenced_table: String,

    /// Referenced column, if declared explicitly
    pub referenced_column: Option<String>,
}

/// Schema of a single table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Columns in declaration order
    pub columns: Vec<ColumnInfo>,

    /// Foreign-key edges
    pub foreign_keys: Vec<ForeignKey>,
}

/// List all user tables in the database.
pub fn list_tables(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .map_err(|e| AppError::Store(format!("Failed to list tables: {}", e)))?;

    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| AppError::Store(format!("Failed to list tables: {}", e)))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(tables)
}

/// Read column information for a table via `PRAGMA table_info`.
pub fn table_columns(conn: &Connection, table: &str) -> AppResult<Vec<ColumnInfo>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{}\")", table))
        .map_err(|e| AppError::Store(format!("Failed to read columns for {}: {}", table, e)))?;

    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get("name")?,
                col_type: row.get("type")?,
                primary_key: row.get::<_, i64>("pk")? != 0,
                nullable: row.get::<_, i64>("notnull")? == 0,
            })
        })
        .map_err(|e| AppError::Store(format!("Failed to read columns for {}: {}", table, e)))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(columns)
}

/// Read foreign-key edges for a table via `PRAGMA foreign_key_list`.
pub fn table_foreign_keys(conn: &Connection, table: &str) -> AppResult<Vec<ForeignKey>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA foreign_key_list(\"{}\")", table))
        .map_err(|e| AppError::Store(format!("Failed to read foreign keys for {}: {}", table, e)))?;

    let foreign_keys = stmt
        .query_map([], |row| {
            Ok(ForeignKey {
                column: row.get("from")?,
                referenced_table: row.get("table")?,
                referenced_column: row.get("to")?,
            })
        })
        .map_err(|e| AppError::Store(format!("Failed to read foreign keys for {}: {}", table, e)))?
        .filter_map(|r| r.ok())
        .collect();

    Ok(foreign_keys)
}

/// Introspect the full database schema.
pub fn introspect(conn: &Connection) -> AppResult<Vec<TableSchema>> {
    let tables = list_tables(conn)?;
    let mut schemas = Vec::with_capacity(tables.len());

    for table in tables {
        let columns = table_columns(conn, &table)?;
        let foreign_keys = table_foreign_keys(conn, &table)?;
        schemas.push(TableSchema {
            name: table,
            columns,
            foreign_keys,
        });
    }

    Ok(schemas)
}

/// Render table schemas as a flat textual description for prompts.
pub fn describe_schema(schemas: &[TableSchema]) -> String {
    let mut out = String::from("Database Schema:\n\n");

    for table in schemas {
        out.push_str(&format!("Table: {}\n", table.name));
        out.push_str("Columns:\n");

        for column in &table.columns {
            let pk = if column.primary_key {
                " (Primary Key)"
            } else {
                ""
            };
            let nullable = if column.nullable { " (Nullable)" } else { "" };
            out.push_str(&format!(
                "  - {} ({}){}{}\n",
                column.name, column.col_type, pk, nullable
            ));
        }

        if !table.foreign_keys.is_empty() {
            out.push_str("Foreign Keys:\n");
            for fk in &table.foreign_keys {
                match &fk.referenced_column {
                    Some(col) => out.push_str(&format!(
                        "  - {} references {}({})\n",
                        fk.column, fk.referenced_table, col
                    )),
                    None => out.push_str(&format!(
                        "  - {} references {}\n",
                        fk.column, fk.referenced_table
                    )),
                }
            }
        }

        out.push('\n');
    }

    out
}
