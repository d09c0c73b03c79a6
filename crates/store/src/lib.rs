//! Relational store access for the datachat CLI.
//!
//! Two concerns live here: schema introspection (rendered as a textual
//! description for prompts) and read-only query execution returning a
//! [`ResultSet`]. Connections are scoped to a single operation.

pub mod db;
pub mod exec;
pub mod schema;

// Re-export main types
pub use db::Database;
pub use exec::ResultSet;
pub use schema::{describe_schema, ColumnInfo, ForeignKey, TableSchema};
