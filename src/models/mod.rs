//! Data models for the SQLite analytics MCP server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod query;
pub mod schema;

// Re-export commonly used types
pub use connection::{ConnectOptions, ConnectionInfo, normalize_database_path};
pub use query::QueryResult;
pub use schema::{
    ColumnDefinition, ColumnStats, ForeignKey, ForeignKeyAction, IndexInfo, TableSchema,
    TableStats,
};
