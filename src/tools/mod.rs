//! MCP tool implementations.
//!
//! This module contains all tool handlers:
//! - `connection`: open a database file and report the active connection
//! - `query`: execute read-only SQL
//! - `schema`: list tables and back the table resources
//! - `export`: write query results to CSV
//! - `sql_guard`: keyword gate applied to every caller-supplied statement
//! - `format`: table and markdown rendering of results

pub mod connection;
pub mod export;
pub mod format;
pub mod query;
pub mod schema;
pub mod sql_guard;

pub use connection::{
    ConnectDbInput, ConnectDbOutput, ConnectionStatusOutput, ConnectionToolHandler,
};
pub use export::{ExportToCsvInput, ExportToCsvOutput, ExportToolHandler};
pub use format::OutputFormat;
pub use query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
pub use schema::{ListTablesOutput, SchemaToolHandler, TableDataOutput};
