//! Database layer.
//!
//! This module provides database access functionality:
//! - Connection holder for the single active SQLite file
//! - Query execution behind the keyword gate
//! - Schema and statistics introspection
//! - SQLite value to JSON mapping

pub mod executor;
pub mod schema;
pub mod session;
pub mod types;

pub use executor::QueryExecutor;
pub use schema::{SchemaInspector, quote_identifier};
pub use session::SessionManager;
