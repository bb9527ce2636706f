//! SQLite Analytics MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools and resources for
//! AI assistants to explore, query and export a SQLite database file.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::DbError;
pub use mcp::SqliteService;
