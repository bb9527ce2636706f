//! MCP server integration module.
//!
//! This module provides the integration between the MCP protocol and
//! the tool handlers using the rmcp framework:
//! - `service`: tool router and `ServerHandler` implementation
//! - `resources`: table resource URIs and templates

pub mod resources;
pub mod service;

pub use service::SqliteService;
