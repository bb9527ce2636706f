//! Query execution tool.
//!
//! This module implements the `execute_query` MCP tool. Statements containing
//! mutating keywords are rejected by the safety gate before they reach SQLite.

use crate::db::{QueryExecutor, SessionManager};
use crate::error::DbResult;
use crate::models::QueryResult;
use crate::tools::format::OutputFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Default value for decode_binary field.
fn default_decode_binary() -> bool {
    true
}

/// Input for the execute_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL statement to run. Statements containing DROP, DELETE, INSERT, UPDATE, CREATE, ALTER or similar keywords are rejected.
    pub sql: String,
    /// Output format: "json" returns structured rows, "table" adds an ASCII table, "markdown" adds a markdown table
    #[serde(default)]
    pub format: OutputFormat,
    /// If true (default), try to decode binary columns as UTF-8 text first (fallback to base64). If false, always use base64 encoding.
    #[serde(default = "default_decode_binary")]
    pub decode_binary: bool,
}

/// Output from the execute_query tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExecuteQueryOutput {
    /// Column names in select-list order
    pub columns: Vec<String>,
    /// Result rows as column-name to value maps
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// Number of rows returned
    pub row_count: usize,
    /// Query execution time in milliseconds
    pub elapsed_ms: u64,
    /// Pre-formatted output when format is table or markdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl ExecuteQueryOutput {
    /// Create output from query result with specified format.
    pub fn from_result(result: QueryResult, format: OutputFormat) -> Self {
        let formatted = format.render(&result);
        Self {
            row_count: result.row_count(),
            elapsed_ms: result.elapsed_ms,
            columns: result.columns,
            rows: result.rows,
            formatted,
        }
    }
}

impl From<QueryResult> for ExecuteQueryOutput {
    fn from(result: QueryResult) -> Self {
        Self::from_result(result, OutputFormat::Json)
    }
}

/// Handler for query execution.
pub struct QueryToolHandler {
    session: Arc<SessionManager>,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Handle the execute_query tool call.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ExecuteQueryOutput> {
        let pool = self.session.pool().await?;
        let executor = QueryExecutor::with_decode_binary(input.decode_binary);
        let result = executor.execute(&pool, &input.sql).await?;
        Ok(ExecuteQueryOutput::from_result(result, input.format))
    }
}
