//! Schema introspection handlers.
//!
//! Backs the `list_tables` MCP tool and the `schema://`, `data://` and
//! `stats://` table resources.

use crate::config::MAX_SAMPLE_LIMIT;
use crate::db::{QueryExecutor, SchemaInspector, SessionManager};
use crate::error::DbResult;
use crate::models::{TableSchema, TableStats};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Output from the list_tables tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    /// User table names, sorted
    pub tables: Vec<String>,
    /// Total number of tables returned
    pub count: usize,
}

/// A page of rows read from one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableDataOutput {
    pub table_name: String,
    pub limit: u32,
    pub offset: u64,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
}

/// Handler for schema tools and table resources.
pub struct SchemaToolHandler {
    session: Arc<SessionManager>,
    executor: QueryExecutor,
}

impl SchemaToolHandler {
    /// Create a new schema tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            executor: QueryExecutor::new(),
        }
    }

    /// Handle the list_tables tool call.
    pub async fn list_tables(&self) -> DbResult<ListTablesOutput> {
        let pool = self.session.pool().await?;
        let tables = SchemaInspector::list_tables(&pool).await?;
        let count = tables.len();

        info!(count = count, "Listed tables");

        Ok(ListTablesOutput { tables, count })
    }

    /// Describe one table (`schema://tables/{table_name}`).
    pub async fn describe_table(&self, table_name: &str) -> DbResult<TableSchema> {
        let pool = self.session.pool().await?;
        let schema = SchemaInspector::describe_table(&pool, table_name).await?;

        info!(
            table = %table_name,
            columns = schema.columns.len(),
            "Described table"
        );

        Ok(schema)
    }

    /// Read a page of rows (`data://tables/{table_name}`).
    ///
    /// The reported `limit` is the clamped value actually used.
    pub async fn sample_table(
        &self,
        table_name: &str,
        limit: u32,
        offset: u64,
    ) -> DbResult<TableDataOutput> {
        let pool = self.session.pool().await?;
        let limit = limit.clamp(1, MAX_SAMPLE_LIMIT);
        let result =
            SchemaInspector::sample_rows(&pool, &self.executor, table_name, limit, offset).await?;

        Ok(TableDataOutput {
            table_name: table_name.to_string(),
            limit,
            offset,
            row_count: result.row_count(),
            columns: result.columns,
            rows: result.rows,
        })
    }

    /// Compute statistics (`stats://tables/{table_name}`).
    pub async fn table_stats(&self, table_name: &str) -> DbResult<TableStats> {
        let pool = self.session.pool().await?;
        SchemaInspector::table_stats(&pool, &self.executor, table_name).await
    }
}
