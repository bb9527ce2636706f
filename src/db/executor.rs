//! Query execution engine.
//!
//! Runs SQL text against the active pool and materializes the full result:
//! - every statement passes the keyword gate first (see [`crate::tools::sql_guard`])
//! - no row limit and no timeout; the whole result set is collected
//! - column names come from the prepared statement, so they are known even
//!   when the query returns no rows

use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::QueryResult;
use crate::tools::sql_guard;
use futures_util::StreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Executor, SqlitePool, Statement};
use std::time::Instant;
use tracing::{debug, info};

/// Query executor that handles database query execution.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor {
    decode_binary: bool,
}

impl QueryExecutor {
    /// Create a new query executor with default settings.
    pub fn new() -> Self {
        Self {
            decode_binary: true,
        }
    }

    /// Control how BLOB values are rendered.
    ///
    /// `true` renders valid UTF-8 as text and everything else as base64;
    /// `false` always uses base64.
    pub fn with_decode_binary(decode_binary: bool) -> Self {
        Self { decode_binary }
    }

    pub fn decode_binary(&self) -> bool {
        self.decode_binary
    }

    /// Check `sql` against the keyword gate, then execute it.
    pub async fn execute(&self, pool: &SqlitePool, sql: &str) -> DbResult<QueryResult> {
        sql_guard::check(sql)?;
        self.execute_unchecked(pool, sql).await
    }

    /// Execute without the keyword gate.
    ///
    /// Only for statements the crate builds itself from allow-listed
    /// identifiers.
    pub(crate) async fn execute_unchecked(
        &self,
        pool: &SqlitePool,
        sql: &str,
    ) -> DbResult<QueryResult> {
        let start = Instant::now();
        debug!(sql = %sql, "Executing query");

        let rows = fetch_rows(pool, sql).await?;
        let columns = if rows.is_empty() {
            statement_columns(pool, sql).await
        } else {
            rows[0].get_column_names()
        };

        let result = process_rows(rows, columns, start, self.decode_binary);
        info!(
            row_count = result.row_count(),
            elapsed_ms = result.elapsed_ms,
            "Query executed"
        );
        Ok(result)
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert fetched rows into a QueryResult.
fn process_rows(
    rows: Vec<SqliteRow>,
    columns: Vec<String>,
    start: Instant,
    decode_binary: bool,
) -> QueryResult {
    if rows.is_empty() {
        return QueryResult::empty(columns, start.elapsed().as_millis() as u64);
    }

    // Decoded by position so repeated column names (joins) keep every value
    let values: Vec<Vec<serde_json::Value>> = rows
        .iter()
        .map(|r| r.to_json_values_with_options(decode_binary))
        .collect();

    QueryResult::from_values(columns, values, start.elapsed().as_millis() as u64)
}

async fn fetch_rows(pool: &SqlitePool, sql: &str) -> DbResult<Vec<SqliteRow>> {
    let results: Vec<Result<SqliteRow, sqlx::Error>> = pool.fetch(sql).collect().await;
    collect_rows(results)
}

fn collect_rows<R>(results: Vec<Result<R, sqlx::Error>>) -> DbResult<Vec<R>> {
    let mut rows = Vec::with_capacity(results.len());
    for result in results {
        rows.push(result.map_err(DbError::from)?);
    }
    Ok(rows)
}

/// Column names of the statement, or none if it cannot be prepared
/// (e.g. multiple statements in one string).
async fn statement_columns(pool: &SqlitePool, sql: &str) -> Vec<String> {
    match pool.prepare(sql).await {
        Ok(statement) => statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        Err(e) => {
            debug!(error = %e, "Could not prepare statement for column names");
            Vec::new()
        }
    }
}
