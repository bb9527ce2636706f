//! CSV export tool.
//!
//! This module implements the `export_to_csv` MCP tool: run a query through
//! the gate and write the full result to a file on the server's filesystem.
//! Existing files are overwritten without confirmation.

use crate::db::{QueryExecutor, SessionManager};
use crate::error::{DbError, DbResult};
use crate::models::QueryResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::info;

/// Input for the export_to_csv tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExportToCsvInput {
    /// SQL statement whose result is exported. The same keyword restrictions as execute_query apply.
    pub sql: String,
    /// Destination file path on the server. Overwritten if it exists.
    pub filename: String,
}

/// Output from the export_to_csv tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ExportToCsvOutput {
    /// Number of data rows written (excluding the header)
    pub row_count: usize,
    /// Path the file was written to
    pub filename: String,
    /// Header row, in order
    pub columns: Vec<String>,
}

/// Render one CSV field.
///
/// NULL becomes an empty field; arrays and objects are written as compact JSON.
/// Fields containing a delimiter, quote or line break are quoted with inner
/// quotes doubled.
pub fn csv_field(value: &JsonValue) -> String {
    let s = match value {
        JsonValue::Null => return String::new(),
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    };
    escape_csv(&s)
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render a query result as CSV text: header line, then one line per row.
pub fn render_csv(result: &QueryResult) -> String {
    let mut out = String::new();

    let header: Vec<String> = result.columns.iter().map(|c| escape_csv(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in result.ordered_rows() {
        let fields: Vec<String> = row.iter().map(csv_field).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out
}

/// Handler for CSV export.
pub struct ExportToolHandler {
    session: Arc<SessionManager>,
    executor: QueryExecutor,
}

impl ExportToolHandler {
    /// Create a new export tool handler.
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            executor: QueryExecutor::new(),
        }
    }

    /// Handle the export_to_csv tool call.
    pub async fn export_to_csv(&self, input: ExportToCsvInput) -> DbResult<ExportToCsvOutput> {
        // Blank names are rejected; any other path is used exactly as given
        let filename = input.filename.as_str();
        if filename.trim().is_empty() {
            return Err(DbError::invalid_input("filename cannot be empty"));
        }

        let pool = self.session.pool().await?;
        let result = self.executor.execute(&pool, &input.sql).await?;

        tokio::fs::write(filename, render_csv(&result))
            .await
            .map_err(|e| DbError::io(filename, &e))?;

        info!(
            filename = %filename,
            row_count = result.row_count(),
            "Exported query result to CSV"
        );

        Ok(ExportToCsvOutput {
            row_count: result.row_count(),
            filename: filename.to_string(),
            columns: result.columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_field_plain_values() {
        assert_eq!(csv_field(&json!("Alice")), "Alice");
        assert_eq!(csv_field(&json!(42)), "42");
        assert_eq!(csv_field(&json!(1.5)), "1.5");
        assert_eq!(csv_field(&json!(false)), "false");
        assert_eq!(csv_field(&JsonValue::Null), "");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field(&json!("a,b")), "\"a,b\"");
        assert_eq!(csv_field(&json!("say \"hi\"")), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field(&json!("line1\nline2")), "\"line1\nline2\"");
        assert_eq!(csv_field(&json!("cr\r")), "\"cr\r\"");
    }

    #[test]
    fn test_csv_field_nested_json() {
        assert_eq!(csv_field(&json!({"k": 1})), "\"{\"\"k\"\":1}\"");
        assert_eq!(csv_field(&json!([1, 2])), "\"[1,2]\"");
    }

    #[test]
    fn test_render_csv() {
        let result = QueryResult::from_values(
            vec!["id".to_string(), "name".to_string()],
            vec![vec![json!(1), json!("Smith, J")]],
            0,
        );
        assert_eq!(render_csv(&result), "id,name\n1,\"Smith, J\"\n");
    }

    #[test]
    fn test_render_csv_repeated_column_names() {
        let result = QueryResult::from_values(
            vec!["id".to_string(), "id".to_string()],
            vec![vec![json!(1), json!(3)]],
            0,
        );
        assert_eq!(render_csv(&result), "id,id\n1,3\n");
    }

    #[test]
    fn test_render_csv_header_only() {
        let result = QueryResult::empty(vec!["a".to_string(), "b".to_string()], 0);
        assert_eq!(render_csv(&result), "a,b\n");
    }

    #[tokio::test]
    async fn test_empty_filename_rejected_before_connection_check() {
        let handler = ExportToolHandler::new(Arc::new(SessionManager::new()));
        let result = handler
            .export_to_csv(ExportToCsvInput {
                sql: "SELECT 1".to_string(),
                filename: "  ".to_string(),
            })
            .await;
        assert!(matches!(result, Err(DbError::InvalidInput { .. })));
    }
}
