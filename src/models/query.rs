//! Query-related data models.
//!
//! This module defines the materialized result of a SQL query.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A fully materialized query result.
///
/// Produced once by the executor and consumed by the caller (query tool,
/// resources or CSV export).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in select-list order
    pub columns: Vec<String>,
    /// Rows keyed by column name. Repeated names keep the last value.
    pub rows: Vec<serde_json::Map<String, JsonValue>>,
    /// Rows by position, aligned with `columns`
    #[serde(skip)]
    pub values: Vec<Vec<JsonValue>>,
    pub elapsed_ms: u64,
}

impl QueryResult {
    /// Build a result from positional row values.
    pub fn from_values(columns: Vec<String>, values: Vec<Vec<JsonValue>>, elapsed_ms: u64) -> Self {
        let rows: Vec<serde_json::Map<String, JsonValue>> = values
            .iter()
            .map(|row| columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect();
        Self {
            columns,
            rows,
            values,
            elapsed_ms,
        }
    }

    /// Create an empty result with known columns.
    pub fn empty(columns: Vec<String>, elapsed_ms: u64) -> Self {
        Self::from_values(columns, Vec::new(), elapsed_ms)
    }

    /// Get the number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Check if the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate the values of each row in column order.
    pub fn ordered_rows(&self) -> impl Iterator<Item = &[JsonValue]> + '_ {
        self.values.iter().map(Vec::as_slice)
    }
}
