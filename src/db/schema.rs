//! Schema introspection module.
//!
//! Table names coming from callers are never interpolated into SQL until they
//! have been matched exactly against [`SchemaInspector::list_tables`]. Metadata
//! lookups bind the name as a parameter to SQLite's table-valued pragma
//! functions; the statements that must embed it (sampling, statistics) use
//! [`quote_identifier`].

use crate::config::MAX_SAMPLE_LIMIT;
use crate::db::executor::QueryExecutor;
use crate::db::types::{TypeCategory, categorize_type};
use crate::error::{DbError, DbResult};
use crate::models::{
    ColumnDefinition, ColumnStats, ForeignKey, ForeignKeyAction, IndexInfo, QueryResult,
    TableSchema, TableStats,
};
use crate::tools::sql_guard;
use serde_json::Value as JsonValue;
use sqlx::{Row, SqlitePool};
use tracing::debug;

mod queries {
    // `_` is a LIKE wildcard, so escape it to only hide the sqlite_ prefix
    pub const LIST_TABLES: &str = r#"
        SELECT name FROM sqlite_master
        WHERE type = 'table'
        AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
        ORDER BY name
        "#;

    pub const TABLE_INFO: &str = r#"
        SELECT name, type, "notnull", dflt_value, pk
        FROM pragma_table_info(?)
        ORDER BY cid
        "#;

    pub const FOREIGN_KEYS: &str = r#"
        SELECT "from", "table", "to", on_update, on_delete
        FROM pragma_foreign_key_list(?)
        ORDER BY id, seq
        "#;

    pub const INDEX_LIST: &str = r#"
        SELECT name, "unique", origin
        FROM pragma_index_list(?)
        ORDER BY name
        "#;

    pub const INDEX_COLUMNS: &str = r#"
        SELECT name FROM pragma_index_info(?)
        ORDER BY seqno
        "#;
}

/// Quote an identifier for embedding in SQL, doubling any embedded `"`.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build the paging query used by [`SchemaInspector::sample_rows`].
pub fn sample_query(table_name: &str, limit: u32, offset: u64) -> String {
    format!(
        "SELECT * FROM {} LIMIT {} OFFSET {}",
        quote_identifier(table_name),
        limit,
        offset
    )
}

/// Schema inspector for database introspection.
pub struct SchemaInspector;

impl SchemaInspector {
    /// List user tables, ordered by name.
    pub async fn list_tables(pool: &SqlitePool) -> DbResult<Vec<String>> {
        let rows = sqlx::query(queries::LIST_TABLES).fetch_all(pool).await?;
        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("name"))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = tables.len(), "Listed SQLite tables");
        Ok(tables)
    }

    /// Fail with `NotFound` unless `table_name` is an existing user table.
    pub async fn ensure_table_exists(pool: &SqlitePool, table_name: &str) -> DbResult<()> {
        let tables = Self::list_tables(pool).await?;
        if tables.iter().any(|t| t == table_name) {
            Ok(())
        } else {
            Err(DbError::table_not_found(table_name))
        }
    }

    /// Describe a table's columns, keys and indexes.
    pub async fn describe_table(pool: &SqlitePool, table_name: &str) -> DbResult<TableSchema> {
        Self::ensure_table_exists(pool, table_name).await?;

        let columns = fetch_columns(pool, table_name).await?;
        let primary_key = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();

        let foreign_keys = fetch_foreign_keys(pool, table_name).await?;
        let indexes = fetch_indexes(pool, table_name).await?;

        Ok(TableSchema {
            table_name: table_name.to_string(),
            columns,
            primary_key,
            foreign_keys,
            indexes,
        })
    }

    /// Read a page of rows from a table.
    ///
    /// `limit` is clamped to `[1, MAX_SAMPLE_LIMIT]`. The keyword gate sees the
    /// statement without the table name, which is covered by the allow-list,
    /// so a table called `update` can still be paged.
    pub async fn sample_rows(
        pool: &SqlitePool,
        executor: &QueryExecutor,
        table_name: &str,
        limit: u32,
        offset: u64,
    ) -> DbResult<QueryResult> {
        Self::ensure_table_exists(pool, table_name).await?;

        let limit = limit.clamp(1, MAX_SAMPLE_LIMIT);
        sql_guard::check(&sample_query("", limit, offset))?;
        let sql = sample_query(table_name, limit, offset);
        executor.execute_unchecked(pool, &sql).await
    }

    /// Compute row count and per-column statistics.
    ///
    /// Issues one aggregate query per column. MIN/MAX are skipped for BLOB
    /// columns.
    pub async fn table_stats(
        pool: &SqlitePool,
        executor: &QueryExecutor,
        table_name: &str,
    ) -> DbResult<TableStats> {
        Self::ensure_table_exists(pool, table_name).await?;

        let table = quote_identifier(table_name);
        let row_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;

        let columns = fetch_columns(pool, table_name).await?;
        let mut column_stats = Vec::with_capacity(columns.len());

        for column in &columns {
            let col = quote_identifier(&column.name);
            let is_blob = categorize_type(&column.data_type) == TypeCategory::Binary;

            let sql = if is_blob {
                format!(
                    "SELECT COUNT(*) - COUNT({col}) AS null_count, \
                     COUNT(DISTINCT {col}) AS distinct_count FROM {table}"
                )
            } else {
                format!(
                    "SELECT COUNT(*) - COUNT({col}) AS null_count, \
                     COUNT(DISTINCT {col}) AS distinct_count, \
                     MIN({col}) AS min_value, MAX({col}) AS max_value FROM {table}"
                )
            };

            // Column names may contain blocked words; the statement is
            // built from allow-listed identifiers only.
            let result = executor.execute_unchecked(pool, &sql).await?;
            let row = result.rows.first().cloned().unwrap_or_default();

            column_stats.push(ColumnStats {
                name: column.name.clone(),
                data_type: column.data_type.clone(),
                null_count: as_count(row.get("null_count")),
                distinct_count: as_count(row.get("distinct_count")),
                min: (!is_blob).then(|| row.get("min_value").cloned().unwrap_or(JsonValue::Null)),
                max: (!is_blob).then(|| row.get("max_value").cloned().unwrap_or(JsonValue::Null)),
            });
        }

        debug!(
            table = %table_name,
            row_count = row_count,
            columns = column_stats.len(),
            "Computed table statistics"
        );

        Ok(TableStats {
            table_name: table_name.to_string(),
            row_count: row_count.max(0) as u64,
            column_count: columns.len(),
            columns: column_stats,
        })
    }
}

fn as_count(value: Option<&JsonValue>) -> u64 {
    value.and_then(JsonValue::as_u64).unwrap_or(0)
}

async fn fetch_columns(pool: &SqlitePool, table_name: &str) -> DbResult<Vec<ColumnDefinition>> {
    let rows = sqlx::query(queries::TABLE_INFO)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.try_get("name")?;
        let data_type: String = row.try_get("type")?;
        let notnull: i64 = row.try_get("notnull")?;
        let default_value: Option<String> = row.try_get("dflt_value")?;
        let pk: i64 = row.try_get("pk")?;

        let mut col = ColumnDefinition::new(name, data_type, notnull == 0).with_primary_key(pk > 0);
        if let Some(ref def) = default_value {
            col = col.with_default_str(def);
        }
        columns.push(col);
    }
    Ok(columns)
}

async fn fetch_foreign_keys(pool: &SqlitePool, table_name: &str) -> DbResult<Vec<ForeignKey>> {
    let rows = sqlx::query(queries::FOREIGN_KEYS)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    let mut foreign_keys = Vec::with_capacity(rows.len());
    for row in &rows {
        let column: String = row.try_get("from")?;
        let ref_table: String = row.try_get("table")?;
        let ref_column: Option<String> = row.try_get("to")?;
        let on_delete: String = row.try_get("on_delete").unwrap_or_default();
        let on_update: String = row.try_get("on_update").unwrap_or_default();

        foreign_keys.push(
            ForeignKey::new(column, ref_table, ref_column)
                .with_on_delete(ForeignKeyAction::parse(&on_delete))
                .with_on_update(ForeignKeyAction::parse(&on_update)),
        );
    }
    Ok(foreign_keys)
}

async fn fetch_indexes(pool: &SqlitePool, table_name: &str) -> DbResult<Vec<IndexInfo>> {
    let idx_list = sqlx::query(queries::INDEX_LIST)
        .bind(table_name)
        .fetch_all(pool)
        .await?;

    let mut indexes = Vec::new();
    for idx_row in &idx_list {
        let name: String = idx_row.try_get("name")?;
        let is_unique: i64 = idx_row.try_get("unique")?;
        let origin: String = idx_row.try_get("origin").unwrap_or_default();

        let columns = fetch_index_columns(pool, &name).await?;
        if !columns.is_empty() {
            indexes.push(
                IndexInfo::new(name, columns)
                    .with_unique(is_unique != 0)
                    .with_primary(origin == "pk"),
            );
        }
    }
    Ok(indexes)
}

async fn fetch_index_columns(pool: &SqlitePool, index_name: &str) -> DbResult<Vec<String>> {
    let rows = sqlx::query(queries::INDEX_COLUMNS)
        .bind(index_name)
        .fetch_all(pool)
        .await?;

    // Expression index members have a NULL name
    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(name) = row.try_get::<Option<String>, _>("name")? {
            columns.push(name);
        }
    }
    Ok(columns)
}
