//! Error types for the SQLite analytics MCP server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant provides actionable messages to help AI assistants understand
//! and recover from error conditions.

use thiserror::Error;

/// Kind of object a [`DbError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingObject {
    /// A database file on disk
    File,
    /// A table in the connected database
    Table,
}

impl std::fmt::Display for MissingObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "Database file"),
            Self::Table => write!(f, "Table"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("No database connected. Call connect_db first.")]
    NoConnection,

    #[error("{kind} not found: {name}")]
    NotFound { kind: MissingObject, name: String },

    #[error(
        "Query rejected: contains blocked keyword '{keyword}'. Only read-only statements are allowed."
    )]
    RejectedQuery { keyword: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("I/O error writing '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a not found error for a database file.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::NotFound {
            kind: MissingObject::File,
            name: path.into(),
        }
    }

    /// Create a not found error for a table.
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            kind: MissingObject::Table,
            name: table.into(),
        }
    }

    /// Create a rejected query error for the offending keyword.
    pub fn rejected_query(keyword: impl Into<String>) -> Self {
        Self::RejectedQuery {
            keyword: keyword.into(),
        }
    }

    /// Create a query error carrying the driver message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create an I/O error for the given path.
    pub fn io(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NoConnection => {
                Some("Call connect_db with the path of an existing SQLite file first")
            }
            Self::NotFound {
                kind: MissingObject::File,
                ..
            } => Some("Check the path; only existing database files can be opened"),
            Self::NotFound {
                kind: MissingObject::Table,
                ..
            } => Some("Call list_tables to see the available table names"),
            Self::RejectedQuery { .. } => {
                Some("Rewrite the statement as a SELECT without mutating keywords")
            }
            Self::Query { .. } => Some("Check the SQL syntax and referenced objects"),
            Self::Io { .. } => Some("Check that the target directory exists and is writable"),
            Self::InvalidInput { .. } | Self::Internal { .. } => None,
        }
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::query(db_err.message()),
            sqlx::Error::RowNotFound => DbError::query("No rows returned"),
            sqlx::Error::ColumnNotFound(col) => DbError::query(format!("Column not found: {}", col)),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::query(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::query(format!("Decode error: {}", source)),
            sqlx::Error::PoolClosed => DbError::NoConnection,
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            other => DbError::query(other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            DbError::InvalidInput { .. } | DbError::RejectedQuery { .. } | DbError::Query { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }
            DbError::NotFound { .. } => rmcp::ErrorData::resource_not_found(err.to_string(), data),
            DbError::NoConnection => rmcp::ErrorData::invalid_request(err.to_string(), data),
            DbError::Io { .. } | DbError::Internal { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), data)
            }
        }
    }
}
