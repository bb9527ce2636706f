//! Connection-related data models.
//!
//! This module defines types describing the single open SQLite connection.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options applied when opening a database file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Default: false for safety
    pub writable: bool,
}

impl ConnectOptions {
    /// Options for a read-write connection.
    pub fn writable() -> Self {
        Self { writable: true }
    }
}

/// Normalize a user-supplied database path.
///
/// Accepts plain paths as well as `sqlite:` / `sqlite://` prefixed ones.
/// Returns `None` for empty input.
pub fn normalize_database_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    let stripped = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    if stripped.is_empty() {
        None
    } else {
        Some(PathBuf::from(stripped))
    }
}

/// Information about the active connection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionInfo {
    /// Path of the open database file
    pub database_path: String,
    /// File size in bytes at connect time
    pub file_size: u64,
    /// Human readable file size (e.g. "1.5 MB")
    pub file_size_formatted: String,
    /// SQLite library version reported by the connection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite_version: Option<String>,
    /// True if the file was opened read-only
    pub read_only: bool,
    /// When the connection was opened (RFC 3339)
    pub connected_at: DateTime<Utc>,
}

impl ConnectionInfo {
    /// Create connection info for a freshly opened file.
    pub fn new(path: &Path, file_size: u64, read_only: bool) -> Self {
        Self {
            database_path: path.display().to_string(),
            file_size,
            file_size_formatted: humansize::format_size(file_size, humansize::WINDOWS),
            sqlite_version: None,
            read_only,
            connected_at: Utc::now(),
        }
    }

    /// Set the SQLite version.
    pub fn with_sqlite_version(mut self, version: impl Into<String>) -> Self {
        self.sqlite_version = Some(version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain_path() {
        assert_eq!(
            normalize_database_path("data/sales.db"),
            Some(PathBuf::from("data/sales.db"))
        );
    }

    #[test]
    fn test_normalize_strips_sqlite_prefix() {
        assert_eq!(
            normalize_database_path("sqlite:sales.db"),
            Some(PathBuf::from("sales.db"))
        );
        assert_eq!(
            normalize_database_path("sqlite:///tmp/sales.db"),
            Some(PathBuf::from("/tmp/sales.db"))
        );
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        assert_eq!(
            normalize_database_path("  a.db \n"),
            Some(PathBuf::from("a.db"))
        );
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert_eq!(normalize_database_path(""), None);
        assert_eq!(normalize_database_path("   "), None);
        assert_eq!(normalize_database_path("sqlite:"), None);
    }

    #[test]
    fn test_connection_info_formats_size() {
        let info = ConnectionInfo::new(Path::new("a.db"), 2048, true).with_sqlite_version("3.45.0");
        assert_eq!(info.file_size_formatted, "2 kB");
        assert_eq!(info.sqlite_version.as_deref(), Some("3.45.0"));
        assert!(info.read_only);
    }
}
