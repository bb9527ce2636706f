//! Connection holder for the single active SQLite database.
//!
//! The server talks to at most one database file at a time. [`SessionManager`]
//! owns that slot and is shared by every tool and resource handler.

use crate::error::{DbError, DbResult};
use crate::models::{ConnectOptions, ConnectionInfo, normalize_database_path};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct ActiveConnection {
    pool: SqlitePool,
    info: ConnectionInfo,
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    slot: Arc<RwLock<Option<ActiveConnection>>>,
    options: ConnectOptions,
}

impl SessionManager {
    /// Create a session manager that opens files read-only.
    pub fn new() -> Self {
        Self::with_options(ConnectOptions::default())
    }

    /// Create a session manager with explicit connect options.
    pub fn with_options(options: ConnectOptions) -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
            options,
        }
    }

    pub fn options(&self) -> ConnectOptions {
        self.options
    }

    /// Open `path` and make it the active database.
    ///
    /// The new pool is opened before the previous one is closed, so a failed
    /// open leaves the existing connection untouched.
    pub async fn connect(&self, path: &str) -> DbResult<ConnectionInfo> {
        let path = normalize_database_path(path)
            .ok_or_else(|| DbError::invalid_input("database_path cannot be empty"))?;

        let file_size = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) | Err(_) => return Err(DbError::file_not_found(path.display().to_string())),
        };

        let read_only = !self.options.writable;
        info!(
            path = %path.display(),
            read_only = read_only,
            "Connecting to database"
        );

        let pool = Self::create_pool(&path, read_only).await?;

        // Opening is lazy about the file header; touch the schema so a
        // non-database file fails here instead of on the first query.
        if let Err(e) = sqlx::query("SELECT count(*) FROM sqlite_master")
            .execute(&pool)
            .await
        {
            pool.close().await;
            return Err(DbError::query(format!(
                "Failed to open '{}': {}",
                path.display(),
                e
            )));
        }

        let mut info = ConnectionInfo::new(&path, file_size, read_only);
        if let Some(version) = Self::get_sqlite_version(&pool).await {
            info = info.with_sqlite_version(version);
        }

        let previous = {
            let mut slot = self.slot.write().await;
            slot.replace(ActiveConnection {
                pool,
                info: info.clone(),
            })
        }; // Lock released here

        if let Some(prev) = previous {
            info!(path = %prev.info.database_path, "Closing previous connection");
            prev.pool.close().await;
        }

        info!(
            path = %info.database_path,
            sqlite_version = ?info.sqlite_version,
            file_size = %info.file_size_formatted,
            "Connected successfully"
        );

        Ok(info)
    }

    /// Get the active pool.
    ///
    /// The pool is cloned out of the lock so callers never hold it across
    /// a query.
    pub async fn pool(&self) -> DbResult<SqlitePool> {
        let slot = self.slot.read().await;
        slot.as_ref()
            .map(|conn| conn.pool.clone())
            .ok_or(DbError::NoConnection)
    }

    /// Describe the active connection, if any.
    pub async fn status(&self) -> Option<ConnectionInfo> {
        let slot = self.slot.read().await;
        slot.as_ref().map(|conn| conn.info.clone())
    }

    pub async fn is_connected(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Close the active connection. No-op when nothing is open.
    pub async fn close(&self) {
        let active = self.slot.write().await.take();
        if let Some(conn) = active {
            info!(path = %conn.info.database_path, "Closing connection");
            conn.pool.close().await;
        }
    }

    async fn create_pool(path: &Path, read_only: bool) -> DbResult<SqlitePool> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(false)
            .read_only(read_only);

        SqlitePoolOptions::new()
            .min_connections(0)
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                DbError::query(format!("Failed to open '{}': {}", path.display(), e))
            })
    }

    async fn get_sqlite_version(pool: &SqlitePool) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT sqlite_version()")
            .fetch_one(pool)
            .await
        {
            Ok(version) => {
                debug!(version = %version, "Got SQLite version");
                Some(version)
            }
            Err(e) => {
                warn!(error = %e, "Failed to get SQLite version");
                None
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_manager_is_disconnected() {
        let manager = SessionManager::new();
        assert!(!manager.is_connected().await);
        assert!(manager.status().await.is_none());
        assert!(!manager.options().writable);
    }

    #[tokio::test]
    async fn test_pool_without_connection() {
        let manager = SessionManager::new();
        let result = manager.pool().await;
        assert!(matches!(result, Err(DbError::NoConnection)));
    }

    #[tokio::test]
    async fn test_connect_empty_path() {
        let manager = SessionManager::new();
        let result = manager.connect("   ").await;
        assert!(matches!(result, Err(DbError::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_connect_missing_file() {
        let manager = SessionManager::new();
        let result = manager.connect("/definitely/not/here.db").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert!(!manager.is_connected().await);
    }

    #[tokio::test]
    async fn test_close_without_connection_is_noop() {
        let manager = SessionManager::new();
        manager.close().await;
        assert!(!manager.is_connected().await);
    }
}
