//! Shared fixtures for integration tests.

#![allow(dead_code)]

use sqlite_analytics_mcp::db::SessionManager;
use sqlite_analytics_mcp::models::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Number of rows in the `users` fixture table.
pub const USER_COUNT: i64 = 25;

/// A SQLite file in a temporary directory, removed on drop.
pub struct TestDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestDb {
    pub fn path_str(&self) -> String {
        self.path.to_str().unwrap().to_string()
    }

    /// A path inside the fixture directory, for export targets.
    pub fn sibling(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

const FIXTURE_SQL: &[&str] = &[
    "CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT UNIQUE,
        active BOOLEAN DEFAULT 1,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        avatar BLOB
    )",
    "CREATE TABLE orders (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        total REAL,
        note TEXT DEFAULT 'none'
    )",
    "CREATE INDEX idx_orders_user ON orders(user_id)",
    "CREATE TABLE \"weird \"\"name\" (value TEXT)",
    "INSERT INTO \"weird \"\"name\" VALUES ('ok')",
];

/// Create a database with `users`, `orders` and an awkwardly named table.
///
/// Every fifth user has a NULL email; user 1 has a UTF-8 avatar, user 2 a
/// non-UTF-8 one.
pub async fn create_test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analytics.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for sql in FIXTURE_SQL {
        sqlx::query(sql).execute(&pool).await.unwrap();
    }

    for i in 1..=USER_COUNT {
        let email = if i % 5 == 0 {
            None
        } else {
            Some(format!("user{:02}@example.com", i))
        };
        sqlx::query("INSERT INTO users (id, name, email, active) VALUES (?, ?, ?, ?)")
            .bind(i)
            .bind(format!("user{:02}", i))
            .bind(email)
            .bind(i % 2 == 0)
            .execute(&pool)
            .await
            .unwrap();
    }

    sqlx::query("UPDATE users SET avatar = X'48656C6C6F' WHERE id = 1")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET avatar = X'FF00' WHERE id = 2")
        .execute(&pool)
        .await
        .unwrap();

    for (user_id, total) in [(1, 19.5), (1, 5.0), (2, 100.25)] {
        sqlx::query("INSERT INTO orders (user_id, total) VALUES (?, ?)")
            .bind(user_id)
            .bind(total)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;
    TestDb { dir, path }
}

/// Create the fixture and open it read-only through a session.
pub async fn connected_session() -> (TestDb, Arc<SessionManager>) {
    let db = create_test_db().await;
    let session = Arc::new(SessionManager::new());
    session.connect(&db.path_str()).await.unwrap();
    (db, session)
}

/// Same as [`connected_session`] but read-write.
pub async fn writable_session() -> (TestDb, Arc<SessionManager>) {
    let db = create_test_db().await;
    let session = Arc::new(SessionManager::with_options(ConnectOptions::writable()));
    session.connect(&db.path_str()).await.unwrap();
    (db, session)
}
