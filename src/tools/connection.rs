//! Connection tools: `connect_db` and `connection_status`.

use crate::db::SessionManager;
use crate::error::DbResult;
use crate::models::ConnectionInfo;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Input for the connect_db tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConnectDbInput {
    /// Path to an existing SQLite database file. A "sqlite:" prefix is accepted.
    pub database_path: String,
}

/// Output from the connect_db tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectDbOutput {
    /// Always "connected"
    pub status: String,
    pub message: String,
    pub connection: ConnectionInfo,
}

/// Output from the connection_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ConnectionStatusOutput {
    pub connected: bool,
    /// Present only while a database is open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionInfo>,
}

pub struct ConnectionToolHandler {
    session: Arc<SessionManager>,
}

impl ConnectionToolHandler {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Open a database file, replacing any previous connection.
    pub async fn connect_db(&self, input: ConnectDbInput) -> DbResult<ConnectDbOutput> {
        let info = self.session.connect(&input.database_path).await?;
        let mode = if info.read_only { "read-only" } else { "read-write" };
        Ok(ConnectDbOutput {
            status: "connected".to_string(),
            message: format!("Connected to {} ({})", info.database_path, mode),
            connection: info,
        })
    }

    pub async fn connection_status(&self) -> ConnectionStatusOutput {
        let connection = self.session.status().await;
        ConnectionStatusOutput {
            connected: connection.is_some(),
            connection,
        }
    }
}
