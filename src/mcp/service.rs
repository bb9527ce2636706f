//! MCP service implementation using rmcp.
//!
//! This module defines the SqliteService struct with all database tools and
//! table resources exposed via the MCP protocol using the rmcp framework's
//! macros.

use crate::config::Config;
use crate::db::{SchemaInspector, SessionManager};
use crate::mcp::resources::{self, JSON_MIME_TYPE, ResourceKind};
use crate::tools::connection::{
    ConnectDbInput, ConnectDbOutput, ConnectionStatusOutput, ConnectionToolHandler,
};
use crate::tools::export::{ExportToCsvInput, ExportToCsvOutput, ExportToolHandler};
use crate::tools::query::{ExecuteQueryInput, ExecuteQueryOutput, QueryToolHandler};
use crate::tools::schema::{ListTablesOutput, SchemaToolHandler};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        Implementation, ListResourceTemplatesResult, ListResourcesResult, PaginatedRequestParam,
        ProtocolVersion, ReadResourceRequestParam, ReadResourceResult, ResourceContents,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct SqliteService {
    /// Shared connection holder for all database operations
    session: Arc<SessionManager>,
    /// Rows returned by `data://` resources without a `limit`
    default_sample_limit: u32,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl SqliteService {
    /// Create a new SqliteService instance.
    pub fn new(session: Arc<SessionManager>, config: &Config) -> Self {
        Self {
            session,
            default_sample_limit: config.effective_sample_limit(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Resolve a resource URI to its JSON payload.
    pub async fn read_resource_json(&self, uri: &str) -> Result<String, McpError> {
        let request = resources::parse_resource_uri(uri, self.default_sample_limit)?;
        debug!(uri = %uri, kind = ?request.kind, table = %request.table_name, "Reading resource");

        let handler = SchemaToolHandler::new(self.session.clone());
        match request.kind {
            ResourceKind::Schema => to_json(&handler.describe_table(&request.table_name).await?),
            ResourceKind::Data => to_json(
                &handler
                    .sample_table(&request.table_name, request.limit, request.offset)
                    .await?,
            ),
            ResourceKind::Stats => to_json(&handler.table_stats(&request.table_name).await?),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize resource: {}", e), None))
}

#[tool_router]
impl SqliteService {
    #[tool(
        description = "Connect to an existing SQLite database file.\nReplaces any previously open database. Must be called before the other tools and resources."
    )]
    async fn connect_db(
        &self,
        Parameters(input): Parameters<ConnectDbInput>,
    ) -> Result<Json<ConnectDbOutput>, McpError> {
        let handler = ConnectionToolHandler::new(self.session.clone());
        handler.connect_db(input).await.map(Json).map_err(Into::into)
    }

    #[tool(description = "Report whether a database is open and which file it is.")]
    async fn connection_status(&self) -> Json<ConnectionStatusOutput> {
        let handler = ConnectionToolHandler::new(self.session.clone());
        Json(handler.connection_status().await)
    }

    #[tool(
        description = "Execute a read-only SQL query and return all rows.\nStatements containing DROP, DELETE, INSERT, UPDATE, CREATE, ALTER and similar keywords are rejected, even inside string literals.\nOutput format: json (default), table, or markdown."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<Json<ExecuteQueryOutput>, McpError> {
        let handler = QueryToolHandler::new(self.session.clone());
        handler
            .execute_query(input)
            .await
            .map(Json)
            .map_err(Into::into)
    }

    #[tool(description = "List the user tables of the connected database, sorted by name.")]
    async fn list_tables(&self) -> Result<Json<ListTablesOutput>, McpError> {
        let handler = SchemaToolHandler::new(self.session.clone());
        handler.list_tables().await.map(Json).map_err(Into::into)
    }

    #[tool(
        description = "Run a read-only SQL query and write the result to a CSV file on the server.\nThe first line holds the column names. An existing file is overwritten."
    )]
    async fn export_to_csv(
        &self,
        Parameters(input): Parameters<ExportToCsvInput>,
    ) -> Result<Json<ExportToCsvOutput>, McpError> {
        let handler = ExportToolHandler::new(self.session.clone());
        handler
            .export_to_csv(input)
            .await
            .map(Json)
            .map_err(Into::into)
    }
}

#[tool_handler]
impl ServerHandler for SqliteService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "sqlite-analytics-mcp".to_owned(),
                title: Some("SQLite Analytics MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only analytics over a single SQLite database file.\n\
                \n\
                ## Workflow\n\
                1. Call `connect_db` with the path of an existing .db/.sqlite file\n\
                2. Call `list_tables` to see what is there\n\
                3. Read `schema://tables/{name}` and `stats://tables/{name}` to understand a table\n\
                4. Read `data://tables/{name}?limit=10&offset=0` to page through rows\n\
                5. Use `execute_query` for ad-hoc SELECTs and `export_to_csv` to save results\n\
                \n\
                ## Restrictions\n\
                - Statements containing DROP, DELETE, INSERT, UPDATE, CREATE, ALTER and similar\n\
                  keywords are rejected, even inside string literals or comments\n\
                - Connecting again replaces the current database\n\
                \n\
                ## Error: No database connected\n\
                If you see \"No database connected\", call `connect_db` first."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        // Nothing to enumerate until a database is open
        let Ok(pool) = self.session.pool().await else {
            return Ok(ListResourcesResult::with_all_items(Vec::new()));
        };
        let tables = SchemaInspector::list_tables(&pool).await?;
        Ok(ListResourcesResult::with_all_items(
            resources::table_resources(&tables),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(
            resources::resource_templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let json = self.read_resource_json(&request.uri).await?;

        let mut contents = ResourceContents::text(json, request.uri.clone());
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(JSON_MIME_TYPE.to_string());
        }

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}
