//! SQLite Analytics MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools and resources for
//! AI assistants to explore, query and export a SQLite database file.

use sqlite_analytics_mcp::config::Config;
use sqlite_analytics_mcp::db::SessionManager;
use sqlite_analytics_mcp::mcp::SqliteService;
use sqlite_analytics_mcp::models::ConnectOptions;
use sqlite_analytics_mcp::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr; stdout carries the protocol.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse_args();

    init_tracing(&config);

    if let Err(message) = config.validate() {
        eprintln!("Error: {}", message);
        std::process::exit(2);
    }

    info!(
        writable = config.writable,
        "Starting SQLite Analytics MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let options = ConnectOptions {
        writable: config.writable,
    };
    let session = Arc::new(SessionManager::with_options(options));

    if let Some(path) = &config.database {
        let path = path.display().to_string();
        info!(path = %path, "Connecting to startup database");
        session.connect(&path).await?;
    }

    let service = SqliteService::new(session, &config);
    let transport = StdioTransport::new(service);

    info!(transport = transport.name(), "Serving");
    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
