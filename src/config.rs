//! Configuration handling for the SQLite analytics MCP server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::Parser;
use std::path::PathBuf;

/// Default number of rows returned by the `data://` resource.
pub const DEFAULT_SAMPLE_LIMIT: u32 = 10;

/// Upper bound for the `data://` resource `limit` parameter.
pub const MAX_SAMPLE_LIMIT: u32 = 1000;

/// Configuration for the SQLite analytics MCP server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sqlite-analytics-mcp",
    about = "MCP server for SQLite analytics - lets AI assistants inspect, query and export SQLite databases",
    version,
    author
)]
pub struct Config {
    /// SQLite database file to open at startup.
    /// The file must already exist. Clients can switch files later with connect_db.
    #[arg(
        short = 'd',
        long = "database",
        value_name = "PATH",
        env = "MCP_SQLITE_DATABASE"
    )]
    pub database: Option<PathBuf>,

    /// Open database files read-write instead of read-only.
    /// The keyword safety gate still blocks mutating statements.
    #[arg(long, env = "MCP_WRITABLE")]
    pub writable: bool,

    /// Default number of rows returned by data://tables/{table_name}
    #[arg(
        long,
        default_value_t = DEFAULT_SAMPLE_LIMIT,
        env = "MCP_SAMPLE_LIMIT"
    )]
    pub default_sample_limit: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output on stderr (disabled by default to keep stdio clean)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            database: None,
            writable: false,
            default_sample_limit: DEFAULT_SAMPLE_LIMIT,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Sample limit used when a `data://` request omits `limit`, clamped to the allowed range.
    pub fn effective_sample_limit(&self) -> u32 {
        self.default_sample_limit.clamp(1, MAX_SAMPLE_LIMIT)
    }

    /// Check option combinations that clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_sample_limit == 0 {
            return Err("default_sample_limit must be greater than 0".to_string());
        }
        if let Some(path) = &self.database {
            if path.as_os_str().is_empty() {
                return Err("database path cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database.is_none());
        assert!(!config.writable);
        assert_eq!(config.default_sample_limit, DEFAULT_SAMPLE_LIMIT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_cli_arguments() {
        let config = Config::try_parse_from([
            "sqlite-analytics-mcp",
            "--database",
            "sales.db",
            "--writable",
            "--default-sample-limit",
            "25",
        ])
        .unwrap();
        assert_eq!(config.database, Some(PathBuf::from("sales.db")));
        assert!(config.writable);
        assert_eq!(config.effective_sample_limit(), 25);
    }

    #[test]
    fn test_short_database_flag() {
        let config = Config::try_parse_from(["sqlite-analytics-mcp", "-d", "a.sqlite"]).unwrap();
        assert_eq!(config.database, Some(PathBuf::from("a.sqlite")));
    }

    #[test]
    fn test_sample_limit_clamped() {
        let config = Config {
            default_sample_limit: 50_000,
            ..Config::default()
        };
        assert_eq!(config.effective_sample_limit(), MAX_SAMPLE_LIMIT);
    }

    #[test]
    fn test_zero_sample_limit_rejected() {
        let config = Config {
            default_sample_limit: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let config = Config {
            database: Some(PathBuf::new()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
