use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "dbapi-server", about = "Postgres functions and views as HTTP endpoints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
}

#[derive(Args, Clone, Debug, Default)]
pub struct ServeArgs {
    /// Path to the TOML config file [default: dbapi.toml]
    #[arg(long, env = "DBAPI_CONFIG")]
    pub config: Option<String>,

    /// Postgres connection string (DSN, URL or user@http://host:port/database/password)
    #[arg(long, env = "DBAPI_POSTGRES")]
    pub postgres: Option<String>,

    /// Address to listen on
    #[arg(long, env = "DBAPI_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short, env = "DBAPI_PORT")]
    pub port: Option<u16>,
}

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub postgres: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content)
            .map_err(|detail| ServerError::Config { context: "parse", detail: format!("'{path}': {detail}") })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

const DEFAULT_CONFIG_PATH: &str = "dbapi.toml";

impl ServeArgs {
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH)
    }
}

fn default_host() -> String {
    "localhost".into()
}
fn default_port() -> u16 {
    8081
}

// ═══════════════════════════════════════════════════════════════
//  Effective merged config
// ═══════════════════════════════════════════════════════════════

/// Final settings: defaults < config file < env/CLI.
#[derive(Debug, PartialEq)]
pub struct Effective {
    pub postgres: String,
    pub host: String,
    pub port: u16,
}

impl Effective {
    /// Only the default config file may be missing. A path given with
    /// `--config` or `DBAPI_CONFIG` must exist.
    pub fn new(args: &ServeArgs) -> Result<Self, ServerError> {
        let cfg = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => FileConfig::load(DEFAULT_CONFIG_PATH)?,
            None => {
                tracing::debug!(config = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
                FileConfig::default()
            }
        };
        Self::merge(args, cfg)
    }

    fn merge(args: &ServeArgs, cfg: FileConfig) -> Result<Self, ServerError> {
        let postgres = args.postgres.clone().or(cfg.postgres).ok_or_else(|| ServerError::Config {
            context: "postgres",
            detail: "no connection string (set --postgres, DBAPI_POSTGRES or `postgres` in the config file)".into(),
        })?;

        Ok(Self {
            postgres,
            host: args.host.clone().or(cfg.host).unwrap_or_else(default_host),
            port: args.port.or(cfg.port).unwrap_or_else(default_port),
        })
    }
}
