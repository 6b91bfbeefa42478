//! Command-line flags and their merge into `ChatConfig`.
//!
//! Precedence: flag > config file > `DATABASE_URL` > defaults.

use std::path::PathBuf;

use clap::Parser;

use cbq_resolver::OracleTransport;

use crate::config::{ChatConfig, ConfigError};

#[derive(Debug, Parser)]
#[command(
    name = "cbq-chat",
    version,
    about = "Ask questions about the cBioPortal LUAD study"
)]
pub struct Cli {
    /// TOML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ollama model name.
    #[arg(long)]
    pub model: Option<String>,

    /// Oracle timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// PostgreSQL connection URL.
    #[arg(long, conflicts_with = "dataset")]
    pub database_url: Option<String>,

    /// cBioPortal study directory (flat files) to query instead of a database.
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// Oracle transport: `cli` (ollama run) or `http` (Ollama API).
    #[arg(long)]
    pub oracle: Option<OracleTransport>,

    /// Ollama API base URL for the http transport.
    #[arg(long)]
    pub ollama_host: Option<String>,

    /// Resolve with patterns only.
    #[arg(long)]
    pub no_oracle: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Build the effective configuration. `env_database_url` is the value
    /// of `DATABASE_URL`, if set.
    pub fn to_config(&self, env_database_url: Option<String>) -> Result<ChatConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => ChatConfig::from_file(path)?,
            None => ChatConfig::default(),
        };
        let mut config = base.with_env_database_url(env_database_url);

        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
            config.dataset_dir = None;
        }
        if let Some(dir) = &self.dataset {
            config.dataset_dir = Some(dir.clone());
            config.database_url = None;
        }
        if let Some(model) = &self.model {
            config.oracle.model = model.clone();
        }
        if let Some(secs) = self.timeout {
            config.oracle.timeout_secs = secs;
        }
        if let Some(transport) = self.oracle {
            config.oracle.transport = transport;
        }
        if let Some(host) = &self.ollama_host {
            config.oracle.host = host.clone();
        }
        if self.no_oracle {
            config.oracle.enabled = false;
        }
        Ok(config)
    }
}
