//! Chat configuration, loadable from TOML.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use cbq_resolver::OracleConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration for the chat front end.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub database_url: Option<String>,
    /// cBioPortal study directory to load instead of a database.
    #[serde(default)]
    pub dataset_dir: Option<PathBuf>,
    /// Oracle settings. Optional, defaults to the `ollama` CLI with `phi`.
    #[serde(default)]
    pub oracle: OracleConfig,
}

/// Where query data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Postgres(String),
    Dataset(PathBuf),
    /// Built-in sample data.
    Sample,
}

impl ChatConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Use `url` (normally `DATABASE_URL`) when no data source is configured.
    pub fn with_env_database_url(mut self, url: Option<String>) -> Self {
        if self.database_url.is_none() && self.dataset_dir.is_none() {
            self.database_url = url.filter(|u| !u.trim().is_empty());
        }
        self
    }

    pub fn data_source(&self) -> DataSource {
        match (&self.database_url, &self.dataset_dir) {
            (Some(url), _) => DataSource::Postgres(url.clone()),
            (None, Some(dir)) => DataSource::Dataset(dir.clone()),
            (None, None) => DataSource::Sample,
        }
    }
}
