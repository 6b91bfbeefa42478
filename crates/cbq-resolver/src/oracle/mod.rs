//! Oracle-backed resolver.
//!
//! Sends the catalogue prompt plus the user's query to an Ollama model and
//! validates whatever comes back. Every failure (transport, timeout, bad
//! payload) is logged and reported as "no intent"; nothing propagates.

pub mod cli;
pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cbq_protocol::{Intent, ParamKind, ResolverTier};

use crate::payload;
use crate::prompt::build_prompt;
use crate::{IntentResolver, Resolution};

pub use cli::OllamaCliOracle;
pub use http::OllamaHttpOracle;

/// Errors from invoking the oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle command is empty")]
    EmptyCommand,

    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("oracle timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("oracle exited with status {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("oracle HTTP request failed: {0}")]
    Http(String),

    #[error("oracle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability: turn (prompt, query) into raw model text within `timeout`.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn invoke(
        &self,
        prompt: &str,
        query: &str,
        timeout: Duration,
    ) -> Result<String, OracleError>;

    /// Transport name (for logging).
    fn name(&self) -> &str;
}

/// How the oracle is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleTransport {
    /// `ollama run` subprocess.
    #[default]
    Cli,
    /// Ollama HTTP API (`/api/chat`).
    Http,
}

impl std::str::FromStr for OracleTransport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cli" => Ok(Self::Cli),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown oracle transport '{other}' (cli or http)")),
        }
    }
}

/// Configuration for the oracle.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    #[serde(default)]
    pub transport: OracleTransport,
    /// Program and leading arguments for the CLI transport.
    #[serde(default = "default_command")]
    pub command: Vec<String>,
    /// Ollama HTTP API base URL (HTTP transport).
    #[serde(default = "default_host")]
    pub host: String,
    /// Model to use for inference.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-query timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// When false, only the pattern resolver is used.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_command() -> Vec<String> {
    vec!["ollama".into()]
}
fn default_host() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "phi".into()
}
fn default_timeout_secs() -> u64 {
    180
}
fn default_enabled() -> bool {
    true
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            transport: OracleTransport::default(),
            command: default_command(),
            host: default_host(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            enabled: default_enabled(),
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolver that asks a `TextOracle` and validates its answer.
pub struct OracleResolver {
    oracle: Box<dyn TextOracle>,
    timeout: Duration,
}

impl OracleResolver {
    pub fn new(oracle: Box<dyn TextOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    /// Build the resolver for the configured transport.
    pub fn from_config(config: &OracleConfig) -> Self {
        let oracle: Box<dyn TextOracle> = match config.transport {
            OracleTransport::Cli => Box::new(OllamaCliOracle::new(
                config.command.clone(),
                config.model.clone(),
            )),
            OracleTransport::Http => Box::new(OllamaHttpOracle::new(
                config.host.clone(),
                config.model.clone(),
            )),
        };
        Self::new(oracle, config.timeout())
    }

    /// Ask the oracle for an intent. `None` on any failure.
    pub async fn resolve_text(&self, text: &str) -> Option<Intent> {
        let prompt = build_prompt(text);

        let raw = match self.oracle.invoke(&prompt, text, self.timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    oracle = self.oracle.name(),
                    "oracle call failed"
                );
                return None;
            }
        };

        let mut intent = match payload::parse_intent(&raw) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    raw = %raw,
                    "oracle returned an unusable payload"
                );
                return None;
            }
        };

        fill_missing_counts(&mut intent, text);
        tracing::debug!(
            operation = %intent.operation,
            args = ?intent.args,
            "oracle resolved intent"
        );
        Some(intent)
    }
}

#[async_trait]
impl IntentResolver for OracleResolver {
    async fn resolve(&self, text: &str) -> Option<Resolution> {
        self.resolve_text(text).await.map(|intent| Resolution {
            intent,
            tier: ResolverTier::Oracle,
        })
    }

    fn tier_name(&self) -> &str {
        "oracle"
    }
}

/// Fill missing integer parameters (`n`, `threshold`) from the first integer
/// token of the query. Known weakness: with several numbers in the query the
/// first one wins, whichever it refers to.
fn fill_missing_counts(intent: &mut Intent, query: &str) {
    for spec in intent.operation.params() {
        if spec.kind == ParamKind::Gene || intent.args.contains_key(spec.name) {
            continue;
        }
        if let Some(n) = first_integer(query) {
            tracing::debug!(
                param = spec.name,
                value = n,
                "filled missing count from query text"
            );
            intent.args.insert(spec.name.to_string(), n.into());
        }
    }
}

/// First whitespace-separated token that parses as an integer once
/// surrounding punctuation is removed.
pub fn first_integer(text: &str) -> Option<i64> {
    text.split_whitespace()
        .map(strip_punctuation)
        .find_map(|token| token.parse().ok())
}

fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '-')
}
