//! `ollama run` subprocess transport.
//!
//! Runs `<command...> run --format=json <model> <input>` where `input` is
//! the JSON array `[prompt, query]`. The child is spawned with
//! `kill_on_drop`, so a timeout (which drops the wait future) kills it.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{OracleError, TextOracle};

/// Oracle backed by the Ollama command-line client.
pub struct OllamaCliOracle {
    /// Program followed by any leading arguments.
    command: Vec<String>,
    model: String,
}

impl OllamaCliOracle {
    pub fn new(command: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            command,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextOracle for OllamaCliOracle {
    async fn invoke(
        &self,
        prompt: &str,
        query: &str,
        timeout: Duration,
    ) -> Result<String, OracleError> {
        let (program, leading) = self.command.split_first().ok_or(OracleError::EmptyCommand)?;
        let input = serde_json::to_string(&[prompt, query]).map_err(std::io::Error::from)?;

        let model = self.model.as_str();
        let child = Command::new(program)
            .args(leading)
            .args(["run", "--format=json", model, input.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| OracleError::Launch {
                program: program.clone(),
                source,
            })?;

        let wait = child.wait_with_output();
        let output = match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(OracleError::Timeout {
                    secs: timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            tracing::warn!(stderr = %stderr, "oracle process wrote to stderr");
        }

        if !output.status.success() && stdout.trim().is_empty() {
            return Err(OracleError::Exit {
                code: output.status.code(),
                stderr,
            });
        }
        Ok(stdout)
    }

    fn name(&self) -> &str {
        "ollama-cli"
    }
}
