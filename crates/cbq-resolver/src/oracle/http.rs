//! Ollama HTTP API transport (`/api/chat`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{OracleError, TextOracle};

/// Ollama chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    format: &'a str,
    stream: bool,
}

/// A single message in the chat request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Oracle backed by a running Ollama server.
pub struct OllamaHttpOracle {
    client: reqwest::Client,
    host: String,
    model: String,
}

impl OllamaHttpOracle {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextOracle for OllamaHttpOracle {
    async fn invoke(
        &self,
        prompt: &str,
        query: &str,
        timeout: Duration,
    ) -> Result<String, OracleError> {
        let url = format!("{}/api/chat", self.host.trim_end_matches('/'));

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
            format: "json",
            stream: false,
        };

        let to_error = |e: reqwest::Error| {
            if e.is_timeout() {
                OracleError::Timeout {
                    secs: timeout.as_secs(),
                }
            } else {
                OracleError::Http(e.to_string())
            }
        };

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(to_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(OracleError::Http(format!("ollama returned {status}")));
        }

        let chat: ChatResponse = response.json().await.map_err(to_error)?;
        chat.message
            .map(|m| m.content)
            .ok_or_else(|| OracleError::Http("response has no message".into()))
    }

    fn name(&self) -> &str {
        "ollama-http"
    }
}
