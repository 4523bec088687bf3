//! LLM backend abstraction and the Ollama client

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed LLM response: {0}")]
    Malformed(String),
}

/// One entry in the request the model sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Inference collaborator. Calls block; an empty reply signals failure and
/// the agent substitutes its fallback line.
pub trait LlmClient: Send + Sync {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaChatMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    host: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub const DEFAULT_HOST: &'static str = "http://localhost:11434";

    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            host: host.into(),
            client,
        })
    }

    /// Cheap liveness probe against `/api/tags`. Used at startup to warn
    /// early when the model server is down.
    pub fn check_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

impl LlmClient for OllamaClient {
    fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.host);
        let payload = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": max_tokens,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()?
            .error_for_status()?;
        let parsed: OllamaChatResponse = response
            .json()
            .map_err(|e| LlmError::Malformed(e.to_string()))?;
        Ok(parsed.message.content)
    }
}
