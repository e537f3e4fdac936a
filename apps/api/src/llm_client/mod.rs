//! LLM client: the single point of entry for calls to the local Ollama server.
//!
//! ARCHITECTURAL RULE: No other module may talk to the model server directly.
//! Task prompts live in `analysis`; this module only knows the wire protocol.
//!
//! No retries and no response validation happen here: `generate` hands back the
//! model's raw `response` text and callers decide how to parse it.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode Ollama reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sampling options forwarded to the model. Unset fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A single generation call. `stream` is accepted for protocol parity but ignored:
/// the client always asks for one complete reply.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: Option<bool>,
    pub options: Option<GenerationOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<&'a GenerationOptions>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: String,
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

/// The model-server seam. `AppState` carries an `Arc<dyn ModelBackend>` so handlers
/// can be exercised without a running Ollama.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// True iff the server answered its version endpoint with a success status.
    async fn check_connection(&self) -> bool;

    /// Installed model names; empty when the server cannot be queried.
    async fn list_models(&self) -> Vec<String>;

    /// Runs one non-streaming generation and returns the raw response text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, InferenceError>;
}

/// HTTP client for the Ollama REST API.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, InferenceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn fetch_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let tags: OllamaTagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl ModelBackend for OllamaClient {
    async fn check_connection(&self) -> bool {
        match self.client.get(self.endpoint("/api/version")).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Ollama version check returned {}", response.status());
                false
            }
            Err(e) => {
                warn!("Ollama connection error: {e}");
                false
            }
        }
    }

    async fn list_models(&self) -> Vec<String> {
        self.fetch_models().await.unwrap_or_else(|e| {
            warn!("Error fetching Ollama models: {e}");
            Vec::new()
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, InferenceError> {
        if request.stream == Some(true) {
            debug!("Streaming requested; overriding to a single response");
        }

        let body = OllamaGenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: request.options.as_ref(),
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let message = if body.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{reason}: {}", body.trim())
            };
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        let reply: OllamaGenerateResponse = serde_json::from_str(&text)?;

        debug!(
            model = %reply.model,
            done = reply.done,
            response_chars = reply.response.len(),
            "Ollama generation succeeded"
        );

        Ok(reply.response)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
