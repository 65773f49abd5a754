//! Anthropic messages backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use uian_core::{defaults, Error, GenerationBackend, Result};

/// Default Anthropic API endpoint.
pub const DEFAULT_ANTHROPIC_URL: &str = defaults::ANTHROPIC_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

/// Configuration for the Anthropic messages backend.
#[derive(Debug, Clone)]
pub struct ClaudeConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key. When absent the backend is constructible but every call
    /// fails with a configuration error, so the HTTP layer can report the
    /// missing credential per request.
    pub api_key: Option<String>,
    /// Model to use for generation.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ANTHROPIC_URL.to_string(),
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            timeout_secs: defaults::GEN_TIMEOUT_SECS,
        }
    }
}

impl ClaudeConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ANTHROPIC_URL.to_string()),
            api_key: std::env::var("CLAUDE_API_KEY").ok(),
            model: std::env::var("CLAUDE_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string()),
            timeout_secs: std::env::var("CLAUDE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::GEN_TIMEOUT_SECS),
        }
    }
}

/// Anthropic messages backend. Single-turn, no streaming, no retries.
pub struct ClaudeBackend {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeBackend {
    /// Create a new Claude backend with the given configuration.
    pub fn new(config: ClaudeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Claude backend: url={}, model={}, key={}",
            config.base_url,
            config.model,
            if config.api_key.is_some() { "set" } else { "not set" }
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClaudeConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClaudeConfig {
        &self.config
    }
}

/// Message for the `/v1/messages` endpoint.
#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

/// Request payload for the `/v1/messages` endpoint.
#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ApiMessage>,
}

/// Response from the `/v1/messages` endpoint. Error payloads share the
/// shape, with `error` set and `content` absent.
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl GenerationBackend for ClaudeBackend {
    #[instrument(skip(self, system, user), fields(subsystem = "inference", component = "claude", op = "complete", model = %self.config.model, prompt_len = user.len()))]
    async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("CLAUDE_API_KEY is not set".to_string()))?;

        let start = Instant::now();

        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages: vec![ApiMessage {
                role: "user",
                content: user.to_string(),
            }],
        };

        let url = format!(
            "{}/v1/messages",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", defaults::ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Request failed: {}", e)))?;

        let status = response.status();
        let payload: MessagesResponse = response.json().await.map_err(|e| {
            if status.is_success() {
                Error::MalformedResponse(format!("Failed to parse response: {}", e))
            } else {
                Error::Generation {
                    status: Some(status.as_u16()),
                    message: format!("Anthropic returned {}", status),
                }
            }
        })?;

        // The provider reports failures in-band; mirror its status upward.
        if let Some(err) = payload.error {
            return Err(Error::Generation {
                status: Some(status.as_u16()),
                message: err.message,
            });
        }

        let answer = payload
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .ok_or_else(|| {
                Error::MalformedResponse("Response contained no text content block".to_string())
            })?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = answer.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = user.len(),
                slow = true,
                "Slow generation operation"
            );
        }
        Ok(answer)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
