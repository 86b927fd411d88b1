//! Transport to the generative text service.
//!
//! The [`Generator`] trait is the injection seam: the orchestrator holds an
//! `Arc<dyn Generator>` constructed once at startup, and tests substitute a
//! deterministic stub. [`OpenAiGenerator`] is the production implementation
//! over the Chat Completions API.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors from a single generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service answered with a non-success status. Covers rate limits
    /// (429) and upstream 5xx; the status is preserved for the caller.
    #[error("generation API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The request failed in transit (connect, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered 2xx but the body did not contain a completion.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// The upstream HTTP status, when one was observed.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse(_) => None,
        }
    }
}

/// A capability that turns a prompt into text.
///
/// One outbound call per invocation; no retries at this layer (retry
/// policy, if any, belongs to the caller) and no streaming. A call either
/// resolves with text or fails within the configured timeout.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

/// Configuration for [`OpenAiGenerator`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    /// API root, e.g. `https://api.openai.com/v1`. Overridable for
    /// compatible gateways.
    pub base_url: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &str = "gpt-5.1";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Config with defaults for everything but the API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_owned(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Chat Completions client.
///
/// Built explicitly and injected; there is no ambient global HTTP client.
pub struct OpenAiGenerator {
    config: GeneratorConfig,
    http: reqwest::Client,
}

impl OpenAiGenerator {
    /// Build a client with the configured timeout.
    pub fn new(config: GeneratorConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GenerationError::Network)?;
        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
        })
    }

    /// Pull the completion text out of a Chat Completions response body.
    fn extract_content(body: &serde_json::Value) -> Result<String, GenerationError> {
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                GenerationError::InvalidResponse("no message content in response".into())
            })
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.endpoint();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "generation request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await?;
        Self::extract_content(&body)
    }
}
