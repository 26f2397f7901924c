//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API, for running selection
//! against local models.
//!
//! # Examples
//!
//! ```no_run
//! use labwright_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use labwright_domain::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model name
pub const DEFAULT_MODEL: &str = "llama3";

/// Default HTTP timeout for one request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with a custom HTTP timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = crate::http_client(timeout);

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    /// Create a new Ollama provider at `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Self {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request(&self, prompt: &str, format: Option<&str>) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format,
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Ollama request");
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.request(prompt, None).await
    }

    /// Uses Ollama's JSON mode; the schema itself is carried in the prompt
    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.request(prompt, Some("json")).await
    }
}
