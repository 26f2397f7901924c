//! Gemini Provider Implementation
//!
//! Calls the Google Generative Language `generateContent` endpoint. The API
//! key is taken from the environment, never from a config file.

use crate::LlmError;
use async_trait::async_trait;
use labwright_domain::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default HTTP timeout for one request (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Gemini API provider
pub struct GeminiProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Response contained no text".to_string()));
        }
        Ok(text)
    }
}

impl GeminiProvider {
    /// Create a provider with an explicit API key
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_endpoint(
            DEFAULT_ENDPOINT,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider against a custom base URL
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = crate::http_client(timeout);

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Read the API key from the environment variable `var`
    pub fn from_env(var: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = std::env::var(var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(var.to_string()))?;
        Ok(Self::new(api_key, model))
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    async fn request(&self, prompt: &str, mime_type: Option<&str>) -> Result<String, LlmError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: mime_type.map(|m| GenerationConfig { response_mime_type: m }),
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

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

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        parsed.into_text()
    }
}

#[async_trait]
impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.request(prompt, None).await
    }

    /// Requests `application/json` output; the schema is carried in the prompt
    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.request(prompt, Some("application/json")).await
    }
}
