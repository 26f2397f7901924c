//! Labwright LLM Provider Layer
//!
//! Pluggable LLM provider implementations used by the selection client.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `labwright-domain`. Every provider makes exactly one request per call;
//! retries and timeouts belong to the caller.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//! - `GeminiProvider`: Google Generative Language API
//! - `ConfiguredProvider`: one of the above, chosen at runtime from config
//!
//! # Examples
//!
//! ```
//! use labwright_llm::MockProvider;
//! use labwright_domain::LlmProvider;
//!
//! # tokio_test::block_on(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod gemini;
pub mod ollama;

use async_trait::async_trait;
use labwright_domain::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use config::{ConfiguredProvider, ProviderConfig, ProviderKind};
pub use gemini::GeminiProvider;
pub use ollama::OllamaProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Provider needs an API key that is not set
    #[error("API key not set (expected in environment variable {0})")]
    MissingApiKey(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Communication(format!("Request failed: {}", e))
        }
    }
}

/// HTTP client with a request timeout for the remote providers
///
/// If the TLS backend cannot be initialised the builder fails; the plain
/// default client is used instead and the lost timeout is logged.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, ?timeout, "HTTP client build failed; requests will have no timeout");
            reqwest::Client::new()
        })
}

const ERROR_MARKER: &str = "ERROR";

#[derive(Debug, Default)]
struct MockScript {
    responses: HashMap<String, String>,
    fragments: Vec<(String, String)>,
    queue: VecDeque<String>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Lookup order for each prompt:
///
/// 1. queued responses (FIFO), one per call
/// 2. exact prompt matches
/// 3. the first registered fragment contained in the prompt
/// 4. the default response
///
/// A scripted response of `"ERROR"` makes the call fail.
///
/// # Examples
///
/// ```
/// use labwright_llm::MockProvider;
/// use labwright_domain::LlmProvider;
///
/// # tokio_test::block_on(async {
/// let provider = MockProvider::default();
/// provider.respond_when("head", r#"{"selected_component_name": "96-Channel Head"}"#);
/// let out = provider.generate("REQUIREMENT: head").await.unwrap();
/// assert!(out.contains("96-Channel Head"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    delay: Option<Duration>,
    script: Arc<Mutex<MockScript>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            delay: None,
            script: Arc::new(Mutex::new(MockScript::default())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Sleep this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn script(&self) -> MutexGuard<'_, MockScript> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&self, prompt: impl Into<String>, response: impl Into<String>) {
        self.script().responses.insert(prompt.into(), response.into());
    }

    /// Answer any prompt containing `fragment` with `response`
    pub fn respond_when(&self, fragment: impl Into<String>, response: impl Into<String>) {
        self.script().fragments.push((fragment.into(), response.into()));
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: impl Into<String>) {
        self.script().queue.push_back(response.into());
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&self, prompt: impl Into<String>) {
        self.add_response(prompt, ERROR_MARKER);
    }

    /// Fail any prompt containing `fragment`
    pub fn fail_when(&self, fragment: impl Into<String>) {
        self.respond_when(fragment, ERROR_MARKER);
    }

    /// Queue a failure for the next unanswered call
    pub fn push_error(&self) {
        self.push_response(ERROR_MARKER);
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner()) = 0;
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.script().prompts.clone()
    }

    fn answer(&self, prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;

        let mut script = self.script();
        script.prompts.push(prompt.to_string());

        let response = script
            .queue
            .pop_front()
            .or_else(|| script.responses.get(prompt).cloned())
            .or_else(|| {
                script
                    .fragments
                    .iter()
                    .find(|(fragment, _)| prompt.contains(fragment.as_str()))
                    .map(|(_, response)| response.clone())
            })
            .unwrap_or_else(|| self.default_response.clone());

        if response == ERROR_MARKER {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        // Counted on arrival so timed-out calls still show up
        let result = self.answer(prompt);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn generate_structured(&self, prompt: &str, _schema: &str) -> Result<String, Self::Error> {
        self.generate(prompt).await
    }
}
