//! Runtime provider selection

use crate::{gemini, ollama, GeminiProvider, LlmError, MockProvider, OllamaProvider};
use async_trait::async_trait;
use labwright_domain::LlmProvider as LlmProviderTrait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Which backend answers selection prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// No network; deterministic offline behavior
    #[default]
    Mock,
    /// Local Ollama server
    Ollama,
    /// Google Gemini
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::Mock => "mock",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Gemini => "gemini",
        })
    }
}

/// Provider settings as read from the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Backend kind
    pub kind: ProviderKind,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Model override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable that holds the Gemini API key
    pub api_key_env: String,

    /// HTTP timeout for a single request
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Mock,
            endpoint: None,
            model: None,
            api_key_env: gemini::DEFAULT_API_KEY_ENV.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Model name after applying the per-kind default
    pub fn model_name(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model,
            (None, ProviderKind::Ollama) => ollama::DEFAULT_MODEL,
            (None, ProviderKind::Gemini) => gemini::DEFAULT_MODEL,
            (None, ProviderKind::Mock) => "mock",
        }
    }
}

/// A provider chosen at runtime from [`ProviderConfig`]
pub enum ConfiguredProvider {
    /// Scripted mock
    Mock(MockProvider),
    /// Local Ollama
    Ollama(OllamaProvider),
    /// Google Gemini
    Gemini(GeminiProvider),
}

impl ConfiguredProvider {
    /// Build the provider described by `config`
    ///
    /// Fails if Gemini is selected and its API key variable is unset.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
        let model = config.model_name().to_string();

        let provider = match config.kind {
            ProviderKind::Mock => ConfiguredProvider::Mock(MockProvider::default()),
            ProviderKind::Ollama => ConfiguredProvider::Ollama(OllamaProvider::with_timeout(
                config.endpoint.as_deref().unwrap_or(ollama::DEFAULT_ENDPOINT),
                model,
                timeout,
            )),
            ProviderKind::Gemini => {
                let api_key = std::env::var(&config.api_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
                ConfiguredProvider::Gemini(GeminiProvider::with_endpoint(
                    config.endpoint.as_deref().unwrap_or(gemini::DEFAULT_ENDPOINT),
                    api_key,
                    model,
                    timeout,
                ))
            }
        };

        tracing::debug!(kind = %config.kind, model = config.model_name(), "Configured LLM provider");
        Ok(provider)
    }

    /// Backend kind
    pub fn kind(&self) -> ProviderKind {
        match self {
            ConfiguredProvider::Mock(_) => ProviderKind::Mock,
            ConfiguredProvider::Ollama(_) => ProviderKind::Ollama,
            ConfiguredProvider::Gemini(_) => ProviderKind::Gemini,
        }
    }
}

#[async_trait]
impl LlmProviderTrait for ConfiguredProvider {
    type Error = LlmError;

    async fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        match self {
            ConfiguredProvider::Mock(p) => p.generate(prompt).await,
            ConfiguredProvider::Ollama(p) => p.generate(prompt).await,
            ConfiguredProvider::Gemini(p) => p.generate(prompt).await,
        }
    }

    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error> {
        match self {
            ConfiguredProvider::Mock(p) => p.generate_structured(prompt, schema).await,
            ConfiguredProvider::Ollama(p) => p.generate_structured(prompt, schema).await,
            ConfiguredProvider::Gemini(p) => p.generate_structured(prompt, schema).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_offline() {
        let config = ProviderConfig::default();
        assert_eq!(config.kind, ProviderKind::Mock);
        assert_eq!(config.api_key_env, "GEMINI_API_KEY");
        let provider = ConfiguredProvider::from_config(&config).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Mock);
    }

    #[test]
    fn test_model_defaults_per_kind() {
        let mut config = ProviderConfig {
            kind: ProviderKind::Ollama,
            ..Default::default()
        };
        assert_eq!(config.model_name(), ollama::DEFAULT_MODEL);

        config.kind = ProviderKind::Gemini;
        assert_eq!(config.model_name(), gemini::DEFAULT_MODEL);

        config.model = Some("custom".to_string());
        assert_eq!(config.model_name(), "custom");
    }

    #[test]
    fn test_gemini_without_key_fails() {
        let config = ProviderConfig {
            kind: ProviderKind::Gemini,
            api_key_env: "LABWRIGHT_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ConfiguredProvider::from_config(&config),
            Err(LlmError::MissingApiKey(_))
        ));
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let config: ProviderConfig = serde_json::from_str(r#"{"kind": "ollama"}"#).unwrap();
        assert_eq!(config.kind, ProviderKind::Ollama);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_mock_variant_delegates() {
        let provider = ConfiguredProvider::Mock(MockProvider::new("hi"));
        assert_eq!(provider.generate("x").await.unwrap(), "hi");
    }
}
