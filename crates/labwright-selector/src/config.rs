//! Configuration for the selection client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the SelectionClient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Maximum time for a single provider call (milliseconds)
    pub timeout_ms: u64,

    /// Total attempts per selection, including the first
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on every further retry
    pub backoff_base_ms: u64,

    /// Most recent ancestor decisions included in the prompt
    pub max_ancestors_in_prompt: usize,

    /// Decide single-candidate slots locally without calling the provider
    pub shortcut_single_candidate: bool,
}

impl SelectorConfig {
    /// Get the per-attempt timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than 0".to_string());
        }
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }
        if self.max_attempts > 10 {
            return Err("max_attempts cannot exceed 10".to_string());
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_attempts: 3,
            backoff_base_ms: 500,
            max_ancestors_in_prompt: 10,
            shortcut_single_candidate: true,
        }
    }
}

impl SelectorConfig {
    /// Aggressive preset: short timeouts, few retries
    pub fn aggressive() -> Self {
        Self {
            timeout_ms: 10_000,
            max_attempts: 2,
            backoff_base_ms: 200,
            max_ancestors_in_prompt: 5,
            shortcut_single_candidate: true,
        }
    }

    /// Lenient preset: long timeouts and more retries for slow local models
    pub fn lenient() -> Self {
        Self {
            timeout_ms: 120_000,
            max_attempts: 5,
            backoff_base_ms: 1_000,
            max_ancestors_in_prompt: 25,
            shortcut_single_candidate: true,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(SelectorConfig::default().validate().is_ok());
        assert!(SelectorConfig::aggressive().validate().is_ok());
        assert!(SelectorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = SelectorConfig::default();
        config.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = SelectorConfig::default();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let config = SelectorConfig {
            backoff_base_ms: 100,
            ..Default::default()
        };
        assert_eq!(config.backoff(1), Duration::from_millis(100));
        assert_eq!(config.backoff(2), Duration::from_millis(200));
        assert_eq!(config.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_toml_round_trip_and_partial() {
        let config = SelectorConfig::lenient();
        let parsed = SelectorConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);

        let partial = SelectorConfig::from_toml("max_attempts = 1").unwrap();
        assert_eq!(partial.max_attempts, 1);
        assert_eq!(partial.timeout_ms, SelectorConfig::default().timeout_ms);
    }
}
