//! Configuration for the resolver

use serde::{Deserialize, Serialize};

/// Configuration for a Resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Deepest slot level resolved below the root
    pub max_depth: usize,

    /// Reuse decisions for identical requests within one run
    pub memoize: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            memoize: true,
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("max_depth must be greater than 0".to_string());
        }
        Ok(())
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
