//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use labwright_llm::ProviderConfig;
use labwright_resolver::ResolverConfig;
use labwright_selector::SelectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog document location
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// Selection model backend
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Selection protocol settings
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Traversal settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Log filter used when RUST_LOG is unset and no -v is given
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Indented tree format
    Tree,
}

impl Config {
    /// Directory holding the default config file and catalog.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".labwright"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check the nested selector and resolver settings.
    pub fn validate(&self) -> Result<()> {
        self.selector
            .validate()
            .map_err(|e| CliError::Config(format!("[selector] {}", e)))?;
        self.resolver
            .validate()
            .map_err(|e| CliError::Config(format!("[resolver] {}", e)))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            provider: ProviderConfig::default(),
            selector: SelectorConfig::default(),
            resolver: ResolverConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            log_level: default_log_level(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    Config::home()
        .map(|home| home.join("catalog.json"))
        .unwrap_or_else(|_| PathBuf::from("catalog.json"))
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_log_level() -> String {
    "warn".to_string()
}
