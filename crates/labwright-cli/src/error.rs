//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog store error
    #[error(transparent)]
    Store(#[from] labwright_store::StoreError),

    /// Catalog query error
    #[error(transparent)]
    Catalog(#[from] labwright_domain::CatalogError),

    /// Graph query error
    #[error(transparent)]
    Graph(#[from] labwright_resolver::GraphError),

    /// Resolution run error
    #[error(transparent)]
    Resolve(#[from] labwright_resolver::ResolveError),

    /// Provider setup error
    #[error("LLM provider error: {0}")]
    Llm(#[from] labwright_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
