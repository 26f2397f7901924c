//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the resolution core and its
//! collaborators. Implementations live in other crates.

use crate::{Catalog, Decision, SelectionContext, SelectionError};
use async_trait::async_trait;

/// Persistence collaborator for the full catalog
///
/// Implemented by the infrastructure layer (labwright-store)
pub trait CatalogSource {
    /// Error type for load/save operations
    type Error;

    /// Read the whole catalog
    fn load(&self) -> Result<Catalog, Self::Error>;

    /// Write the whole catalog; a later `load` must yield an equal catalog
    fn save(&self, catalog: &Catalog) -> Result<(), Self::Error>;
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (labwright-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::fmt::Display + Send;

    /// Generate text completion
    async fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Generate output constrained to JSON matching `schema` (if supported)
    async fn generate_structured(&self, prompt: &str, schema: &str) -> Result<String, Self::Error>;
}

/// The external selection capability as seen by the resolver
///
/// Implemented by the application layer (labwright-selector). A returned
/// decision must name one of the offered candidates.
#[async_trait]
pub trait Selector: Send + Sync {
    /// Choose exactly one candidate for the slot described by `context`
    async fn select(&self, context: &SelectionContext) -> Result<Decision, SelectionError>;
}

#[async_trait]
impl<T: Selector + ?Sized> Selector for std::sync::Arc<T> {
    async fn select(&self, context: &SelectionContext) -> Result<Decision, SelectionError> {
        (**self).select(context).await
    }
}
