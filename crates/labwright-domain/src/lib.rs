//! Labwright Domain Layer
//!
//! This crate contains the core domain model for Labwright: the lab catalog,
//! requirement slots, and the request/response shapes of the selection
//! protocol. It holds no I/O and defines the trait interfaces that all other
//! layers depend upon.
//!
//! ## Key Concepts
//!
//! - **Catalog item**: a System, Module, Component, Part or Raw Material
//! - **Requirement slot**: "needs one of {candidates} to fulfil role R"
//! - **Selection context / Decision**: what the external selection capability
//!   sees for one slot and what it answers
//! - **Provenance path**: the root-to-node chain of slot choices
//!
//! ## Architecture
//!
//! - Pure data and lookups only
//! - Persistence, LLM access and traversal live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attributes;
pub mod catalog;
pub mod category;
pub mod error;
pub mod item;
pub mod provenance;
pub mod run;
pub mod selection;
pub mod traits;

// Re-exports for convenience
pub use attributes::Attributes;
pub use catalog::{Catalog, CatalogIssue};
pub use category::Category;
pub use error::{CatalogError, SelectionError};
pub use item::{item_key, CatalogItem, RequirementSlot};
pub use provenance::{ProvenancePath, ProvenanceStep};
pub use run::RunId;
pub use selection::{AncestorDecision, CandidateView, Decision, MemoKey, SelectionContext};
pub use traits::{CatalogSource, LlmProvider, Selector};
