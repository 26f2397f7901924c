//! Labwright Resolver
//!
//! Turns a root catalog item and a design intent into a fully resolved
//! configuration: every requirement slot on the way down is filled by asking
//! a [`Selector`](labwright_domain::Selector) to choose among the slot's
//! candidates, and the result is aggregated into a bill of materials.
//!
//! # Architecture
//!
//! ```text
//! Catalog ─▶ DependencyGraph ─▶ Resolver ──select──▶ Selector
//!                                  │
//!                                  ▼
//!                           ResolutionTree ─▶ BomAssembler ─▶ Bom
//! ```
//!
//! # Key Features
//!
//! - **One question per slot**: the selector sees exactly the offered
//!   candidates, the intent, and the decisions already made on the path
//! - **Gaps, not aborts**: cycles, empty slots, unknown items, refused or
//!   timed-out selections fail their branch and show up in the BOM
//! - **Concurrent runs**: the graph is read-only and shared; each run owns
//!   its tree, memo and cancellation token
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use labwright_domain::Catalog;
//! use labwright_resolver::{DependencyGraph, ResolutionRequest, Resolver, ResolverConfig};
//! use labwright_selector::FirstCandidateSelector;
//!
//! # async fn example(catalog: Catalog) -> Result<(), Box<dyn std::error::Error>> {
//! let graph = Arc::new(DependencyGraph::build(Arc::new(catalog)));
//! let resolver = Resolver::new(graph, FirstCandidateSelector, ResolverConfig::default());
//!
//! let outcome = resolver
//!     .resolve(&ResolutionRequest::new("LiquidHandler", "high throughput"))
//!     .await?;
//! for line in outcome.bom().lines {
//!     println!("{} x{}", line.item, line.quantity);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod bom;
mod config;
mod error;
mod graph;
mod resolver;
mod tree;

pub use bom::{Bom, BomAssembler, BomLine, LineStatus};
pub use config::ResolverConfig;
pub use error::{GraphError, ResolveError};
pub use graph::{DependencyGraph, GraphWarning, HierarchyMark, HierarchyNode, HierarchySlot};
pub use resolver::{ResolutionOutcome, ResolutionRequest, Resolver, RunStats};
pub use tree::{FailureKind, NodeId, NodeState, ResolutionNode, ResolutionTree};
