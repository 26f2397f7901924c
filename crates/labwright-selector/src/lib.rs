//! Labwright Selection Client
//!
//! Asks an external LLM to choose exactly one candidate for a requirement
//! slot, and refuses any answer that is not one of the offered candidates.
//!
//! # Architecture
//!
//! ```text
//! SelectionContext → PromptBuilder → LLM (timeout, retries) → parse → Decision
//! ```
//!
//! # Key Features
//!
//! - **Strict answers**: the returned name must match an offered candidate
//!   (trimmed, case-insensitive); anything else is `NotOffered`
//! - **Bounded calls**: per-attempt timeout, limited retries with exponential
//!   backoff
//! - **Context**: intent text plus the decisions already made on the path
//!
//! # Example Usage
//!
//! ```no_run
//! use labwright_selector::{SelectionClient, SelectorConfig};
//! use labwright_domain::{SelectionContext, Selector};
//! use labwright_llm::MockProvider;
//!
//! # async fn example(context: SelectionContext) -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"selected_component_name": "96-Channel Head", "reasoning": "fast"}"#);
//! let client = SelectionClient::new(llm, SelectorConfig::default());
//!
//! let decision = client.select(&context).await?;
//! println!("{}: {}", decision.candidate, decision.rationale);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod offline;
mod parser;
mod prompt;

#[cfg(test)]
mod tests;

pub use client::SelectionClient;
pub use config::SelectorConfig;
pub use offline::FirstCandidateSelector;
pub use parser::parse_decision;
pub use prompt::{PromptBuilder, SELECTION_SCHEMA};
