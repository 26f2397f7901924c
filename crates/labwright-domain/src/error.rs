//! Domain error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised by catalog lookups and edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No item with this name
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Another item already uses this name
    #[error("Duplicate item name: {0}")]
    Duplicate(String),

    /// Item failed basic validation
    #[error("Invalid item: {0}")]
    InvalidItem(String),
}

/// Errors raised by the selection protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Response could not be parsed into a decision
    #[error("Malformed selection response: {0}")]
    Malformed(String),

    /// Response named a candidate that was not offered
    #[error("Selected '{returned}' is not one of the offered candidates {offered:?}")]
    NotOffered {
        /// Name the capability returned
        returned: String,
        /// Names that were offered
        offered: Vec<String>,
    },

    /// The capability itself failed (network, API, ...)
    #[error("Selection provider error: {0}")]
    Provider(String),

    /// No response within the bounded interval
    #[error("Selection timed out after {0:?}")]
    Timeout(Duration),

    /// Nothing to choose from
    #[error("No candidates offered")]
    NoCandidates,
}

impl SelectionError {
    /// True for the protocol timeout variant
    pub fn is_timeout(&self) -> bool {
        matches!(self, SelectionError::Timeout(_))
    }

    /// True if another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SelectionError::NoCandidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_offered_message_lists_candidates() {
        let err = SelectionError::NotOffered {
            returned: "Quantum Head".to_string(),
            offered: vec!["96-Channel Head".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Quantum Head"));
        assert!(msg.contains("96-Channel Head"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SelectionError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(SelectionError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(SelectionError::Malformed("x".into()).is_retryable());
        assert!(!SelectionError::NoCandidates.is_retryable());
    }
}
