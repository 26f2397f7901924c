//! Error types for graph queries and resolution runs

use labwright_domain::RunId;
use thiserror::Error;

/// Errors raised by dependency graph queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No item with this name
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// The item exists but declares no such slot
    #[error("Item '{item}' has no requirement slot '{slot}'")]
    UnknownSlot {
        /// Requiring item
        item: String,
        /// Requested role
        slot: String,
    },
}

/// Errors that abort a whole resolution run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The requested root is not in the catalog
    #[error("Unknown item '{name}'{}", did_you_mean(.suggestions))]
    UnknownRoot {
        /// Requested name
        name: String,
        /// Similarly named catalog items
        suggestions: Vec<String>,
    },

    /// The run's cancellation token fired
    #[error("Resolution run {0} was cancelled")]
    Cancelled(RunId),

    /// Resolver configuration is invalid
    #[error("Invalid resolver configuration: {0}")]
    Config(String),
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!("; did you mean: {}?", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_root_message() {
        let err = ResolveError::UnknownRoot {
            name: "Handler".to_string(),
            suggestions: vec!["LiquidHandler".to_string(), "Handler Arm".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown item 'Handler'; did you mean: LiquidHandler, Handler Arm?"
        );

        let bare = ResolveError::UnknownRoot {
            name: "Zzz".to_string(),
            suggestions: Vec::new(),
        };
        assert_eq!(bare.to_string(), "Unknown item 'Zzz'");
    }
}
