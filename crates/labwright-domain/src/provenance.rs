//! Provenance tracking: why an item ended up in a bill of materials

use serde::Serialize;
use std::fmt;

/// One hop down a resolution path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProvenanceStep {
    /// Slot role filled at this hop
    pub slot: String,

    /// Item chosen for the slot, if selection got that far
    pub item: Option<String>,
}

/// The root-to-node chain of slot choices that explains a BOM entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProvenancePath {
    /// Requested root item
    pub root: String,

    /// Slot choices from the root downwards
    pub steps: Vec<ProvenanceStep>,
}

impl ProvenancePath {
    /// Path consisting of the root alone
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            steps: Vec::new(),
        }
    }

    /// Extend the path by one slot choice
    pub fn child(&self, slot: impl Into<String>, item: Option<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(ProvenanceStep {
            slot: slot.into(),
            item,
        });
        Self {
            root: self.root.clone(),
            steps,
        }
    }

    /// Number of slot hops below the root
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Slot roles from the root downwards
    pub fn slot_chain(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.slot.as_str()).collect()
    }
}

impl fmt::Display for ProvenancePath {
    /// Renders as `Root→slot→slot`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for step in &self.steps {
            write!(f, "→{}", step.slot)?;
        }
        Ok(())
    }
}
