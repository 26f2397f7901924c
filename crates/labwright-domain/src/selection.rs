//! Request and response shapes of the selection protocol

use crate::item::item_key;
use crate::{Attributes, CatalogItem, Category};
use serde::Serialize;

/// A candidate as presented to the selection capability
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateView {
    /// Candidate item name
    pub name: String,

    /// Candidate category
    pub category: Category,

    /// Candidate metadata, forwarded as-is
    pub attributes: Attributes,
}

impl CandidateView {
    /// Project a catalog item into the view offered for selection
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            attributes: item.attributes.clone(),
        }
    }
}

/// A decision taken higher up the active resolution path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncestorDecision {
    /// Item whose slot was resolved
    pub item: String,

    /// Slot role
    pub slot: String,

    /// Candidate that was chosen
    pub chosen: String,

    /// Why it was chosen
    pub rationale: String,
}

/// Everything the selection capability gets to see for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionContext {
    /// Name of the requiring item
    pub item: String,

    /// Slot role being filled
    pub slot: String,

    /// Units of the chosen candidate needed per requiring item
    pub quantity: u32,

    /// Offered candidates in declared order
    pub candidates: Vec<CandidateView>,

    /// User's free-text design intent
    pub intent: String,

    /// Decisions on the path from the root down to `item`
    pub ancestors: Vec<AncestorDecision>,
}

/// Identity of a selection request for per-run memoization
///
/// Ancestor decisions are not part of the key: the same
/// requirement recurring under different parents reuses one decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoKey {
    item: String,
    slot: String,
    candidates: Vec<String>,
    intent: String,
}

impl SelectionContext {
    /// Offered candidate names in declared order
    pub fn candidate_names(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.name.clone()).collect()
    }

    /// Match a returned name against the offered candidates
    ///
    /// Catalog identity is case-insensitive, so the comparison trims and
    /// ignores case; the canonical offered candidate is returned.
    pub fn find_candidate(&self, name: &str) -> Option<&CandidateView> {
        let key = item_key(name);
        self.candidates.iter().find(|c| item_key(&c.name) == key)
    }

    /// Key identifying identical requests within one run
    pub fn memo_key(&self) -> MemoKey {
        MemoKey {
            item: item_key(&self.item),
            slot: self.slot.trim().to_lowercase(),
            candidates: self.candidates.iter().map(|c| item_key(&c.name)).collect(),
            intent: self.intent.trim().to_string(),
        }
    }
}

/// The selection capability's answer for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Chosen candidate, always one of the offered names
    pub candidate: String,

    /// Human-readable justification
    pub rationale: String,
}

impl Decision {
    /// Create a decision
    pub fn new(candidate: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            rationale: rationale.into(),
        }
    }
}
