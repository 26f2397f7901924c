//! Catalog items and their requirement slots

use crate::{Attributes, Category};

/// Normalize a name into its case-insensitive lookup key
pub fn item_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A "needs one of {candidates} to fulfil role R" relation on an item
///
/// Candidates are named explicitly, or implied by `category` (every item of
/// that category qualifies, after the named ones). A slot with neither is a
/// leaf declaration and needs no resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementSlot {
    /// Role this slot fills on the requiring item ("head", "pump", ...)
    pub role: String,

    /// How many units of the chosen candidate one requiring item needs
    pub quantity: u32,

    /// Candidate item names in declared order
    pub candidates: Vec<String>,

    /// Category whose members are all acceptable candidates
    pub category: Option<Category>,
}

impl RequirementSlot {
    /// Create a slot with named candidates and quantity 1
    pub fn new<I, S>(role: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            role: role.into(),
            quantity: 1,
            candidates: candidates.into_iter().map(Into::into).collect(),
            category: None,
        }
    }

    /// Create a slot satisfied by any item of a category
    pub fn of_category(role: impl Into<String>, category: Category) -> Self {
        Self {
            role: role.into(),
            quantity: 1,
            candidates: Vec::new(),
            category: Some(category),
        }
    }

    /// Also accept every member of `category`, after the named candidates
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Set the required quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// True if this slot declares no candidates at all
    pub fn is_leaf_declaration(&self) -> bool {
        self.candidates.is_empty() && self.category.is_none()
    }

    /// Case-insensitive role comparison
    pub fn has_role(&self, role: &str) -> bool {
        self.role.trim().eq_ignore_ascii_case(role.trim())
    }
}

/// An item in the lab catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Unique name (case-insensitive identity)
    pub name: String,

    /// Hierarchy level
    pub category: Category,

    /// Opaque metadata used as selection context
    pub attributes: Attributes,

    /// Requirement slots in declared order
    pub slots: Vec<RequirementSlot>,

    /// Manufacturer documentation the slots may have been derived from
    pub doc_text: Option<String>,
}

impl CatalogItem {
    /// Create an item with no attributes and no requirements
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            attributes: Attributes::new(),
            slots: Vec::new(),
            doc_text: None,
        }
    }

    /// Add a requirement slot
    pub fn with_slot(mut self, slot: RequirementSlot) -> Self {
        self.slots.push(slot);
        self
    }

    /// Replace the attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach documentation text
    pub fn with_doc_text(mut self, doc_text: impl Into<String>) -> Self {
        self.doc_text = Some(doc_text.into());
        self
    }

    /// Lookup key for this item
    pub fn key(&self) -> String {
        item_key(&self.name)
    }

    /// Find a slot by role
    pub fn slot(&self, role: &str) -> Option<&RequirementSlot> {
        self.slots.iter().find(|s| s.has_role(role))
    }

    /// Slots that need resolution (everything but leaf declarations)
    pub fn resolvable_slots(&self) -> impl Iterator<Item = &RequirementSlot> {
        self.slots.iter().filter(|s| !s.is_leaf_declaration())
    }

    /// True if resolving this item requires no selection at all
    pub fn is_leaf(&self) -> bool {
        self.resolvable_slots().next().is_none()
    }
}
