//! In-memory catalog of items

use crate::error::CatalogError;
use crate::item::item_key;
use crate::{CatalogItem, Category};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A structural problem found by [`Catalog::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    /// A slot names a candidate that is not in the catalog
    DanglingCandidate {
        /// Requiring item
        item: String,
        /// Slot role
        slot: String,
        /// Missing candidate name
        candidate: String,
    },

    /// A slot requires zero units
    ZeroQuantity {
        /// Requiring item
        item: String,
        /// Slot role
        slot: String,
    },

    /// Two slots on one item share a role
    DuplicateSlot {
        /// Requiring item
        item: String,
        /// Repeated role
        slot: String,
    },
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogIssue::DanglingCandidate { item, slot, candidate } => write!(
                f,
                "'{}' slot '{}' references unknown item '{}'",
                item, slot, candidate
            ),
            CatalogIssue::ZeroQuantity { item, slot } => {
                write!(f, "'{}' slot '{}' has quantity 0", item, slot)
            }
            CatalogIssue::DuplicateSlot { item, slot } => {
                write!(f, "'{}' declares slot '{}' more than once", item, slot)
            }
        }
    }
}

/// All known items, in insertion order, indexed by case-insensitive name
///
/// The catalog itself is a plain value: sharing and the
/// no-edits-during-resolution rule are handled by the store that owns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, rejecting duplicate or empty names
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for item in items {
            let key = item.key();
            if key.is_empty() {
                return Err(CatalogError::InvalidItem("item name cannot be empty".to_string()));
            }
            if catalog.index.contains_key(&key) {
                return Err(CatalogError::Duplicate(item.name));
            }
            catalog.index.insert(key, catalog.items.len());
            catalog.items.push(item);
        }
        Ok(catalog)
    }

    /// Look up an item by name (case-insensitive)
    pub fn get(&self, name: &str) -> Result<&CatalogItem, CatalogError> {
        self.index
            .get(&item_key(name))
            .map(|&idx| &self.items[idx])
            .ok_or_else(|| CatalogError::NotFound(name.trim().to_string()))
    }

    /// Check whether an item exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&item_key(name))
    }

    /// All items of a category, in catalog order
    pub fn list_by_category(&self, category: &Category) -> Vec<&CatalogItem> {
        self.items
            .iter()
            .filter(|item| item.category.matches(category))
            .collect()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&Category> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| &item.category)
            .filter(|cat| seen.insert(cat.as_str().to_lowercase()))
            .collect()
    }

    /// Items whose name contains the query (case-insensitive)
    pub fn search(&self, query: &str) -> Vec<&CatalogItem> {
        let needle = item_key(query);
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|item| item.key().contains(&needle))
            .collect()
    }

    /// Add an item or replace the one with the same name
    ///
    /// Returns the replaced item, if any.
    pub fn upsert(&mut self, item: CatalogItem) -> Result<Option<CatalogItem>, CatalogError> {
        let key = item.key();
        if key.is_empty() {
            return Err(CatalogError::InvalidItem("item name cannot be empty".to_string()));
        }
        match self.index.get(&key) {
            Some(&idx) => Ok(Some(std::mem::replace(&mut self.items[idx], item))),
            None => {
                self.index.insert(key, self.items.len());
                self.items.push(item);
                Ok(None)
            }
        }
    }

    /// Remove an item by name
    pub fn remove(&mut self, name: &str) -> Result<CatalogItem, CatalogError> {
        let idx = self
            .index
            .remove(&item_key(name))
            .ok_or_else(|| CatalogError::NotFound(name.trim().to_string()))?;
        let removed = self.items.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    /// All items in insertion order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the catalog has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Report structural problems without modifying the catalog
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for item in &self.items {
            let mut roles = HashSet::new();
            for slot in &item.slots {
                if !roles.insert(slot.role.trim().to_lowercase()) {
                    issues.push(CatalogIssue::DuplicateSlot {
                        item: item.name.clone(),
                        slot: slot.role.clone(),
                    });
                }
                if slot.quantity == 0 {
                    issues.push(CatalogIssue::ZeroQuantity {
                        item: item.name.clone(),
                        slot: slot.role.clone(),
                    });
                }
                for candidate in &slot.candidates {
                    if !self.contains(candidate) {
                        issues.push(CatalogIssue::DanglingCandidate {
                            item: item.name.clone(),
                            slot: slot.role.clone(),
                            candidate: candidate.clone(),
                        });
                    }
                }
            }
        }
        issues
    }
}
