//! On-disk catalog document schema
//!
//! The document is an ordered JSON array of item records:
//!
//! ```json
//! [
//!   {
//!     "name": "LiquidHandler",
//!     "category": "System",
//!     "attributes": { "cost": "high" },
//!     "slots": [
//!       { "role": "head", "quantity": 1, "candidates": ["96-Channel Head", "8-Channel Head"] }
//!     ]
//!   }
//! ]
//! ```
//!
//! Records without `slots` but with `doc_text` come from older inventories;
//! their slots are derived from the documentation once every record is
//! known, so forward references resolve.

use crate::docs::slots_from_doc;
use crate::LoadError;
use labwright_domain::{Attributes, Catalog, CatalogItem, Category, RequirementSlot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One item as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    /// Unique item name
    pub name: String,

    /// Category name
    pub category: String,

    /// Flat attribute object
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Explicit requirement slots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SlotRecord>>,

    /// Manufacturer documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_text: Option<String>,
}

/// One requirement slot as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    /// Role filled by the slot
    pub role: String,

    /// Units required
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Candidate item names in declared order
    #[serde(default)]
    pub candidates: Vec<String>,

    /// Category whose members are all candidates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl ItemRecord {
    /// Snapshot a catalog item into its record form
    ///
    /// Slots are always written out explicitly so a reload never re-derives
    /// them from documentation.
    pub fn from_item(item: &CatalogItem) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.to_string(),
            attributes: item.attributes.to_map(),
            slots: Some(item.slots.iter().map(SlotRecord::from_slot).collect()),
            doc_text: item.doc_text.clone(),
        }
    }

    fn to_item(&self) -> CatalogItem {
        CatalogItem {
            name: self.name.trim().to_string(),
            category: Category::parse(&self.category),
            attributes: Attributes::from_map(self.attributes.clone()),
            slots: self
                .slots
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(SlotRecord::to_slot)
                .collect(),
            doc_text: self.doc_text.clone(),
        }
    }

    fn needs_doc_slots(&self) -> bool {
        self.slots.is_none() && self.doc_text.is_some()
    }
}

impl SlotRecord {
    fn from_slot(slot: &RequirementSlot) -> Self {
        Self {
            role: slot.role.clone(),
            quantity: slot.quantity,
            candidates: slot.candidates.clone(),
            category: slot.category.as_ref().map(|c| c.to_string()),
        }
    }

    fn to_slot(&self) -> RequirementSlot {
        RequirementSlot {
            role: self.role.clone(),
            quantity: self.quantity,
            candidates: self.candidates.clone(),
            category: self.category.as_deref().map(Category::parse),
        }
    }
}

/// Build a catalog from records, deriving legacy slots in a second pass
pub fn records_to_catalog(records: &[ItemRecord]) -> Result<Catalog, LoadError> {
    let mut catalog = Catalog::from_items(records.iter().map(ItemRecord::to_item))?;

    let derived: Vec<CatalogItem> = records
        .iter()
        .filter(|record| record.needs_doc_slots())
        .filter_map(|record| {
            let doc = record.doc_text.as_deref()?;
            let mut item = record.to_item();
            item.slots = slots_from_doc(doc, &catalog);
            Some(item)
        })
        .collect();

    for item in derived {
        catalog.upsert(item)?;
    }

    Ok(catalog)
}

/// Records for every item, in catalog order
pub fn catalog_to_records(catalog: &Catalog) -> Vec<ItemRecord> {
    catalog.items().iter().map(ItemRecord::from_item).collect()
}
