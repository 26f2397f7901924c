//! Requirement extraction from manufacturer documentation
//!
//! Vendor datasheets state dependencies in a handful of stock phrasings:
//!
//! ```text
//! Requires: [Power Supply, Cooling Unit]
//! Dependencies: 24V Controller, Ceramic Piston Array.
//! Must be connected to: Waste Pump.
//! ```
//!
//! Each named requirement becomes one requirement slot.

use labwright_domain::{Catalog, Category, RequirementSlot};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static REQUIREMENT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)Requires:\s*\[(.*?)\]",
        r"(?i)Dependencies:\s*(.*?)(?:\.|$)",
        r"(?i)Must be connected to:\s*(.*?)(?:\.|$)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("requirement pattern is a valid regex"))
    .collect()
});

/// Extract requirement names from documentation text
///
/// Names are trimmed, deduplicated case-insensitively, and returned in the
/// order they were first found (patterns are scanned in the order above).
pub fn parse_requirements(doc_text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for pattern in REQUIREMENT_PATTERNS.iter() {
        for captures in pattern.captures_iter(doc_text) {
            let Some(list) = captures.get(1) else {
                continue;
            };
            for name in list.as_str().split(',') {
                let name = name.trim();
                if !name.is_empty() && seen.insert(name.to_lowercase()) {
                    found.push(name.to_string());
                }
            }
        }
    }

    found
}

/// Turn documentation into requirement slots against a catalog
///
/// A requirement naming an existing item becomes a slot with that single
/// candidate; anything else is treated as a category, so every item of that
/// category is a candidate at resolution time.
pub fn slots_from_doc(doc_text: &str, catalog: &Catalog) -> Vec<RequirementSlot> {
    parse_requirements(doc_text)
        .into_iter()
        .map(|requirement| match catalog.get(&requirement) {
            Ok(item) => RequirementSlot::new(requirement.clone(), [item.name.clone()]),
            Err(_) => RequirementSlot::of_category(requirement.clone(), Category::parse(&requirement)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::CatalogItem;

    #[test]
    fn test_requires_list() {
        let doc = "Description: High speed unit.\nRequires: [Power Supply, Cooling Unit]\n";
        assert_eq!(parse_requirements(doc), vec!["Power Supply", "Cooling Unit"]);
    }

    #[test]
    fn test_dependencies_stop_at_period() {
        let doc = "Dependencies: 24V Controller, Piston Array. Weight: 2kg.";
        assert_eq!(parse_requirements(doc), vec!["24V Controller", "Piston Array"]);
    }

    #[test]
    fn test_connected_to_at_end_of_text() {
        let doc = "Notes: quiet.\nMust be connected to: Waste Pump";
        assert_eq!(parse_requirements(doc), vec!["Waste Pump"]);
    }

    #[test]
    fn test_patterns_are_case_insensitive_and_deduplicated() {
        let doc = "requires: [Pump, Valve]\nDEPENDENCIES: pump, Filter.";
        assert_eq!(parse_requirements(doc), vec!["Pump", "Valve", "Filter"]);
    }

    #[test]
    fn test_no_requirements() {
        assert!(parse_requirements("A plain steel rod.").is_empty());
        assert!(parse_requirements("Requires: []").is_empty());
    }

    #[test]
    fn test_slots_prefer_exact_item_over_category() {
        let catalog = Catalog::from_items([
            CatalogItem::new("Cooling Unit", Category::Module),
            CatalogItem::new("PSU-24", Category::parse("Power Supply")),
        ])
        .unwrap();

        let slots = slots_from_doc("Requires: [Power Supply, cooling unit]", &catalog);
        assert_eq!(slots.len(), 2);

        assert_eq!(slots[0].role, "Power Supply");
        assert!(slots[0].candidates.is_empty());
        assert_eq!(slots[0].category, Some(Category::parse("Power Supply")));

        assert_eq!(slots[1].role, "cooling unit");
        assert_eq!(slots[1].candidates, vec!["Cooling Unit".to_string()]);
        assert_eq!(slots[1].category, None);
    }
}
