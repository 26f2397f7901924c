//! Category module - the level of an item in the catalog hierarchy

use std::fmt;

/// Category of a catalog item
///
/// Items form a loose hierarchy from whole systems down to raw materials:
/// - System: a complete deliverable (e.g. a liquid handler)
/// - Module: a major sub-assembly
/// - Component: a replaceable functional unit
/// - Part: an individual manufactured part
/// - RawMaterial: a leaf material (ceramic, steel, ...)
///
/// Catalogs may use categories outside this list; those are kept verbatim
/// in `Other`. Comparison between categories is case-insensitive.
#[derive(Debug, Clone, Eq)]
pub enum Category {
    /// Complete system
    System,

    /// Major sub-assembly
    Module,

    /// Functional unit
    Component,

    /// Individual part
    Part,

    /// Leaf material
    RawMaterial,

    /// Any other catalog-defined category
    Other(String),
}

impl Category {
    /// Get the canonical category name
    pub fn as_str(&self) -> &str {
        match self {
            Category::System => "System",
            Category::Module => "Module",
            Category::Component => "Component",
            Category::Part => "Part",
            Category::RawMaterial => "RawMaterial",
            Category::Other(name) => name,
        }
    }

    /// Parse a category name
    ///
    /// Well-known names are matched case-insensitively and ignoring spaces,
    /// underscores and dashes, so "Raw Material", "raw_material" and
    /// "RawMaterial" all parse to `RawMaterial`. Anything else is kept as
    /// `Other` with surrounding whitespace trimmed.
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "system" => Category::System,
            "module" => Category::Module,
            "component" => Category::Component,
            "part" => Category::Part,
            "rawmaterial" => Category::RawMaterial,
            _ => Category::Other(s.trim().to_string()),
        }
    }

    /// Depth of this category in the System → RawMaterial hierarchy
    ///
    /// Returns `None` for catalog-defined categories.
    pub fn level(&self) -> Option<u8> {
        match self {
            Category::System => Some(0),
            Category::Module => Some(1),
            Category::Component => Some(2),
            Category::Part => Some(3),
            Category::RawMaterial => Some(4),
            Category::Other(_) => None,
        }
    }

    /// Check whether this category matches another, ignoring case
    pub fn matches(&self, other: &Category) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl std::hash::Hash for Category {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_str().to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Category cannot be empty".to_string());
        }
        Ok(Self::parse(s))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: parsing the display form yields an equal category
        #[test]
        fn test_display_parse_roundtrip(name in "[A-Za-z][A-Za-z ]{0,20}") {
            let cat = Category::parse(&name);
            prop_assert_eq!(Category::parse(&cat.to_string()), cat);
        }

        /// Property: equality is insensitive to letter case
        #[test]
        fn test_case_insensitive_equality(name in "[A-Za-z]{1,20}") {
            prop_assert_eq!(
                Category::parse(&name.to_uppercase()),
                Category::parse(&name.to_lowercase())
            );
        }
    }
}
