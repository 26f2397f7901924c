//! Free-form item metadata passed opaquely to the selection capability

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata describing a catalog item
///
/// A small set of well-known keys (`cost`, `speed`, `material`, `notes`) is
/// lifted into typed fields; everything else lives in `extra`. Values are
/// opaque JSON: resolution never interprets them, it only forwards them to
/// the selection capability as context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    /// Relative or absolute cost ("low", 1200, ...)
    pub cost: Option<Value>,

    /// Throughput or speed rating
    pub speed: Option<Value>,

    /// Dominant material ("ceramic", "steel", ...)
    pub material: Option<Value>,

    /// Free-form notes
    pub notes: Option<Value>,

    /// Any other attribute, sorted by key
    pub extra: BTreeMap<String, Value>,
}

/// Keys lifted out of the open map into typed fields
pub const WELL_KNOWN_KEYS: [&str; 4] = ["cost", "speed", "material", "notes"];

impl Attributes {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build attributes from a flat JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut attrs = Self::new();
        for (key, value) in map {
            attrs.insert(key, value);
        }
        attrs
    }

    /// Flatten back into a single JSON object
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (key, value) in self.iter() {
            map.insert(key.to_string(), value.clone());
        }
        map
    }

    /// Set an attribute, routing well-known keys to their typed field
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            "cost" => self.cost = Some(value),
            "speed" => self.speed = Some(value),
            "material" => self.material = Some(value),
            "notes" => self.notes = Some(value),
            _ => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Look up an attribute by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        match key {
            "cost" => self.cost.as_ref(),
            "speed" => self.speed.as_ref(),
            "material" => self.material.as_ref(),
            "notes" => self.notes.as_ref(),
            _ => self.extra.get(key),
        }
    }

    /// Iterate over all attributes, well-known keys first
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let known = [
            ("cost", self.cost.as_ref()),
            ("speed", self.speed.as_ref()),
            ("material", self.material.as_ref()),
            ("notes", self.notes.as_ref()),
        ];
        known
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of attributes set
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_known_keys_are_lifted() {
        let mut attrs = Attributes::new();
        attrs.insert("cost", json!("low"));
        attrs.insert("channels", json!(96));

        assert_eq!(attrs.cost, Some(json!("low")));
        assert_eq!(attrs.extra.get("channels"), Some(&json!(96)));
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_map_round_trip() {
        let value = json!({
            "cost": 1200,
            "material": "ceramic",
            "voltage": "24V",
            "ratings": {"ip": 54}
        });
        let map = value.as_object().unwrap().clone();

        let attrs = Attributes::from_map(map.clone());
        assert_eq!(attrs.to_map(), map);
    }

    #[test]
    fn test_get_routes_well_known_and_extra() {
        let mut attrs = Attributes::new();
        attrs.insert("speed", json!("fast"));
        attrs.insert("weight", json!("2kg"));

        assert_eq!(attrs.get("speed"), Some(&json!("fast")));
        assert_eq!(attrs.get("weight"), Some(&json!("2kg")));
        assert_eq!(attrs.get("cost"), None);
    }

    #[test]
    fn test_empty() {
        assert!(Attributes::new().is_empty());
    }
}
