//! Add command implementation.

use crate::cli::AddArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use labwright_domain::{Attributes, Catalog, Category};
use labwright_store::{CatalogStore, JsonCatalogFile, LoadError, StoreError};
use serde_json::Value;
use std::fs;

/// Execute the add command.
pub fn execute_add(args: AddArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let doc_text = match (args.doc, args.doc_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(&path)?,
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Provide the documentation with --doc or --doc-file".to_string(),
            ))
        }
    };

    let mut attributes = Attributes::new();
    for attr in &args.attrs {
        let (key, value) = parse_attr(attr)?;
        attributes.insert(key, value);
    }

    let source = JsonCatalogFile::new(config.catalog_path.clone());
    let store = match CatalogStore::open(source.clone()) {
        Ok(store) => store,
        Err(StoreError::Load(LoadError::Missing(_) | LoadError::Empty(_))) => {
            tracing::info!(path = %config.catalog_path.display(), "Starting a new catalog");
            CatalogStore::with_catalog(source, Catalog::new())
        }
        Err(e) => return Err(e.into()),
    };

    let item = store.ingest_documentation(&args.name, Category::parse(&args.category), attributes, &doc_text)?;
    store.save()?;

    let mut out = formatter.success(&format!(
        "Saved '{}' [{}] with {} requirement slot(s)",
        item.name,
        item.category,
        item.slots.len()
    ));
    for slot in &item.slots {
        let target = match (&slot.category, slot.candidates.first()) {
            (_, Some(candidate)) => format!("item '{}'", candidate),
            (Some(category), None) => format!("any item of category '{}'", category),
            (None, None) => "nothing".to_string(),
        };
        out.push('\n');
        out.push_str(&formatter.info(&format!("{} x{} -> {}", slot.role, slot.quantity, target)));
    }
    Ok(out)
}

/// Parse `key=value`; numbers and booleans keep their JSON type.
fn parse_attr(input: &str) -> Result<(String, Value)> {
    let (key, raw) = input.split_once('=').ok_or_else(|| {
        CliError::InvalidInput(format!("Invalid attribute '{}'. Expected 'key=value'", input))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidInput(format!("Attribute '{}' has an empty key", input)));
    }

    let raw = raw.trim();
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    };
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_attr() {
        assert_eq!(parse_attr("cost=low").unwrap(), ("cost".to_string(), json!("low")));
        assert_eq!(parse_attr("channels = 96").unwrap(), ("channels".to_string(), json!(96)));
        assert_eq!(parse_attr("sterile=true").unwrap(), ("sterile".to_string(), json!(true)));
        assert_eq!(
            parse_attr("url=http://x=y").unwrap(),
            ("url".to_string(), json!("http://x=y"))
        );
    }

    #[test]
    fn test_parse_attr_invalid() {
        assert!(parse_attr("novalue").is_err());
        assert!(parse_attr("=x").is_err());
    }
}
