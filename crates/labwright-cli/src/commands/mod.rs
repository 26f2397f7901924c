//! Command implementations.
//!
//! Each command returns the text to print so the binary decides where it goes.

pub mod add;
pub mod check;
pub mod config;
pub mod list;
pub mod resolve;
pub mod show;

pub use self::add::execute_add;
pub use self::check::execute_check;
pub use self::config::execute_config;
pub use self::list::execute_list;
pub use self::resolve::execute_resolve;
pub use self::show::execute_show;

use crate::config::Config;
use crate::error::{CliError, Result};
use labwright_domain::Catalog;
use labwright_store::{CatalogStore, JsonCatalogFile};

/// Open the catalog named in the configuration.
pub(crate) fn open_store(config: &Config) -> Result<CatalogStore> {
    Ok(CatalogStore::open(JsonCatalogFile::new(config.catalog_path.clone()))?)
}

/// "Unknown item" error with similarly named catalog items.
pub(crate) fn unknown_item(catalog: &Catalog, name: &str) -> CliError {
    let suggestions: Vec<&str> = catalog
        .search(name)
        .into_iter()
        .take(5)
        .map(|item| item.name.as_str())
        .collect();
    if suggestions.is_empty() {
        CliError::InvalidInput(format!("Unknown item '{}'", name.trim()))
    } else {
        CliError::InvalidInput(format!(
            "Unknown item '{}'; did you mean: {}?",
            name.trim(),
            suggestions.join(", ")
        ))
    }
}
