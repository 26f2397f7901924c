//! List command implementation.

use super::open_store;
use crate::cli::ListArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use labwright_domain::Category;

/// Execute the list command.
pub fn execute_list(args: ListArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let catalog = open_store(config)?.current()?;

    let items = match args.category.as_deref() {
        Some(category) => catalog.list_by_category(&Category::parse(category)),
        None => catalog.items().iter().collect(),
    };

    formatter.format_items(&items)
}
