//! Show command implementation.

use super::{open_store, unknown_item};
use crate::cli::ShowArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use labwright_resolver::DependencyGraph;

/// Execute the show command.
pub fn execute_show(args: ShowArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    let catalog = open_store(config)?.current()?;
    if !catalog.contains(&args.item) {
        return Err(unknown_item(&catalog, &args.item));
    }

    let graph = DependencyGraph::build(catalog);
    let hierarchy = graph.explore(&args.item, args.depth)?;
    formatter.format_hierarchy(&hierarchy)
}
