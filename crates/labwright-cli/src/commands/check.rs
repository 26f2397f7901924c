//! Check command implementation.

use super::open_store;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use labwright_resolver::DependencyGraph;

/// Execute the check command.
pub fn execute_check(config: &Config, formatter: &Formatter) -> Result<String> {
    let catalog = open_store(config)?.current()?;
    let graph = DependencyGraph::build(catalog);
    formatter.format_warnings(graph.warnings())
}
