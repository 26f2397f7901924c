//! Resolve command implementation.

use super::open_store;
use crate::cli::ResolveArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use labwright_domain::Selector;
use labwright_llm::{ConfiguredProvider, ProviderKind};
use labwright_resolver::{DependencyGraph, ResolutionRequest, Resolver};
use labwright_selector::{FirstCandidateSelector, SelectionClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Build the selector described by the provider configuration.
///
/// The mock provider cannot know what it is offered, so without a real
/// model the first offered candidate is taken at every slot.
pub fn build_selector(config: &Config) -> Result<Arc<dyn Selector>> {
    if config.provider.kind == ProviderKind::Mock {
        tracing::info!("No selection model configured; taking first candidates");
        return Ok(Arc::new(FirstCandidateSelector));
    }

    let provider = ConfiguredProvider::from_config(&config.provider)?;
    Ok(Arc::new(SelectionClient::new(provider, config.selector.clone())))
}

/// Execute the resolve command.
pub async fn execute_resolve(args: ResolveArgs, config: &Config, formatter: &Formatter) -> Result<String> {
    if args.quantity == 0 {
        return Err(CliError::InvalidInput("Quantity must be at least 1".to_string()));
    }

    let store = open_store(config)?;
    let selector = build_selector(config)?;

    // Held until the run ends so catalog edits wait for it
    let snapshot = store.snapshot()?;
    let graph = Arc::new(DependencyGraph::build(snapshot.shared()));
    let resolver = Resolver::new(graph, selector, config.resolver.clone());
    let request = ResolutionRequest::new(&args.system, &args.intent).with_quantity(args.quantity);

    let token = CancellationToken::new();
    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };
    let result = resolver.resolve_with_cancel(&request, token).await;
    watcher.abort();
    drop(snapshot);

    formatter.format_outcome(&result?)
}
