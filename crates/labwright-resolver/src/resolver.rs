//! The resolution run: walk the graph from a root, one selection per slot
//!
//! Traversal uses an explicit work stack. Each frame is an item on the
//! active path together with the index of its next unprocessed slot; the set
//! of item keys on the stack is the cycle guard.

use crate::bom::{Bom, BomAssembler};
use crate::config::ResolverConfig;
use crate::error::{GraphError, ResolveError};
use crate::graph::{describe_empty, DependencyGraph};
use crate::tree::{FailureKind, NodeId, NodeState, ResolutionTree};
use labwright_domain::{
    item_key, AncestorDecision, CandidateView, Catalog, CatalogItem, Decision, MemoKey, RunId,
    SelectionContext, SelectionError, Selector,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    /// Root item name
    pub root: String,
    /// Free-text design intent forwarded to every selection
    pub intent: String,
    /// Units of the root to build
    pub quantity: u32,
}

impl ResolutionRequest {
    /// Request one unit of `root`
    pub fn new(root: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            intent: intent.into(),
            quantity: 1,
        }
    }

    /// Set the number of root units
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Calls made to the selector
    pub selection_calls: usize,
    /// Selections answered from the per-run memo
    pub memo_hits: usize,
    /// Nodes that ended Resolved
    pub resolved: usize,
    /// Nodes that ended Failed
    pub failed: usize,
    /// Deepest slot level reached
    pub max_depth: usize,
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    /// Run identifier
    pub run_id: RunId,
    /// Resolution tree, possibly with failed branches
    pub tree: ResolutionTree,
    /// Counters
    pub stats: RunStats,
}

impl ResolutionOutcome {
    /// Bill of materials for this run
    pub fn bom(&self) -> Bom {
        BomAssembler::assemble(&self.tree)
    }

    /// True if no node failed
    pub fn is_complete(&self) -> bool {
        self.stats.failed == 0
    }
}

/// Up to five catalog names resembling `query`
///
/// Whole-query matches come first; failing those, any item containing one of
/// the query's words (three letters or more).
fn suggest(catalog: &Catalog, query: &str) -> Vec<String> {
    let mut names: Vec<String> = catalog.search(query).into_iter().map(|i| i.name.clone()).collect();
    if names.is_empty() {
        for word in query.split_whitespace().filter(|w| w.chars().count() >= 3) {
            for item in catalog.search(word) {
                if !names.contains(&item.name) {
                    names.push(item.name.clone());
                }
            }
        }
    }
    names.truncate(5);
    names
}

struct Frame<'a> {
    node: NodeId,
    item: &'a CatalogItem,
    next_slot: usize,
    depth: usize,
    decision: Option<AncestorDecision>,
}

/// Resolves requests against a shared dependency graph
///
/// A resolver holds no per-run state, so one instance can serve concurrent
/// runs.
pub struct Resolver<S>
where
    S: Selector,
{
    graph: Arc<DependencyGraph>,
    selector: S,
    config: ResolverConfig,
}

impl<S> Resolver<S>
where
    S: Selector,
{
    /// Create a new Resolver
    pub fn new(graph: Arc<DependencyGraph>, selector: S, config: ResolverConfig) -> Self {
        Self {
            graph,
            selector,
            config,
        }
    }

    /// The graph runs are resolved against
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a request to completion
    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<ResolutionOutcome, ResolveError> {
        self.resolve_with_cancel(request, CancellationToken::new()).await
    }

    /// Resolve a request, giving up as soon as `token` is cancelled
    pub async fn resolve_with_cancel(
        &self,
        request: &ResolutionRequest,
        token: CancellationToken,
    ) -> Result<ResolutionOutcome, ResolveError> {
        self.config.validate().map_err(ResolveError::Config)?;

        let run_id = RunId::new();
        let catalog = self.graph.catalog();
        let root = catalog.get(&request.root).map_err(|_| ResolveError::UnknownRoot {
            name: request.root.trim().to_string(),
            suggestions: suggest(catalog, &request.root),
        })?;

        info!(
            run = %run_id,
            root = %root.name,
            quantity = request.quantity,
            intent = %request.intent,
            "Starting resolution run"
        );

        let mut tree = ResolutionTree::with_root(&root.name, root.category.clone(), request.quantity.max(1));
        tree.set_state(0, NodeState::Resolving);

        let mut stats = RunStats::default();
        let mut memo: HashMap<MemoKey, Decision> = HashMap::new();
        let mut on_path: HashSet<String> = HashSet::from([root.key()]);
        let mut stack = vec![Frame {
            node: 0,
            item: root,
            next_slot: 0,
            depth: 0,
            decision: None,
        }];

        loop {
            if token.is_cancelled() {
                warn!(run = %run_id, "Resolution run cancelled");
                return Err(ResolveError::Cancelled(run_id));
            }

            let Some(frame) = stack.last_mut() else {
                break;
            };
            let item = frame.item;
            let Some(slot) = item.slots.get(frame.next_slot) else {
                let node = frame.node;
                stack.pop();
                on_path.remove(&item.key());
                tree.set_state(node, NodeState::Resolved);
                continue;
            };
            frame.next_slot += 1;
            if slot.is_leaf_declaration() {
                continue;
            }

            let parent = frame.node;
            let depth = frame.depth + 1;
            let child = tree.add_child(parent, &slot.role, slot.quantity);
            stats.max_depth = stats.max_depth.max(depth);

            let candidates = match self.graph.slot_candidates(slot) {
                Ok(candidates) if candidates.is_empty() => {
                    let reason = format!("'{}' slot '{}': {}", item.name, slot.role, describe_empty(slot));
                    warn!(run = %run_id, "Unfillable slot, {}", reason);
                    tree.set_state(child, NodeState::Failed(FailureKind::DataError(reason)));
                    continue;
                }
                Ok(candidates) => candidates,
                Err(GraphError::UnknownItem(name)) => {
                    warn!(run = %run_id, item = %item.name, slot = %slot.role, "Unknown candidate '{}'", name);
                    tree.set_state(child, NodeState::Failed(FailureKind::UnknownItem(name)));
                    continue;
                }
                Err(GraphError::UnknownSlot { slot, .. }) => {
                    tree.set_state(child, NodeState::Failed(FailureKind::UnknownSlot(slot)));
                    continue;
                }
            };
            tree.node_mut(child).offered = candidates.iter().map(|c| c.name.clone()).collect();

            if depth > self.config.max_depth {
                warn!(run = %run_id, item = %item.name, slot = %slot.role, "Depth limit reached");
                tree.set_state(
                    child,
                    NodeState::Failed(FailureKind::DepthExceeded {
                        limit: self.config.max_depth,
                    }),
                );
                continue;
            }

            tree.set_state(child, NodeState::Resolving);
            let context = SelectionContext {
                item: item.name.clone(),
                slot: slot.role.clone(),
                quantity: slot.quantity,
                candidates: candidates.iter().map(|c| CandidateView::from_item(c)).collect(),
                intent: request.intent.clone(),
                ancestors: stack.iter().filter_map(|f| f.decision.clone()).collect(),
            };
            debug!(
                run = %run_id,
                item = %item.name,
                slot = %slot.role,
                candidates = candidates.len(),
                depth,
                "Selecting"
            );

            let key = context.memo_key();
            let cached = if self.config.memoize {
                memo.get(&key).cloned()
            } else {
                None
            };
            let decision = match cached {
                Some(decision) => {
                    stats.memo_hits += 1;
                    decision
                }
                None => {
                    stats.selection_calls += 1;
                    let result = tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            warn!(run = %run_id, "Resolution run cancelled during selection");
                            return Err(ResolveError::Cancelled(run_id));
                        }
                        result = self.selector.select(&context) => result,
                    };
                    match result {
                        Ok(decision) => decision,
                        Err(e) => {
                            warn!(run = %run_id, item = %item.name, slot = %slot.role, "Selection failed: {}", e);
                            tree.set_state(child, NodeState::Failed(FailureKind::from(e)));
                            continue;
                        }
                    }
                }
            };

            let Some(chosen) = candidates
                .iter()
                .copied()
                .find(|c| c.key() == item_key(&decision.candidate))
            else {
                let err = SelectionError::NotOffered {
                    returned: decision.candidate.clone(),
                    offered: context.candidate_names(),
                };
                warn!(run = %run_id, item = %item.name, slot = %slot.role, "{}", err);
                tree.set_state(child, NodeState::Failed(FailureKind::from(err)));
                continue;
            };
            if self.config.memoize {
                memo.insert(key, decision.clone());
            }

            {
                let node = tree.node_mut(child);
                node.item = Some(chosen.name.clone());
                node.category = Some(chosen.category.clone());
                node.rationale = Some(decision.rationale.clone());
            }

            if on_path.contains(&chosen.key()) {
                let start = stack
                    .iter()
                    .position(|f| f.item.key() == chosen.key())
                    .unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|f| f.item.name.clone()).collect();
                cycle.push(chosen.name.clone());
                warn!(run = %run_id, "Cycle detected: {}", cycle.join(" → "));
                tree.set_state(child, NodeState::Failed(FailureKind::CycleDetected { cycle }));
                continue;
            }

            on_path.insert(chosen.key());
            stack.push(Frame {
                node: child,
                item: chosen,
                next_slot: 0,
                depth,
                decision: Some(AncestorDecision {
                    item: item.name.clone(),
                    slot: slot.role.clone(),
                    chosen: chosen.name.clone(),
                    rationale: decision.rationale,
                }),
            });
        }

        for id in tree.preorder() {
            match tree.node(id).map(|n| &n.state) {
                Some(NodeState::Resolved) => stats.resolved += 1,
                Some(NodeState::Failed(_)) => stats.failed += 1,
                _ => {}
            }
        }

        info!(
            run = %run_id,
            nodes = tree.len(),
            resolved = stats.resolved,
            failed = stats.failed,
            selection_calls = stats.selection_calls,
            memo_hits = stats.memo_hits,
            "Resolution run complete"
        );

        Ok(ResolutionOutcome {
            run_id,
            tree,
            stats,
        })
    }
}
