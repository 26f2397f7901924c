//! Arena-backed resolution tree
//!
//! A run appends nodes as it goes; once the run returns, the tree is only
//! read (children, root-to-node paths, provenance, rendering).

use labwright_domain::{Category, ProvenancePath, SelectionError};
use serde::Serialize;
use std::fmt;

/// Index of a node within its tree
pub type NodeId = usize;

/// Why a node could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The chosen candidate is already on the path above
    CycleDetected {
        /// Item names from the first repeated item down to the repeat
        cycle: Vec<String>,
    },

    /// The selection capability failed or answered outside the offer
    SelectionError(String),

    /// The selection capability did not answer in time
    ProtocolTimeout,

    /// A named candidate does not exist
    UnknownItem(String),

    /// A slot role does not exist on the item
    UnknownSlot(String),

    /// The slot has nothing to choose from
    DataError(String),

    /// The path grew past the configured depth limit
    DepthExceeded {
        /// Configured limit
        limit: usize,
    },
}

impl From<SelectionError> for FailureKind {
    fn from(err: SelectionError) -> Self {
        if err.is_timeout() {
            FailureKind::ProtocolTimeout
        } else {
            FailureKind::SelectionError(err.to_string())
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::CycleDetected { cycle } => {
                write!(f, "cycle detected: {}", cycle.join(" → "))
            }
            FailureKind::SelectionError(msg) => write!(f, "selection failed: {}", msg),
            FailureKind::ProtocolTimeout => f.write_str("selection timed out"),
            FailureKind::UnknownItem(name) => write!(f, "unknown item '{}'", name),
            FailureKind::UnknownSlot(role) => write!(f, "unknown slot '{}'", role),
            FailureKind::DataError(msg) => write!(f, "data error: {}", msg),
            FailureKind::DepthExceeded { limit } => write!(f, "depth limit {} exceeded", limit),
        }
    }
}

/// Lifecycle of a resolution node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Created, not yet worked on
    Pending,
    /// Selection or expansion in progress
    Resolving,
    /// Item chosen and all of its slots processed
    Resolved,
    /// Could not be resolved
    Failed(FailureKind),
}

impl NodeState {
    /// True for `Resolved`
    pub fn is_resolved(&self) -> bool {
        matches!(self, NodeState::Resolved)
    }

    /// The failure, if any
    pub fn failure(&self) -> Option<&FailureKind> {
        match self {
            NodeState::Failed(kind) => Some(kind),
            _ => None,
        }
    }
}

/// One node of a resolution tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionNode {
    /// Arena index
    pub id: NodeId,
    /// Parent node (None for the root)
    pub parent: Option<NodeId>,
    /// Slot role this node fills (None for the root)
    pub slot: Option<String>,
    /// Chosen item (None if the slot failed before a choice)
    pub item: Option<String>,
    /// Category of the chosen item
    pub category: Option<Category>,
    /// Units per parent unit (the requested quantity for the root)
    pub quantity: u32,
    /// Candidate names offered for the slot, in order
    pub offered: Vec<String>,
    /// Why the item was chosen
    pub rationale: Option<String>,
    /// Current state
    pub state: NodeState,
    /// Child nodes in slot order
    pub children: Vec<NodeId>,
}

impl ResolutionNode {
    /// Item name, or the slot role for nodes without a chosen item
    pub fn label(&self) -> &str {
        self.item
            .as_deref()
            .or(self.slot.as_deref())
            .unwrap_or_default()
    }
}

/// The tree produced by one resolution run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionTree {
    nodes: Vec<ResolutionNode>,
}

impl ResolutionTree {
    /// Start a tree whose root is `item`
    pub(crate) fn with_root(item: &str, category: Category, quantity: u32) -> Self {
        Self {
            nodes: vec![ResolutionNode {
                id: 0,
                parent: None,
                slot: None,
                item: Some(item.to_string()),
                category: Some(category),
                quantity,
                offered: Vec::new(),
                rationale: None,
                state: NodeState::Pending,
                children: Vec::new(),
            }],
        }
    }

    pub(crate) fn add_child(&mut self, parent: NodeId, slot: &str, quantity: u32) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(ResolutionNode {
            id,
            parent: Some(parent),
            slot: Some(slot.to_string()),
            item: None,
            category: None,
            quantity,
            offered: Vec::new(),
            rationale: None,
            state: NodeState::Pending,
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut ResolutionNode {
        &mut self.nodes[id]
    }

    pub(crate) fn set_state(&mut self, id: NodeId, state: NodeState) {
        self.nodes[id].state = state;
    }

    /// Root id (always 0)
    pub fn root_id(&self) -> NodeId {
        0
    }

    /// The root node
    pub fn root(&self) -> &ResolutionNode {
        &self.nodes[0]
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&ResolutionNode> {
        self.nodes.get(id)
    }

    /// Children of a node in slot order (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> Vec<&ResolutionNode> {
        self.node(id)
            .map(|n| n.children.iter().map(|&c| &self.nodes[c]).collect())
            .unwrap_or_default()
    }

    /// Nodes from the root down to `id`, inclusive
    pub fn path_to(&self, id: NodeId) -> Vec<&ResolutionNode> {
        let mut path = Vec::new();
        let mut current = self.node(id);
        while let Some(node) = current {
            path.push(node);
            current = node.parent.and_then(|p| self.node(p));
        }
        path.reverse();
        path
    }

    /// Provenance of a node: the root item plus every slot choice below it
    pub fn provenance(&self, id: NodeId) -> Option<ProvenancePath> {
        let path = self.path_to(id);
        let (root, rest) = path.split_first()?;
        let mut provenance = ProvenancePath::root(root.label());
        for node in rest {
            provenance = provenance.child(node.slot.clone().unwrap_or_default(), node.item.clone());
        }
        Some(provenance)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in pre-order, children in slot order
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// Failed nodes in pre-order
    pub fn failed(&self) -> Vec<&ResolutionNode> {
        self.preorder()
            .into_iter()
            .map(|id| &self.nodes[id])
            .filter(|n| n.state.failure().is_some())
            .collect()
    }

    /// Box-drawing text rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.describe(self.root()));
        out.push('\n');

        // (node, prefix for its children, is last sibling)
        let mut stack: Vec<(NodeId, String, bool)> = Vec::new();
        let root_children = &self.root().children;
        for (i, &child) in root_children.iter().enumerate().rev() {
            stack.push((child, String::new(), i + 1 == root_children.len()));
        }

        while let Some((id, prefix, last)) = stack.pop() {
            let node = &self.nodes[id];
            let branch = if last { "└── " } else { "├── " };
            out.push_str(&format!("{}{}{}\n", prefix, branch, self.describe(node)));

            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            for (i, &child) in node.children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i + 1 == node.children.len()));
            }
        }
        out
    }

    fn describe(&self, node: &ResolutionNode) -> String {
        let mut text = String::new();
        if let Some(slot) = &node.slot {
            text.push_str(slot);
            text.push_str(": ");
        }
        match &node.item {
            Some(item) => text.push_str(item),
            None => text.push('?'),
        }
        if let Some(category) = &node.category {
            text.push_str(&format!(" [{}]", category));
        }
        text.push_str(&format!(" x{}", node.quantity));
        if let NodeState::Failed(kind) = &node.state {
            text.push_str(&format!(" FAILED ({})", kind));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolutionTree {
        let mut tree = ResolutionTree::with_root("LiquidHandler", Category::System, 1);
        let head = tree.add_child(0, "head", 1);
        {
            let node = tree.node_mut(head);
            node.item = Some("96-Channel Head".to_string());
            node.category = Some(Category::Module);
        }
        tree.set_state(head, NodeState::Resolved);

        let tips = tree.add_child(head, "tips", 96);
        tree.node_mut(tips).item = Some("Tip".to_string());
        tree.set_state(tips, NodeState::Resolved);

        let power = tree.add_child(0, "power", 1);
        tree.set_state(
            power,
            NodeState::Failed(FailureKind::DataError("no items in category 'PSU'".to_string())),
        );
        tree.set_state(0, NodeState::Resolved);
        tree
    }

    #[test]
    fn test_children_and_paths() {
        let tree = sample();
        let children: Vec<_> = tree.children(0).iter().map(|n| n.label()).collect();
        assert_eq!(children, vec!["96-Channel Head", "power"]);
        assert!(tree.children(99).is_empty());

        let path: Vec<_> = tree.path_to(2).iter().map(|n| n.label()).collect();
        assert_eq!(path, vec!["LiquidHandler", "96-Channel Head", "Tip"]);
    }

    #[test]
    fn test_provenance_display() {
        let tree = sample();
        assert_eq!(tree.provenance(0).unwrap().to_string(), "LiquidHandler");
        assert_eq!(tree.provenance(2).unwrap().to_string(), "LiquidHandler→head→tips");
        assert!(tree.provenance(42).is_none());
    }

    #[test]
    fn test_preorder_and_failed() {
        let tree = sample();
        assert_eq!(tree.preorder(), vec![0, 1, 2, 3]);
        let failed = tree.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].label(), "power");
    }

    #[test]
    fn test_render() {
        let rendered = sample().render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "LiquidHandler [System] x1");
        assert_eq!(lines[1], "├── head: 96-Channel Head [Module] x1");
        assert_eq!(lines[2], "│   └── tips: Tip x96");
        assert!(lines[3].starts_with("└── power: ? x1 FAILED (data error:"));
    }

    #[test]
    fn test_timeout_maps_to_protocol_timeout() {
        let kind = FailureKind::from(SelectionError::Timeout(std::time::Duration::from_secs(1)));
        assert_eq!(kind, FailureKind::ProtocolTimeout);

        let kind = FailureKind::from(SelectionError::Malformed("x".to_string()));
        assert!(matches!(kind, FailureKind::SelectionError(_)));
    }
}
