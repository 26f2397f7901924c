//! Bill of materials assembly

use crate::tree::{NodeState, ResolutionTree};
use labwright_domain::{item_key, Category, ProvenancePath};
use serde::Serialize;
use std::collections::HashMap;

/// Whether a BOM line names something that was actually resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    /// Item chosen and fully expanded
    Resolved,
    /// Gap in the BOM
    Unresolved {
        /// Failure description
        reason: String,
    },
}

/// One aggregated line of a bill of materials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomLine {
    /// Item name, or the slot role when no item was chosen
    pub item: String,
    /// Item category, when known
    pub category: Option<Category>,
    /// Total units across every contributing path
    pub quantity: u64,
    /// Every root-to-node path contributing to this line
    pub provenance: Vec<ProvenancePath>,
    /// Resolved or unresolved
    pub status: LineStatus,
}

impl BomLine {
    /// True for resolved lines
    pub fn is_resolved(&self) -> bool {
        self.status == LineStatus::Resolved
    }
}

/// A bill of materials for one resolution run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bom {
    /// Requested root item
    pub root: String,
    /// Lines in first-seen pre-order
    pub lines: Vec<BomLine>,
}

impl Bom {
    /// Resolved lines only
    pub fn resolved(&self) -> impl Iterator<Item = &BomLine> {
        self.lines.iter().filter(|l| l.is_resolved())
    }

    /// Unresolved lines only
    pub fn unresolved(&self) -> impl Iterator<Item = &BomLine> {
        self.lines.iter().filter(|l| !l.is_resolved())
    }

    /// True if there are no unresolved lines
    pub fn is_complete(&self) -> bool {
        self.unresolved().next().is_none()
    }

    /// The resolved line for an item (case-insensitive)
    pub fn line(&self, item: &str) -> Option<&BomLine> {
        let key = item_key(item);
        self.resolved().find(|l| item_key(&l.item) == key)
    }
}

#[derive(Hash, PartialEq, Eq)]
enum LineKey {
    Resolved(String),
    Unresolved(String, String),
}

/// Turns a resolution tree into a bill of materials
///
/// Quantities multiply along each path (root quantity times every slot
/// quantity below it), and lines for the same item from different paths are
/// summed with every path kept as provenance. Failed nodes become
/// unresolved lines rather than disappearing.
pub struct BomAssembler;

impl BomAssembler {
    /// Assemble the BOM for `tree`
    pub fn assemble(tree: &ResolutionTree) -> Bom {
        let mut lines: Vec<BomLine> = Vec::new();
        let mut index: HashMap<LineKey, usize> = HashMap::new();

        // (node, units of this node per whole build)
        let root = tree.root();
        let mut stack = vec![(root.id, u64::from(root.quantity))];

        while let Some((id, units)) = stack.pop() {
            let Some(node) = tree.node(id) else {
                continue;
            };

            let (key, status) = match &node.state {
                NodeState::Resolved => (LineKey::Resolved(item_key(node.label())), LineStatus::Resolved),
                NodeState::Failed(kind) => {
                    let reason = kind.to_string();
                    (
                        LineKey::Unresolved(item_key(node.label()), reason.clone()),
                        LineStatus::Unresolved { reason },
                    )
                }
                NodeState::Pending | NodeState::Resolving => (
                    LineKey::Unresolved(item_key(node.label()), "not resolved".to_string()),
                    LineStatus::Unresolved {
                        reason: "not resolved".to_string(),
                    },
                ),
            };
            let provenance = tree.provenance(id).unwrap_or_else(|| ProvenancePath::root(node.label()));

            match index.get(&key) {
                Some(&at) => {
                    let line = &mut lines[at];
                    line.quantity = line.quantity.saturating_add(units);
                    line.provenance.push(provenance);
                }
                None => {
                    index.insert(key, lines.len());
                    lines.push(BomLine {
                        item: node.label().to_string(),
                        category: node.category.clone(),
                        quantity: units,
                        provenance: vec![provenance],
                        status,
                    });
                }
            }

            for &child in node.children.iter().rev() {
                if let Some(c) = tree.node(child) {
                    stack.push((child, units.saturating_mul(u64::from(c.quantity))));
                }
            }
        }

        Bom {
            root: root.label().to_string(),
            lines,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a leaf reached by n independent paths each requiring q
        /// units totals n×q with n provenance paths
        #[test]
        fn test_leaf_aggregation(n in 1usize..12, q in 1u32..50) {
            let mut tree = ResolutionTree::with_root("Root", Category::System, 1);
            for i in 0..n {
                let mid = tree.add_child(0, &format!("slot{}", i), 1);
                tree.node_mut(mid).item = Some(format!("Module{}", i));
                tree.set_state(mid, NodeState::Resolved);

                let leaf = tree.add_child(mid, "part", q);
                tree.node_mut(leaf).item = Some("Leaf".to_string());
                tree.set_state(leaf, NodeState::Resolved);
            }
            tree.set_state(0, NodeState::Resolved);

            let bom = BomAssembler::assemble(&tree);
            let leaf = bom.line("Leaf").unwrap();
            prop_assert_eq!(leaf.quantity, n as u64 * u64::from(q));
            prop_assert_eq!(leaf.provenance.len(), n);
        }

        /// Property: every node of the tree is accounted for in exactly one line
        #[test]
        fn test_every_node_has_a_line(widths in proptest::collection::vec(0usize..4, 1..5)) {
            let mut tree = ResolutionTree::with_root("Root", Category::System, 1);
            let mut frontier = vec![0];
            let mut counter = 0;
            for width in widths {
                let mut next = Vec::new();
                for &parent in &frontier {
                    for _ in 0..width {
                        counter += 1;
                        let id = tree.add_child(parent, "s", 1);
                        tree.node_mut(id).item = Some(format!("Item{}", counter));
                        tree.set_state(id, NodeState::Resolved);
                        next.push(id);
                    }
                }
                frontier = next;
            }
            tree.set_state(0, NodeState::Resolved);

            let bom = BomAssembler::assemble(&tree);
            let paths: usize = bom.lines.iter().map(|l| l.provenance.len()).sum();
            prop_assert_eq!(paths, tree.len());
        }
    }
}
