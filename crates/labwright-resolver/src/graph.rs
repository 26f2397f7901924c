//! Dependency graph over a catalog snapshot
//!
//! Nodes are catalog items; an edge `A → B` labelled with a slot role means
//! "B is a candidate for that slot of A". The graph is built once per catalog
//! snapshot and is read-only afterwards, so it can be shared by concurrent
//! resolution runs behind an `Arc`.

use crate::error::GraphError;
use labwright_domain::{item_key, Catalog, CatalogItem, Category, RequirementSlot};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// A structural problem noticed while building the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphWarning {
    /// Items that can require each other, directly or transitively
    Cycle {
        /// Members of the strongly connected component, in catalog order
        items: Vec<String>,
    },

    /// A slot names an item that does not exist
    Dangling {
        /// Requiring item
        item: String,
        /// Slot role
        slot: String,
        /// Missing candidate
        candidate: String,
    },

    /// A category-backed slot whose category has no items
    EmptyCategory {
        /// Requiring item
        item: String,
        /// Slot role
        slot: String,
        /// Category with no members
        category: String,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::Cycle { items } => {
                write!(f, "dependency cycle between {}", items.join(", "))
            }
            GraphWarning::Dangling { item, slot, candidate } => write!(
                f,
                "'{}' slot '{}' references unknown item '{}'",
                item, slot, candidate
            ),
            GraphWarning::EmptyCategory { item, slot, category } => write!(
                f,
                "'{}' slot '{}' has no candidates: category '{}' is empty",
                item, slot, category
            ),
        }
    }
}

/// Read-only dependency graph built from a catalog snapshot
pub struct DependencyGraph {
    catalog: Arc<Catalog>,
    graph: DiGraph<String, String>,
    nodes: HashMap<String, NodeIndex>,
    warnings: Vec<GraphWarning>,
}

impl DependencyGraph {
    /// Build the graph and collect structural warnings
    pub fn build(catalog: Arc<Catalog>) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for item in catalog.items() {
            let idx = graph.add_node(item.name.clone());
            nodes.insert(item.key(), idx);
        }

        let mut warnings = Vec::new();
        for item in catalog.items() {
            let from = nodes[&item.key()];
            for slot in item.resolvable_slots() {
                for name in &slot.candidates {
                    match nodes.get(&item_key(name)) {
                        Some(&to) => {
                            graph.add_edge(from, to, slot.role.clone());
                        }
                        None => warnings.push(GraphWarning::Dangling {
                            item: item.name.clone(),
                            slot: slot.role.clone(),
                            candidate: name.clone(),
                        }),
                    }
                }

                if let Some(category) = &slot.category {
                    let members = catalog.list_by_category(category);
                    if members.is_empty() && slot.candidates.is_empty() {
                        warnings.push(GraphWarning::EmptyCategory {
                            item: item.name.clone(),
                            slot: slot.role.clone(),
                            category: category.to_string(),
                        });
                    }
                    for member in members {
                        if slot.candidates.iter().any(|c| item_key(c) == member.key()) {
                            continue;
                        }
                        graph.add_edge(from, nodes[&member.key()], slot.role.clone());
                    }
                }
            }
        }

        for component in tarjan_scc(&graph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| graph.contains_edge(n, n));
            if !is_cycle {
                continue;
            }
            let mut members = component;
            members.sort_by_key(|n| n.index());
            warnings.push(GraphWarning::Cycle {
                items: members.iter().map(|&n| graph[n].clone()).collect(),
            });
        }

        for warning in &warnings {
            warn!("Catalog graph: {}", warning);
        }

        Self {
            catalog,
            graph,
            nodes,
            warnings,
        }
    }

    /// The catalog snapshot this graph was built from
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle to the catalog snapshot
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Everything noticed while building
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Structural cycles only
    pub fn cycles(&self) -> Vec<&[String]> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                GraphWarning::Cycle { items } => Some(items.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Number of candidate edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct items that can fill some slot of `name`
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<&str>, GraphError> {
        let idx = self
            .nodes
            .get(&item_key(name))
            .ok_or_else(|| GraphError::UnknownItem(name.trim().to_string()))?;
        let mut seen = HashSet::new();
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors(*idx)
            .filter(|n| seen.insert(*n))
            .collect();
        deps.sort_by_key(|n| n.index());
        Ok(deps.into_iter().map(|n| self.graph[n].as_str()).collect())
    }

    /// Candidates for the slot `role` of item `name`
    ///
    /// Named candidates come first in declared order, then members of the
    /// slot's category in catalog order, without duplicates. An empty result
    /// means the slot cannot be filled.
    pub fn candidates_for(&self, name: &str, role: &str) -> Result<Vec<&CatalogItem>, GraphError> {
        let item = self
            .catalog
            .get(name)
            .map_err(|_| GraphError::UnknownItem(name.trim().to_string()))?;
        let slot = item.slot(role).ok_or_else(|| GraphError::UnknownSlot {
            item: item.name.clone(),
            slot: role.trim().to_string(),
        })?;
        self.slot_candidates(slot)
    }

    /// Candidates for a slot already in hand
    pub fn slot_candidates(&self, slot: &RequirementSlot) -> Result<Vec<&CatalogItem>, GraphError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for name in &slot.candidates {
            let candidate = self
                .catalog
                .get(name)
                .map_err(|_| GraphError::UnknownItem(name.trim().to_string()))?;
            if seen.insert(candidate.key()) {
                out.push(candidate);
            }
        }

        if let Some(category) = &slot.category {
            for member in self.catalog.list_by_category(category) {
                if seen.insert(member.key()) {
                    out.push(member);
                }
            }
        }

        Ok(out)
    }

    /// Every option of every slot below `name`, without making any choices
    ///
    /// Expansion stops at `max_depth` slot levels and at items already on the
    /// current path.
    pub fn explore(&self, name: &str, max_depth: usize) -> Result<HierarchyNode, GraphError> {
        let root = self
            .catalog
            .get(name)
            .map_err(|_| GraphError::UnknownItem(name.trim().to_string()))?;
        let mut path = HashSet::new();
        Ok(self.explore_item(root, 0, max_depth, &mut path))
    }

    fn explore_item(
        &self,
        item: &CatalogItem,
        depth: usize,
        max_depth: usize,
        path: &mut HashSet<String>,
    ) -> HierarchyNode {
        let mut node = HierarchyNode {
            name: item.name.clone(),
            category: Some(item.category.clone()),
            mark: HierarchyMark::Item,
            slots: Vec::new(),
        };

        if item.is_leaf() {
            return node;
        }
        if depth >= max_depth {
            node.mark = HierarchyMark::Truncated;
            return node;
        }

        path.insert(item.key());
        for slot in item.resolvable_slots() {
            let mut options = Vec::new();
            let mut problem = None;
            match self.slot_candidates(slot) {
                Ok(candidates) if candidates.is_empty() => {
                    problem = Some(describe_empty(slot));
                }
                Ok(candidates) => {
                    for candidate in candidates {
                        if path.contains(&candidate.key()) {
                            options.push(HierarchyNode::marked(candidate, HierarchyMark::Cycle));
                        } else {
                            options.push(self.explore_item(candidate, depth + 1, max_depth, path));
                        }
                    }
                }
                Err(GraphError::UnknownItem(missing)) => {
                    options.push(HierarchyNode {
                        name: missing,
                        category: None,
                        mark: HierarchyMark::Missing,
                        slots: Vec::new(),
                    });
                }
                Err(e) => problem = Some(e.to_string()),
            }
            node.slots.push(HierarchySlot {
                role: slot.role.clone(),
                quantity: slot.quantity,
                options,
                problem,
            });
        }
        path.remove(&item.key());

        node
    }
}

pub(crate) fn describe_empty(slot: &RequirementSlot) -> String {
    match &slot.category {
        Some(category) => format!("no items in category '{}'", category),
        None => "no candidates declared".to_string(),
    }
}

/// How a node of an explored hierarchy ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyMark {
    /// Expanded normally (or a leaf)
    Item,
    /// Named but absent from the catalog
    Missing,
    /// Already on the path above; not expanded again
    Cycle,
    /// Depth limit reached
    Truncated,
}

/// An item in an unresolved dependency hierarchy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    /// Item name
    pub name: String,
    /// Item category (absent for missing items)
    pub category: Option<Category>,
    /// How expansion ended here
    pub mark: HierarchyMark,
    /// Slots with all of their options
    pub slots: Vec<HierarchySlot>,
}

/// One slot and every candidate that could fill it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchySlot {
    /// Slot role
    pub role: String,
    /// Units required
    pub quantity: u32,
    /// Candidate subtrees
    pub options: Vec<HierarchyNode>,
    /// Why the slot has no options, if so
    pub problem: Option<String>,
}

impl HierarchyNode {
    fn marked(item: &CatalogItem, mark: HierarchyMark) -> Self {
        Self {
            name: item.name.clone(),
            category: Some(item.category.clone()),
            mark,
            slots: Vec::new(),
        }
    }

    /// Number of item nodes in this hierarchy
    pub fn count(&self) -> usize {
        1 + self
            .slots
            .iter()
            .flat_map(|s| s.options.iter())
            .map(HierarchyNode::count)
            .sum::<usize>()
    }

    /// Indented text rendering
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, indent: usize) {
        let pad = "  ".repeat(indent);
        let category = self
            .category
            .as_ref()
            .map(|c| format!(" [{}]", c))
            .unwrap_or_default();
        let mark = match self.mark {
            HierarchyMark::Item => "",
            HierarchyMark::Missing => " (missing from catalog)",
            HierarchyMark::Cycle => " (cycle)",
            HierarchyMark::Truncated => " ...",
        };
        out.push_str(&format!("{}{}{}{}\n", pad, self.name, category, mark));

        for slot in &self.slots {
            out.push_str(&format!("{}  {} x{}:\n", pad, slot.role, slot.quantity));
            if let Some(problem) = &slot.problem {
                out.push_str(&format!("{}    ! {}\n", pad, problem));
            }
            for option in &slot.options {
                option.render_into(out, indent + 2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labwright_domain::RequirementSlot;

    fn catalog(items: Vec<CatalogItem>) -> Arc<Catalog> {
        Arc::new(Catalog::from_items(items).unwrap())
    }

    fn liquid_handler() -> Arc<Catalog> {
        catalog(vec![
            CatalogItem::new("LiquidHandler", Category::System)
                .with_slot(RequirementSlot::new("head", ["96-Channel Head", "8-Channel Head"]))
                .with_slot(RequirementSlot::of_category("power", Category::parse("Power Supply"))),
            CatalogItem::new("96-Channel Head", Category::Module),
            CatalogItem::new("8-Channel Head", Category::Module),
            CatalogItem::new("PSU-24", Category::parse("Power Supply")),
            CatalogItem::new("PSU-48", Category::parse("power supply")),
        ])
    }

    #[test]
    fn test_candidates_named_then_category() {
        let graph = DependencyGraph::build(liquid_handler());

        let heads: Vec<_> = graph
            .candidates_for("liquidhandler", "HEAD")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(heads, vec!["96-Channel Head", "8-Channel Head"]);

        let power: Vec<_> = graph
            .candidates_for("LiquidHandler", "power")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(power, vec!["PSU-24", "PSU-48"]);
        assert!(graph.warnings().is_empty());
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_named_candidate_not_repeated_by_category() {
        let graph = DependencyGraph::build(catalog(vec![
            CatalogItem::new("Rig", Category::System).with_slot(RequirementSlot {
                role: "power".to_string(),
                quantity: 1,
                candidates: vec!["PSU-48".to_string()],
                category: Some(Category::parse("Power Supply")),
            }),
            CatalogItem::new("PSU-24", Category::parse("Power Supply")),
            CatalogItem::new("PSU-48", Category::parse("Power Supply")),
        ]));

        let names: Vec<_> = graph
            .candidates_for("Rig", "power")
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["PSU-48", "PSU-24"]);
    }

    #[test]
    fn test_unknown_item_and_slot() {
        let graph = DependencyGraph::build(liquid_handler());
        assert_eq!(
            graph.candidates_for("Nope", "head").unwrap_err(),
            GraphError::UnknownItem("Nope".to_string())
        );
        assert_eq!(
            graph.candidates_for("LiquidHandler", "arm").unwrap_err(),
            GraphError::UnknownSlot {
                item: "LiquidHandler".to_string(),
                slot: "arm".to_string()
            }
        );
    }

    #[test]
    fn test_dangling_and_empty_category_warnings() {
        let graph = DependencyGraph::build(catalog(vec![CatalogItem::new("Pump", Category::Component)
            .with_slot(RequirementSlot::new("seal", ["Ghost Seal"]))
            .with_slot(RequirementSlot::of_category("motor", Category::parse("Motor")))]));

        assert_eq!(graph.warnings().len(), 2);
        assert!(matches!(graph.warnings()[0], GraphWarning::Dangling { ref candidate, .. } if candidate == "Ghost Seal"));
        assert!(matches!(graph.warnings()[1], GraphWarning::EmptyCategory { .. }));
        assert_eq!(
            graph.candidates_for("Pump", "seal").unwrap_err(),
            GraphError::UnknownItem("Ghost Seal".to_string())
        );
        assert!(graph.candidates_for("Pump", "motor").unwrap().is_empty());
    }

    #[test]
    fn test_cycles_detected() {
        let graph = DependencyGraph::build(catalog(vec![
            CatalogItem::new("A", Category::Module).with_slot(RequirementSlot::new("b", ["B"])),
            CatalogItem::new("B", Category::Module).with_slot(RequirementSlot::new("a", ["A"])),
            CatalogItem::new("Self", Category::Part).with_slot(RequirementSlot::new("me", ["Self"])),
            CatalogItem::new("Leaf", Category::Part),
        ]));

        let mut cycles: Vec<Vec<String>> = graph.cycles().iter().map(|c| c.to_vec()).collect();
        cycles.sort();
        assert_eq!(
            cycles,
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["Self".to_string()]
            ]
        );
    }

    #[test]
    fn test_dependencies_of() {
        let graph = DependencyGraph::build(liquid_handler());
        assert_eq!(
            graph.dependencies_of("LiquidHandler").unwrap(),
            vec!["96-Channel Head", "8-Channel Head", "PSU-24", "PSU-48"]
        );
        assert!(graph.dependencies_of("PSU-24").unwrap().is_empty());
    }

    #[test]
    fn test_explore_marks_cycles_missing_and_depth() {
        let graph = DependencyGraph::build(catalog(vec![
            CatalogItem::new("A", Category::System)
                .with_slot(RequirementSlot::new("b", ["B"]))
                .with_slot(RequirementSlot::of_category("x", Category::parse("Nothing"))),
            CatalogItem::new("B", Category::Module).with_slot(RequirementSlot::new("back", ["A"])),
        ]));

        let tree = graph.explore("a", 10).unwrap();
        assert_eq!(tree.name, "A");
        assert_eq!(tree.slots.len(), 2);
        let b = &tree.slots[0].options[0];
        assert_eq!(b.slots[0].options[0].mark, HierarchyMark::Cycle);
        assert!(tree.slots[1].problem.is_some());
        assert_eq!(tree.count(), 3);

        let shallow = graph.explore("A", 1).unwrap();
        assert_eq!(shallow.slots[0].options[0].mark, HierarchyMark::Truncated);

        let rendered = tree.render();
        assert!(rendered.contains("A [System]"));
        assert!(rendered.contains("(cycle)"));
        assert!(rendered.contains("no items in category 'Nothing'"));
    }
}
