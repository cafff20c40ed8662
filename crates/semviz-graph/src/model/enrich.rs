//! Reference enrichment (topic/join → view)
//!
//! Topic and join sections name views by identifier. Enrichment resolves each
//! reference leaf against a [`ViewIndex`] and splices a deep clone of the
//! referenced view's children under the reference node. Names that miss the
//! index are retried with the suffix after the first `__` (namespaced ids such
//! as `schema__view`). Misses are expected and leave the reference as a leaf.

use std::collections::HashMap;

use semviz_types::{JOINS_SECTION, NAMESPACE_SEPARATOR, TOPICS_SECTION, VIEWS_SECTION};

use super::{NodeId, SemanticGraph};

// =============================================================================
// VIEW INDEX
// =============================================================================

/// How a name matched the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMatch {
    Exact(NodeId),
    Suffix(NodeId),
}

impl ViewMatch {
    pub fn view(self) -> NodeId {
        match self {
            ViewMatch::Exact(id) | ViewMatch::Suffix(id) => id,
        }
    }
}

/// View name → view node, built from `views → schema → view`.
///
/// When two schemas define a view with the same name the first one in
/// document order wins.
#[derive(Debug, Clone, Default)]
pub struct ViewIndex {
    views: HashMap<String, NodeId>,
}

impl ViewIndex {
    pub fn build(graph: &SemanticGraph) -> Self {
        let mut views = HashMap::new();
        if let Some(section) = graph.section_node(VIEWS_SECTION) {
            for schema in graph.node(section).logical_children() {
                for view in graph.node(schema).logical_children() {
                    views
                        .entry(graph.node(view).name().to_string())
                        .or_insert(view);
                }
            }
        }
        Self { views }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Exact name, then the suffix after the first `__`
    pub fn resolve(&self, name: &str) -> Option<ViewMatch> {
        if let Some(&id) = self.views.get(name) {
            return Some(ViewMatch::Exact(id));
        }
        let (_, suffix) = name.split_once(NAMESPACE_SEPARATOR)?;
        self.views.get(suffix).map(|&id| ViewMatch::Suffix(id))
    }
}

// =============================================================================
// ENRICHMENT
// =============================================================================

/// Outcome of an enrichment pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    /// Reference leaves examined
    pub references: usize,
    pub resolved_exact: usize,
    pub resolved_by_suffix: usize,
    /// Names that matched no view
    pub unresolved: Vec<String>,
    /// Nodes allocated by cloning
    pub cloned_nodes: usize,
}

impl EnrichReport {
    pub fn resolved(&self) -> usize {
        self.resolved_exact + self.resolved_by_suffix
    }
}

/// Resolve every reference leaf under topics and joins.
///
/// Reference leaves are looked for among the section's children and, where a
/// child is a grouping container, one level further down.
pub fn enrich(graph: &mut SemanticGraph) -> EnrichReport {
    let index = ViewIndex::build(graph);
    let mut report = EnrichReport::default();

    let mut resolved: Vec<(NodeId, NodeId)> = Vec::new();
    for reference in reference_leaves(graph) {
        report.references += 1;
        let name = graph.node(reference).name();
        match index.resolve(name) {
            Some(ViewMatch::Exact(view)) => {
                report.resolved_exact += 1;
                resolved.push((reference, view));
            }
            Some(ViewMatch::Suffix(view)) => {
                report.resolved_by_suffix += 1;
                resolved.push((reference, view));
            }
            None => report.unresolved.push(name.to_string()),
        }
    }

    for (reference, view) in resolved {
        let before = graph.len();
        let view_children: Vec<NodeId> = graph.node(view).logical_children().collect();
        for child in view_children {
            graph.clone_subtree(child, reference);
        }
        report.cloned_nodes += graph.len() - before;
    }

    report
}

/// Childless reference nodes under topics/joins (two levels, plus one
/// grouping level)
fn reference_leaves(graph: &SemanticGraph) -> Vec<NodeId> {
    let mut out = Vec::new();
    for section in [TOPICS_SECTION, JOINS_SECTION] {
        let Some(section_id) = graph.section_node(section) else {
            continue;
        };
        for entry in graph.node(section_id).logical_children() {
            for child in graph.node(entry).logical_children() {
                let node = graph.node(child);
                if node.is_reference() {
                    if node.is_leaf() {
                        out.push(child);
                    }
                } else {
                    out.extend(
                        node.logical_children()
                            .filter(|&c| graph.node(c).is_reference() && graph.node(c).is_leaf()),
                    );
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotate;
    use crate::model::fixtures::sample_document;
    use semviz_types::{FieldType, RefType, SemanticNode};

    fn prepared() -> (SemanticGraph, EnrichReport) {
        SemanticGraph::prepare(&sample_document())
    }

    #[test]
    fn test_index_exact_and_suffix() {
        let mut graph = SemanticGraph::from_document(&sample_document());
        annotate(&mut graph);
        let index = ViewIndex::build(&graph);
        assert_eq!(index.len(), 3);

        let orders = graph.find_path(&["views", "s1", "orders"]).unwrap();
        assert_eq!(index.resolve("orders"), Some(ViewMatch::Exact(orders)));
        assert_eq!(index.resolve("s1__orders"), Some(ViewMatch::Suffix(orders)));
        assert_eq!(index.resolve("s1__missing"), None);
        assert_eq!(index.resolve("missing"), None);
    }

    #[test]
    fn test_suffix_uses_first_separator_only() {
        let mut graph = SemanticGraph::from_document(&sample_document());
        annotate(&mut graph);
        let index = ViewIndex::build(&graph);
        // "a__b__orders" strips only "a__", leaving "b__orders" which is not a view
        assert_eq!(index.resolve("a__b__orders"), None);
    }

    #[test]
    fn test_report_counts() {
        let (_, report) = prepared();
        // topic: orders, s2__customers, s1__missing; joins: s2__customers, s1__missing
        assert_eq!(report.references, 5);
        assert_eq!(report.resolved_exact, 1);
        assert_eq!(report.resolved_by_suffix, 2);
        assert_eq!(report.unresolved, vec!["s1__missing", "s1__missing"]);
    }

    #[test]
    fn test_resolved_reference_gets_view_fields() {
        let (graph, _) = prepared();
        let reference = graph
            .find_path(&["topics", "order_analysis", "orders"])
            .unwrap();
        let node = graph.node(reference);
        assert_eq!(node.logical_child_count(), 2);
        assert_eq!(node.count, 5.0);
        assert_eq!(node.section.as_deref(), Some("topics"));

        let total = graph
            .find_path(&["topics", "order_analysis", "orders", "measures", "total"])
            .unwrap();
        assert_eq!(graph.node(total).section.as_deref(), Some("topics"));
        assert_eq!(graph.node(total).schema, None);
        assert_eq!(graph.node(total).data.field_type, Some(FieldType::Measure));
    }

    #[test]
    fn test_unresolved_reference_stays_leaf() {
        let (graph, _) = prepared();
        let missing = graph
            .find_path(&["joins", "order_analysis", "s1__missing"])
            .unwrap();
        assert!(graph.node(missing).is_leaf());
        assert_eq!(graph.node(missing).data.ref_type, Some(RefType::Join));
        assert_eq!(graph.node(missing).count, 1.0);
    }

    #[test]
    fn test_clone_does_not_alias_view() {
        let (mut graph, _) = prepared();
        let view = graph.find_path(&["views", "s1", "orders"]).unwrap();
        let view_fields = graph.logical_descendants(view);
        let clone_ref = graph
            .find_path(&["topics", "order_analysis", "orders"])
            .unwrap();
        let measures = graph
            .find_path(&["topics", "order_analysis", "orders", "measures"])
            .unwrap();

        // Mutate the clone: drop a field and rename another
        let dropped = graph.node_mut(measures).children.pop().unwrap();
        let kept = graph.node(measures).children[0];
        graph.node_mut(kept).data.name = "renamed".to_string();
        graph.recompute_counts();

        assert!(!view_fields.contains(&dropped));
        assert_eq!(graph.node(view).count, 5.0);
        assert_eq!(graph.node(clone_ref).count, 4.0);
        assert!(graph
            .find_path(&["views", "s1", "orders", "measures", "total"])
            .is_some());
    }

    #[test]
    fn test_grouping_container_references() {
        let topics = SemanticNode::new("topics").with_children(vec![SemanticNode::new("sales")
            .with_children(vec![SemanticNode::new("orders_topic").with_children(vec![
                SemanticNode::reference("orders", RefType::BaseView),
            ])])]);
        let views = SemanticNode::new("views").with_children(vec![SemanticNode::new("s1")
            .with_children(vec![SemanticNode::new("orders")
                .with_table_name("ORDERS")
                .with_children(vec![SemanticNode::field("id", FieldType::Dimension)])])]);
        let doc = SemanticNode::new("root").with_children(vec![topics, views]);

        let (graph, report) = SemanticGraph::prepare(&doc);
        assert_eq!(report.resolved_exact, 1);
        let id = graph
            .find_path(&["topics", "sales", "orders_topic", "orders", "id"])
            .unwrap();
        assert_eq!(graph.node(id).depth, 5);
    }
}
