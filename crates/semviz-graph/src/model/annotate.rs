//! Section / schema annotation
//!
//! A single depth-first pass assigns every node its `depth`, its `section`
//! (name of the depth-1 ancestor) and, under the views section, its `schema`
//! (name of the depth-2 ancestor). Re-running the pass is idempotent and is
//! required after reference enrichment so cloned subtrees pick up the
//! referencing section instead of the view's original one.

use semviz_types::VIEWS_SECTION;

use super::{NodeId, SemanticGraph};

/// Annotate the whole graph in place (walks visible and hidden children)
pub fn annotate(graph: &mut SemanticGraph) {
    let mut stack: Vec<(NodeId, usize, Option<String>, Option<String>)> =
        vec![(graph.root(), 0, None, None)];

    while let Some((id, depth, section, schema)) = stack.pop() {
        let name = graph.node(id).name().to_string();

        let section = if depth == 1 { Some(name.clone()) } else { section };
        let schema = match section.as_deref() {
            Some(VIEWS_SECTION) if depth == 2 => Some(name),
            Some(VIEWS_SECTION) if depth > 2 => schema,
            _ => None,
        };

        let node = graph.node_mut(id);
        node.depth = depth;
        node.section = section.clone();
        node.schema = schema.clone();

        let children: Vec<NodeId> = node.logical_children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, depth + 1, section.clone(), schema.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_document;
    use semviz_types::{FieldType, SemanticNode};

    fn annotated() -> SemanticGraph {
        let mut graph = SemanticGraph::from_document(&sample_document());
        annotate(&mut graph);
        graph
    }

    #[test]
    fn test_root_has_no_section() {
        let graph = annotated();
        let root = graph.node(graph.root());
        assert_eq!(root.section, None);
        assert_eq!(root.schema, None);
        assert_eq!(root.depth, 0);
    }

    #[test]
    fn test_section_is_depth_one_ancestor() {
        let graph = annotated();
        for node in graph.nodes().filter(|n| n.depth >= 1) {
            let mut ancestor = node.id;
            while graph.node(ancestor).depth > 1 {
                ancestor = graph.parent(ancestor).unwrap();
            }
            assert_eq!(node.section.as_deref(), Some(graph.node(ancestor).name()));
        }
    }

    #[test]
    fn test_schema_only_under_views() {
        let graph = annotated();
        let orders = graph.find_path(&["views", "s1", "orders"]).unwrap();
        let total = graph
            .find_path(&["views", "s1", "orders", "measures", "total"])
            .unwrap();
        assert_eq!(graph.node(orders).schema.as_deref(), Some("s1"));
        assert_eq!(graph.node(total).schema.as_deref(), Some("s1"));

        let views = graph.section_node("views").unwrap();
        assert_eq!(graph.node(views).schema, None);

        let topic = graph.find_path(&["topics", "order_analysis"]).unwrap();
        assert_eq!(graph.node(topic).section.as_deref(), Some("topics"));
        assert_eq!(graph.node(topic).schema, None);
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let mut graph = annotated();
        let first: Vec<_> = graph
            .nodes()
            .map(|n| (n.section.clone(), n.schema.clone(), n.depth))
            .collect();
        annotate(&mut graph);
        let second: Vec<_> = graph
            .nodes()
            .map(|n| (n.section.clone(), n.schema.clone(), n.depth))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_scenario_orders_view() {
        let doc = SemanticNode::new("root").with_children(vec![SemanticNode::new("views")
            .with_children(vec![SemanticNode::new("s1").with_children(vec![
                SemanticNode::new("orders")
                    .with_table_name("orders")
                    .with_children(vec![SemanticNode::field("total", FieldType::Measure)]),
            ])])]);
        let mut graph = SemanticGraph::from_document(&doc);
        annotate(&mut graph);

        let orders = graph.find("orders").unwrap();
        assert_eq!(graph.node(orders).section.as_deref(), Some("views"));
        assert_eq!(graph.node(orders).schema.as_deref(), Some("s1"));
    }

    #[test]
    fn test_hidden_children_are_annotated() {
        let mut graph = SemanticGraph::from_document(&sample_document());
        let s1 = graph.find_path(&["views", "s1"]).unwrap();
        graph.collapse(s1);
        annotate(&mut graph);
        let items = graph.find_path(&["views", "s1", "items"]).unwrap();
        assert_eq!(graph.node(items).schema.as_deref(), Some("s1"));
    }
}
