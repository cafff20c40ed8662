//! Summary projection for the treemap's top level
//!
//! Produces a coarsened copy of a subtree so the treemap shows dozens of
//! tiles instead of thousands of fields:
//! - a container whose children are all field leaves becomes one group tile
//!   valued at its field count
//! - a non-root view (`table_name` set) becomes one tile of value 1
//! - everything else passes through with projected children
//!
//! Each projected node keeps `source`, the original node it stands for, so a
//! drill-down can re-render from the unprojected subtree.

use super::{NodeId, SemanticGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectedKind {
    Passthrough,
    /// Collapsed set of field leaves
    Group,
    /// Collapsed view
    View,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub source: NodeId,
    pub kind: ProjectedKind,
    pub value: f64,
    pub children: Vec<ProjectedNode>,
}

impl ProjectedNode {
    pub fn is_group(&self) -> bool {
        self.kind == ProjectedKind::Group
    }

    pub fn is_view(&self) -> bool {
        self.kind == ProjectedKind::View
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of projected nodes including self
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(|c| c.len()).sum::<usize>()
    }

    /// Pre-order iterator over the projected tree
    pub fn iter(&self) -> impl Iterator<Item = &ProjectedNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Whether every visible child of `id` is a field leaf (false for leaves)
pub fn all_children_are_fields(graph: &SemanticGraph, id: NodeId) -> bool {
    let node = graph.node(id);
    !node.children.is_empty()
        && node
            .children
            .iter()
            .all(|&c| graph.node(c).is_field_leaf())
}

/// Project the visible subtree at `id`
pub fn project(graph: &SemanticGraph, id: NodeId, is_root: bool) -> ProjectedNode {
    let node = graph.node(id);

    if all_children_are_fields(graph, id) {
        return ProjectedNode {
            source: id,
            kind: ProjectedKind::Group,
            value: node.count,
            children: Vec::new(),
        };
    }

    if node.is_view() && !is_root {
        return ProjectedNode {
            source: id,
            kind: ProjectedKind::View,
            value: 1.0,
            children: Vec::new(),
        };
    }

    passthrough(graph, id, |graph, child| project(graph, child, false))
}

/// Identity projection of the visible subtree (used for field-level detail)
pub fn unprojected(graph: &SemanticGraph, id: NodeId) -> ProjectedNode {
    passthrough(graph, id, unprojected)
}

fn passthrough(
    graph: &SemanticGraph,
    id: NodeId,
    recurse: impl Fn(&SemanticGraph, NodeId) -> ProjectedNode,
) -> ProjectedNode {
    let node = graph.node(id);
    if node.children.is_empty() {
        return ProjectedNode {
            source: id,
            kind: ProjectedKind::Passthrough,
            value: node.data.leaf_value(),
            children: Vec::new(),
        };
    }
    let children: Vec<ProjectedNode> = node.children.iter().map(|&c| recurse(graph, c)).collect();
    ProjectedNode {
        source: id,
        kind: ProjectedKind::Passthrough,
        value: children.iter().map(|c| c.value).sum(),
        children,
    }
}
