//! Arena representation of the semantic-model tree
//!
//! The wire document ([`SemanticNode`]) is flattened into a [`SemanticGraph`]
//! arena addressed by [`NodeId`]. Each [`GraphNode`] keeps its visible
//! `children` and a separate `hidden_children` slot so that expand/collapse
//! never loses structure and the invariant "a node's logical children are
//! `children ++ hidden_children`" is checkable at any point.
//!
//! # Pipeline
//!
//! ```text
//! SemanticNode (JSON)
//!        │ SemanticGraph::from_document
//!        ▼
//! annotate ──► enrich (RefResolver) ──► annotate ──► recompute_counts
//!        │
//!        ├──► project (treemap top level)
//!        ├──► TreeState
//!        └──► SunburstState
//! ```

pub mod annotate;
pub mod enrich;
pub mod project;

pub use annotate::annotate;
pub use enrich::{enrich, EnrichReport, ViewIndex, ViewMatch};
pub use project::{project, ProjectedKind, ProjectedNode};

use semviz_types::{SemanticNode, TOPICS_SECTION, VIEWS_SECTION};

/// Index of a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the arena with its derived annotations
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    /// Wire metadata; `data.children` is always empty (children live in the arena)
    pub data: SemanticNode,
    pub parent: Option<NodeId>,
    /// Currently visible children
    pub children: Vec<NodeId>,
    /// Children moved aside by a collapse
    pub hidden_children: Vec<NodeId>,
    pub depth: usize,
    /// Name of the depth-1 ancestor (None for the root)
    pub section: Option<String>,
    /// Name of the depth-2 ancestor, only under the views section
    pub schema: Option<String>,
    /// Leaf-value sum over the logical subtree
    pub count: f64,
}

impl GraphNode {
    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn display_name(&self) -> &str {
        self.data.display_name()
    }

    /// No children in either slot
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.hidden_children.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.children.is_empty() && !self.hidden_children.is_empty()
    }

    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_field_leaf(&self) -> bool {
        self.data.field_type.is_some() && self.is_leaf()
    }

    pub fn is_reference(&self) -> bool {
        self.data.ref_type.is_some()
    }

    pub fn is_view(&self) -> bool {
        self.data.table_name.is_some()
    }

    pub fn section_is(&self, section: &str) -> bool {
        self.section.as_deref() == Some(section)
    }

    /// Visible then hidden children
    pub fn logical_children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children
            .iter()
            .chain(self.hidden_children.iter())
            .copied()
    }

    pub fn logical_child_count(&self) -> usize {
        self.children.len() + self.hidden_children.len()
    }
}

// =============================================================================
// SEMANTIC GRAPH
// =============================================================================

/// Arena-backed semantic-model tree
#[derive(Debug, Clone)]
pub struct SemanticGraph {
    nodes: Vec<GraphNode>,
    root: NodeId,
}

impl SemanticGraph {
    /// Flatten a document into an arena (no annotation yet)
    pub fn from_document(document: &SemanticNode) -> Self {
        let mut graph = Self {
            nodes: Vec::with_capacity(document.node_count()),
            root: NodeId(0),
        };
        graph.root = graph.insert_document(document, None, 0);
        graph
    }

    /// Full load pipeline: flatten, annotate, resolve references, re-annotate, count.
    pub fn prepare(document: &SemanticNode) -> (Self, EnrichReport) {
        let mut graph = Self::from_document(document);
        annotate(&mut graph);
        let report = enrich(&mut graph);
        annotate(&mut graph);
        graph.recompute_counts();

        tracing::info!(
            nodes = graph.len(),
            references = report.references,
            resolved = report.resolved(),
            by_suffix = report.resolved_by_suffix,
            unresolved = report.unresolved.len(),
            "Prepared semantic graph"
        );
        if !report.unresolved.is_empty() {
            tracing::debug!(unresolved = ?report.unresolved, "Unresolved view references");
        }

        (graph, report)
    }

    fn insert_document(
        &mut self,
        node: &SemanticNode,
        parent: Option<NodeId>,
        depth: usize,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode {
            id,
            data: node.without_children(),
            parent,
            children: Vec::with_capacity(node.children.len()),
            hidden_children: Vec::new(),
            depth,
            section: None,
            schema: None,
            count: 0.0,
        });
        for child in &node.children {
            let child_id = self.insert_document(child, Some(id), depth + 1);
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut GraphNode {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Depth-1 node with the given name
    pub fn section_node(&self, section: &str) -> Option<NodeId> {
        self.node(self.root)
            .logical_children()
            .find(|&c| self.node(c).name() == section)
    }

    /// Schema names under the views section, in document order
    pub fn schema_names(&self) -> Vec<String> {
        self.section_node(VIEWS_SECTION)
            .map(|views| {
                self.node(views)
                    .logical_children()
                    .map(|s| self.node(s).name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a node is a topic entry (child of the topics section or of a
    /// grouping container there)
    pub fn is_topic(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !node.section_is(TOPICS_SECTION) || node.is_reference() || node.depth < 2 {
            return false;
        }
        if node.data.base_view.is_some() {
            return true;
        }
        node.depth == 2 && node.logical_children().any(|c| self.node(c).is_reference())
    }

    /// Pre-order walk over visible children
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, false)
    }

    /// Pre-order walk over visible and hidden children
    pub fn logical_descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(id, true)
    }

    fn walk(&self, id: NodeId, include_hidden: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let node = self.node(current);
            if include_hidden {
                stack.extend(node.hidden_children.iter().rev().copied());
            }
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// First node in logical pre-order whose name matches
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.logical_descendants(self.root)
            .into_iter()
            .find(|&id| self.node(id).name() == name)
    }

    /// Resolve a name path from the root (`["views", "s1", "orders"]`)
    pub fn find_path(&self, path: &[&str]) -> Option<NodeId> {
        let mut current = self.root;
        for segment in path {
            current = self
                .node(current)
                .logical_children()
                .find(|&c| self.node(c).name() == *segment)?;
        }
        Some(current)
    }

    /// Deep-clone the subtree rooted at `source` under `new_parent`.
    ///
    /// Every cloned node gets a fresh id; no arena slot is shared with the
    /// source. Collapsed children of the source are cloned as visible children.
    pub fn clone_subtree(&mut self, source: NodeId, new_parent: NodeId) -> NodeId {
        let depth = self.node(new_parent).depth + 1;
        let id = NodeId(self.nodes.len());
        let src = self.node(source);
        let data = src.data.clone();
        let (section, schema, count) = (src.section.clone(), src.schema.clone(), src.count);
        let source_children: Vec<NodeId> = src.logical_children().collect();

        self.nodes.push(GraphNode {
            id,
            data,
            parent: Some(new_parent),
            children: Vec::with_capacity(source_children.len()),
            hidden_children: Vec::new(),
            depth,
            section,
            schema,
            count,
        });
        self.nodes[new_parent.0].children.push(id);

        for child in source_children {
            self.clone_subtree(child, id);
        }
        id
    }

    /// Recompute `count` bottom-up over logical children
    pub fn recompute_counts(&mut self) {
        let order = self.logical_descendants(self.root);
        for &id in order.iter().rev() {
            let node = &self.nodes[id.0];
            let count = if node.is_leaf() {
                node.data.leaf_value()
            } else {
                node.logical_children().map(|c| self.nodes[c.0].count).sum()
            };
            self.nodes[id.0].count = count;
        }
    }

    // =========================================================================
    // EXPAND / COLLAPSE
    // =========================================================================

    /// Move visible children to the hidden slot. Returns false if nothing moved.
    pub fn collapse(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        if node.children.is_empty() {
            return false;
        }
        let mut moved = std::mem::take(&mut node.children);
        moved.append(&mut node.hidden_children);
        node.hidden_children = moved;
        true
    }

    /// Move hidden children back to the visible slot. Returns false if nothing moved.
    pub fn expand(&mut self, id: NodeId) -> bool {
        let node = &mut self.nodes[id.0];
        if node.hidden_children.is_empty() {
            return false;
        }
        let hidden = std::mem::take(&mut node.hidden_children);
        node.children.extend(hidden);
        true
    }

    /// Rebuild a wire document from the logical subtree at `id`
    pub fn to_document(&self, id: NodeId) -> SemanticNode {
        let node = self.node(id);
        let mut doc = node.data.clone();
        doc.children = node
            .logical_children()
            .map(|c| self.to_document(c))
            .collect();
        doc
    }
}

// =============================================================================
// TEST FIXTURES
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use semviz_types::{FieldType, RefType, SemanticNode};

    /// Two schemas, three views, one topic with a namespaced join and one
    /// unresolvable join, and a joins section mirroring the topic.
    pub fn sample_document() -> SemanticNode {
        let view = |name: &str, dims: &[&str], measures: &[&str]| {
            let mut groups = Vec::new();
            if !dims.is_empty() {
                groups.push(
                    SemanticNode::new("dimensions").with_children(
                        dims.iter()
                            .map(|d| SemanticNode::field(*d, FieldType::Dimension))
                            .collect(),
                    ),
                );
            }
            if !measures.is_empty() {
                groups.push(
                    SemanticNode::new("measures").with_children(
                        measures
                            .iter()
                            .map(|m| SemanticNode::field(*m, FieldType::Measure))
                            .collect(),
                    ),
                );
            }
            SemanticNode::new(name)
                .with_table_name(name.to_uppercase())
                .with_children(groups)
        };

        let mut topic = SemanticNode::new("order_analysis")
            .with_label("Order Analysis")
            .with_children(vec![
                SemanticNode::reference("orders", RefType::BaseView),
                SemanticNode::reference("s2__customers", RefType::Join),
                SemanticNode::reference("s1__missing", RefType::Join),
            ]);
        topic.base_view = Some("orders".to_string());

        SemanticNode::new("omni").with_children(vec![
            SemanticNode::new("topics").with_children(vec![topic]),
            SemanticNode::new("joins").with_children(vec![SemanticNode::new("order_analysis")
                .with_children(vec![
                    SemanticNode::reference("s2__customers", RefType::Join),
                    SemanticNode::reference("s1__missing", RefType::Join),
                ])]),
            SemanticNode::new("views").with_children(vec![
                SemanticNode::new("s1").with_children(vec![
                    view("orders", &["id", "status", "created_at"], &["total", "count"]),
                    view("items", &["sku"], &[]),
                ]),
                SemanticNode::new("s2")
                    .with_children(vec![view("customers", &["id", "name"], &["lifetime_value"])]),
            ]),
        ])
    }
}
