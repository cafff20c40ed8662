//! Counts shown beside each view and in the host status bar

use std::fmt;

use semviz_types::{FieldType, VIEWS_SECTION};

use crate::model::{EnrichReport, NodeId, ProjectedNode, SemanticGraph};

// =============================================================================
// TREEMAP
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreemapStats {
    /// Projected level: topic and view tiles in view, plus the root's item count
    Summary { topics: usize, views: usize, items: f64 },
    /// Field-level tiling
    Detail { fields: usize },
}

impl TreemapStats {
    pub fn compute(graph: &SemanticGraph, tiles: &ProjectedNode, is_detail: bool) -> Self {
        if is_detail {
            let fields = tiles
                .iter()
                .filter(|t| graph.node(t.source).is_field_leaf())
                .count();
            return TreemapStats::Detail { fields };
        }

        let below_root = || tiles.iter().skip(1);
        let topics = below_root().filter(|t| graph.is_topic(t.source)).count();
        let views = below_root()
            .filter(|t| t.is_view() || graph.node(t.source).is_view())
            .count();
        TreemapStats::Summary {
            topics,
            views,
            items: graph.node(tiles.source).count,
        }
    }
}

impl fmt::Display for TreemapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreemapStats::Summary {
                topics,
                views,
                items,
            } => write!(f, "{topics} topics | {views} views | {items} items"),
            TreemapStats::Detail { fields } => write!(f, "{fields} fields"),
        }
    }
}

// =============================================================================
// TREE
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub visible: usize,
    pub expanded: usize,
    pub collapsed: usize,
}

impl TreeStats {
    /// Count over the nodes reachable through visible children of `root`
    pub fn compute(graph: &SemanticGraph, root: NodeId) -> Self {
        graph
            .descendants(root)
            .into_iter()
            .map(|id| graph.node(id))
            .fold(TreeStats::default(), |mut stats, node| {
                stats.visible += 1;
                if node.is_expanded() {
                    stats.expanded += 1;
                } else if node.is_collapsed() {
                    stats.collapsed += 1;
                }
                stats
            })
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visible | {} expanded | {} collapsed",
            self.visible, self.expanded, self.collapsed
        )
    }
}

// =============================================================================
// MODEL SUMMARY
// =============================================================================

/// Whole-model counts. Fields are counted under the views section only, so
/// enrichment clones do not inflate them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelSummary {
    pub schemas: usize,
    pub views: usize,
    pub topics: usize,
    pub fields: usize,
    pub dimensions: usize,
    pub measures: usize,
    pub unresolved_refs: usize,
}

impl ModelSummary {
    pub fn compute(graph: &SemanticGraph, report: &EnrichReport) -> Self {
        let mut summary = ModelSummary {
            schemas: graph.schema_names().len(),
            unresolved_refs: report.unresolved.len(),
            ..Default::default()
        };

        summary.topics = graph
            .logical_descendants(graph.root())
            .into_iter()
            .filter(|&id| graph.is_topic(id))
            .count();

        let Some(views) = graph.section_node(VIEWS_SECTION) else {
            return summary;
        };
        for id in graph.logical_descendants(views) {
            let node = graph.node(id);
            if node.is_view() {
                summary.views += 1;
            }
            if !node.is_leaf() {
                continue;
            }
            match node.data.field_type {
                Some(FieldType::Dimension) => summary.dimensions += 1,
                Some(FieldType::Measure) => summary.measures += 1,
                None => continue,
            }
            summary.fields += 1;
        }
        summary
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} schemas | {} views | {} topics | {} fields ({} dimensions, {} measures)",
            self.schemas, self.views, self.topics, self.fields, self.dimensions, self.measures
        )?;
        if self.unresolved_refs > 0 {
            write!(f, " | {} unresolved refs", self.unresolved_refs)?;
        }
        Ok(())
    }
}
