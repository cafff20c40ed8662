//! Semantic-Model Graph Engine
//!
//! This crate contains the model pipeline and the three egui widgets
//! (treemap, sunburst, collapsible tree) - no fetching, no app shell.
//! The widgets are used by semviz-ui which owns loading and the app lifecycle.

pub mod config;
pub mod error;
pub mod graph;
pub mod model;

pub use config::{global_config, GraphSettings};
pub use error::{GraphError, Result};
pub use graph::{
    describe,
    render_sunburst,
    render_tree,
    render_treemap,
    // Shared chrome
    ColorMapper,
    ColorScheme,
    // Mounted views
    GraphView,
    ModelSummary,
    SunburstAction,
    SunburstState,
    TooltipContent,
    TreeAction,
    TreeState,
    TreemapAction,
    TreemapState,
    ViewKind,
};
pub use model::{EnrichReport, GraphNode, NodeId, SemanticGraph};

use semviz_types::SemanticNode;

/// Flatten, annotate, resolve references and count a loaded document
pub fn prepare_graph(document: &SemanticNode) -> (SemanticGraph, EnrichReport) {
    SemanticGraph::prepare(document)
}
