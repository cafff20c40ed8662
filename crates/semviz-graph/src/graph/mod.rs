//! Semantic-Model Visualization Module
//!
//! Three views over one prepared [`SemanticGraph`], each an egui widget with
//! its own state object.
//!
//! # Architecture
//!
//! ```text
//! SemanticGraph (prepared: annotated, enriched, counted)
//!        │
//!        ├──► TreemapState   (project ──► squarify ──► tiles)
//!        │         └──► breadcrumbs, fade Tween
//!        │
//!        ├──► SunburstState  (partition ──► zoom_target ──► arcs)
//!        │         └──► focus, arc Timeline
//!        │
//!        └──► TreeState      (layout_tree ──► node positions)
//!                  └──► per-node Tweens, Camera2D, SpatialIndex
//!
//! shared: ColorMapper, TooltipContent, stats, lod
//! ```
//!
//! # EGUI-RULES
//!
//! Render functions take `&mut State`, draw, and return an `Action`. The
//! caller applies it with `state.handle(&action)` after the frame's drawing,
//! so a redraw never sees a half-applied transition.
//!
//! # Usage
//!
//! ```ignore
//! let (graph, _report) = prepare_graph(&document);
//! let mut view = GraphView::mount(ViewKind::Sunburst, graph);
//! view.ui(ui, &ColorScheme::dark());
//! ```

pub mod animation;
pub mod camera;
pub mod colors;
pub mod lod;
pub mod spatial;
pub mod stats;
pub mod sunburst;
pub mod tooltip;
pub mod transition;
pub mod tree;
pub mod treemap;

pub use animation::{SpringConfig, SpringF32, SpringVec2};
pub use camera::Camera2D;
pub use colors::{ColorMapper, ColorScheme, LegendEntry, SchemaPalette};
pub use stats::{ModelSummary, TreeStats, TreemapStats};
pub use sunburst::{render_sunburst, SunburstAction, SunburstState};
pub use tooltip::{describe, TooltipContent, TooltipRow};
pub use transition::{Easing, Timeline, Tween};
pub use tree::{render_tree, TreeAction, TreeState};
pub use treemap::{render_treemap, TreemapAction, TreemapState};

use std::fmt;
use std::str::FromStr;

use egui::Ui;

use crate::model::SemanticGraph;

/// Which visualization to mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ViewKind {
    #[default]
    Treemap,
    Sunburst,
    Tree,
}

impl ViewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Treemap => "treemap",
            ViewKind::Sunburst => "sunburst",
            ViewKind::Tree => "tree",
        }
    }

    /// Label for the view selector
    pub fn display_name(&self) -> &'static str {
        match self {
            ViewKind::Treemap => "Treemap",
            ViewKind::Sunburst => "Sunburst",
            ViewKind::Tree => "Tree",
        }
    }

    pub fn all() -> &'static [ViewKind] {
        &[ViewKind::Treemap, ViewKind::Sunburst, ViewKind::Tree]
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown view '{s}' (expected treemap, sunburst or tree)"))
    }
}

// =============================================================================
// MOUNTED VIEW
// =============================================================================

/// One mounted view instance. Each owns its own copy of the graph, so
/// expand/collapse in the tree never leaks into the sunburst.
#[derive(Debug)]
pub enum GraphView {
    Treemap(TreemapState),
    Sunburst(SunburstState),
    Tree(TreeState),
}

impl GraphView {
    pub fn mount(kind: ViewKind, graph: SemanticGraph) -> Self {
        tracing::debug!(view = %kind, nodes = graph.len(), "Mounting view");
        match kind {
            ViewKind::Treemap => GraphView::Treemap(TreemapState::new(graph)),
            ViewKind::Sunburst => GraphView::Sunburst(SunburstState::new(graph)),
            ViewKind::Tree => GraphView::Tree(TreeState::new(graph)),
        }
    }

    pub fn kind(&self) -> ViewKind {
        match self {
            GraphView::Treemap(_) => ViewKind::Treemap,
            GraphView::Sunburst(_) => ViewKind::Sunburst,
            GraphView::Tree(_) => ViewKind::Tree,
        }
    }

    /// Draw, then apply whatever the user did this frame
    pub fn ui(&mut self, ui: &mut Ui, scheme: &ColorScheme) {
        match self {
            GraphView::Treemap(state) => {
                let action = render_treemap(ui, state, scheme);
                state.handle(&action);
            }
            GraphView::Sunburst(state) => {
                let action = render_sunburst(ui, state, scheme);
                state.handle(&action);
            }
            GraphView::Tree(state) => {
                let action = render_tree(ui, state, scheme);
                state.handle(&action);
            }
        }
    }
}
