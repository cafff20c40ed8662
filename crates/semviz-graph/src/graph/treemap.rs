//! Drill-down treemap
//!
//! # State machine
//!
//! `root` is always a node of the original graph. Rendering a root decides
//! between two tilings:
//! - summary: the root's subtree is projected ([`project`]) so field groups
//!   and views collapse into single tiles
//! - detail: the root's visible children are all field leaves, so the real
//!   subtree is tiled directly
//!
//! Clicking a tile drills into the node behind it (references jump to the
//! view they name). Every distinct root visited is kept on a breadcrumb
//! stack; selecting an earlier entry truncates the stack back to it.
//!
//! # EGUI-RULES
//! - [`render_treemap`] draws and returns a [`TreemapAction`]
//! - [`TreemapState::handle`] applies the action; no callbacks

use std::cmp::Ordering;

use egui::{Align, Align2, Color32, FontId, Layout, Pos2, Rect, RichText, Sense, Stroke, Ui};

use super::colors::{render_legend, ColorMapper, ColorScheme, ON_FILL_TEXT};
use super::lod::{apply_opacity, fit_label, LabelDetail};
use super::spatial::{SpatialIndex, SpatialNode};
use super::stats::TreemapStats;
use super::tooltip::{describe, render_tooltip, TooltipState};
use super::transition::{Easing, Tween};
use crate::config::{global_config, TreemapSettings};
use crate::model::project::{all_children_are_fields, unprojected};
use crate::model::{project, NodeId, ProjectedKind, ProjectedNode, SemanticGraph, ViewIndex};

/// Golden ratio, the target tile aspect ratio
const PHI: f32 = 1.618_034;

const LEGEND_HEIGHT: f32 = 20.0;
const CHAR_WIDTH: f32 = 6.5;

// =============================================================================
// SQUARIFIED TILING
// =============================================================================

/// Partition `bounds` into rectangles with areas proportional to `values`.
///
/// Values are laid out in the given order, grouped into rows whose worst
/// aspect ratio stays closest to [`PHI`]. Zero values get zero-area rects.
pub fn squarify(values: &[f32], bounds: Rect) -> Vec<Rect> {
    let n = values.len();
    let mut out = vec![Rect::from_min_max(bounds.min, bounds.min); n];
    let mut remaining: f32 = values.iter().sum();
    if n == 0 || remaining <= 0.0 {
        return out;
    }

    let (mut x0, mut y0, x1, y1) = (bounds.min.x, bounds.min.y, bounds.max.x, bounds.max.y);
    let mut i0 = 0;
    let mut i1 = 0;

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // First non-empty value starts the row
        let mut sum = values[i1];
        i1 += 1;
        while sum == 0.0 && i1 < n {
            sum = values[i1];
            i1 += 1;
        }

        let mut min_value = sum;
        let mut max_value = sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * PHI);
        let mut beta = sum * sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        while i1 < n {
            let value = values[i1];
            sum += value;
            min_value = min_value.min(value);
            max_value = max_value.max(value);
            beta = sum * sum * alpha;
            let ratio = (max_value / beta).max(beta / min_value);
            if ratio > min_ratio {
                sum -= value;
                break;
            }
            min_ratio = ratio;
            i1 += 1;
        }

        let share = if remaining > 0.0 { sum / remaining } else { 0.0 };
        let row = i0..i1;
        if dx < dy {
            let top = y0;
            let bottom = if dy != 0.0 {
                y0 += dy * share;
                y0
            } else {
                y1
            };
            dice(&values[row.clone()], &mut out[row], x0, top, x1, bottom);
        } else {
            let left = x0;
            let right = if dx != 0.0 {
                x0 += dx * share;
                x0
            } else {
                x1
            };
            slice(&values[row.clone()], &mut out[row], left, y0, right, y1);
        }
        remaining -= sum;
        i0 = i1;
    }
    out
}

/// Split horizontally
fn dice(values: &[f32], out: &mut [Rect], x0: f32, y0: f32, x1: f32, y1: f32) {
    let total: f32 = values.iter().sum();
    let k = if total > 0.0 { (x1 - x0) / total } else { 0.0 };
    let mut x = x0;
    for (value, rect) in values.iter().zip(out.iter_mut()) {
        let next = x + value * k;
        *rect = Rect::from_min_max(Pos2::new(x, y0), Pos2::new(next, y1));
        x = next;
    }
}

/// Split vertically
fn slice(values: &[f32], out: &mut [Rect], x0: f32, y0: f32, x1: f32, y1: f32) {
    let total: f32 = values.iter().sum();
    let k = if total > 0.0 { (y1 - y0) / total } else { 0.0 };
    let mut y = y0;
    for (value, rect) in values.iter().zip(out.iter_mut()) {
        let next = y + value * k;
        *rect = Rect::from_min_max(Pos2::new(x0, y), Pos2::new(x1, next));
        y = next;
    }
}

// =============================================================================
// TILES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TreemapTile {
    /// Original node behind the tile
    pub source: NodeId,
    pub kind: ProjectedKind,
    pub value: f64,
    pub rect: Rect,
    /// Depth below the rendered root
    pub depth: usize,
    pub is_container: bool,
}

/// Lay out a projected tree inside `bounds`.
///
/// Tiles come out in pre-order with the root first. Containers reserve a
/// header strip for their label; siblings are separated by the inner padding.
/// Coordinates are rounded to whole pixels.
pub fn layout_tiles(tree: &ProjectedNode, bounds: Rect, settings: &TreemapSettings) -> Vec<TreemapTile> {
    let mut tiles = Vec::with_capacity(tree.len());
    position(tree, bounds, 0, 0.0, settings, &mut tiles);
    tiles
}

fn position(
    node: &ProjectedNode,
    rect: Rect,
    depth: usize,
    pad: f32,
    settings: &TreemapSettings,
    out: &mut Vec<TreemapTile>,
) {
    let rect = inset(rect, pad, pad, pad, pad);
    out.push(TreemapTile {
        source: node.source,
        kind: node.kind,
        value: node.value,
        rect: round_rect(rect),
        depth,
        is_container: !node.children.is_empty(),
    });
    if node.children.is_empty() {
        return;
    }

    let half = settings.padding_inner / 2.0;
    let outer = settings.padding_outer - half;
    let top = if depth == 0 {
        outer
    } else {
        settings.header_height - half
    };
    let inner = inset(rect, top, outer, outer, outer);

    let mut children: Vec<&ProjectedNode> = node.children.iter().collect();
    children.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    let values: Vec<f32> = children.iter().map(|c| c.value.max(0.0) as f32).collect();

    for (child, child_rect) in children.into_iter().zip(squarify(&values, inner)) {
        position(child, child_rect, depth + 1, half, settings, out);
    }
}

/// Shrink a rect; an axis that would invert collapses to its midpoint
fn inset(rect: Rect, top: f32, right: f32, bottom: f32, left: f32) -> Rect {
    let collapse = |a: f32, b: f32| {
        if b < a {
            let mid = (a + b) / 2.0;
            (mid, mid)
        } else {
            (a, b)
        }
    };
    let (x0, x1) = collapse(rect.min.x + left, rect.max.x - right);
    let (y0, y1) = collapse(rect.min.y + top, rect.max.y - bottom);
    Rect::from_min_max(Pos2::new(x0, y0), Pos2::new(x1, y1))
}

fn round_rect(rect: Rect) -> Rect {
    Rect::from_min_max(
        Pos2::new(rect.min.x.round(), rect.min.y.round()),
        Pos2::new(rect.max.x.round(), rect.max.y.round()),
    )
}

// =============================================================================
// STATE
// =============================================================================

/// Actions returned from [`render_treemap`]
#[derive(Debug, Clone, PartialEq)]
pub enum TreemapAction {
    None,
    /// A tile was clicked
    Click(NodeId),
    /// A breadcrumb entry was selected
    SelectBreadcrumb(usize),
}

#[derive(Debug)]
pub struct TreemapState {
    graph: SemanticGraph,
    views: ViewIndex,
    colors: ColorMapper,
    settings: TreemapSettings,
    root: NodeId,
    breadcrumbs: Vec<NodeId>,
    is_detail: bool,
    tree: ProjectedNode,
    stats: TreemapStats,
    /// Tiles for `bounds` (root excluded)
    tiles: Vec<TreemapTile>,
    index: SpatialIndex,
    bounds: Rect,
    fade: Tween<f32>,
    hovered: Option<NodeId>,
    tooltip: TooltipState,
}

impl TreemapState {
    /// Start at the document root. `graph` must already be prepared.
    pub fn new(graph: SemanticGraph) -> Self {
        let config = global_config();
        let views = ViewIndex::build(&graph);
        let colors = ColorMapper::for_graph(&graph, config.shading.treemap);
        let root = graph.root();
        let tree = project(&graph, root, true);
        let stats = TreemapStats::compute(&graph, &tree, false);
        let mut state = Self {
            graph,
            views,
            colors,
            settings: config.treemap.clone(),
            root,
            breadcrumbs: Vec::new(),
            is_detail: false,
            tree,
            stats,
            tiles: Vec::new(),
            index: SpatialIndex::new(),
            bounds: Rect::NOTHING,
            fade: Tween::settled(1.0),
            hovered: None,
            tooltip: TooltipState::default(),
        };
        state.render(root);
        state
    }

    pub fn graph(&self) -> &SemanticGraph {
        &self.graph
    }

    pub fn colors(&self) -> &ColorMapper {
        &self.colors
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn breadcrumbs(&self) -> &[NodeId] {
        &self.breadcrumbs
    }

    pub fn is_detail(&self) -> bool {
        self.is_detail
    }

    pub fn stats(&self) -> TreemapStats {
        self.stats
    }

    /// Tiled tree for the current root
    pub fn tree(&self) -> &ProjectedNode {
        &self.tree
    }

    pub fn tiles(&self) -> &[TreemapTile] {
        &self.tiles
    }

    /// Make `id` the root: re-tile, record it on the breadcrumb stack, fade in
    pub fn render(&mut self, id: NodeId) {
        self.root = id;
        self.is_detail = all_children_are_fields(&self.graph, id);
        self.tree = if self.is_detail {
            unprojected(&self.graph, id)
        } else {
            project(&self.graph, id, true)
        };
        self.stats = TreemapStats::compute(&self.graph, &self.tree, self.is_detail);

        match self.breadcrumbs.iter().position(|&b| b == id) {
            Some(pos) => self.breadcrumbs.truncate(pos + 1),
            None => self.breadcrumbs.push(id),
        }

        self.fade.restart(
            0.0,
            1.0,
            global_config().animation.treemap_fade_secs(),
            Easing::EaseOutCubic,
        );
        self.bounds = Rect::NOTHING;
        self.hovered = None;

        tracing::debug!(
            root = %self.graph.node(id).name(),
            detail = self.is_detail,
            depth = self.breadcrumbs.len(),
            "Treemap render"
        );
    }

    /// Where a click on the tile for `id` leads, if anywhere
    pub fn drill_target(&self, id: NodeId) -> Option<NodeId> {
        let node = self.graph.get(id)?;
        if id == self.root || node.is_field_leaf() {
            return None;
        }
        if node.is_reference() {
            return self.views.resolve(node.name()).map(|m| m.view());
        }
        if node.is_leaf() {
            return None;
        }
        Some(id)
    }

    /// Click on a tile. Returns the new root if the click drilled.
    pub fn click(&mut self, id: NodeId) -> Option<NodeId> {
        let target = self.drill_target(id)?;
        self.render(target);
        Some(target)
    }

    /// Return to breadcrumb entry `index`, dropping everything after it
    pub fn select_breadcrumb(&mut self, index: usize) {
        if let Some(&id) = self.breadcrumbs.get(index) {
            self.render(id);
        }
    }

    pub fn handle(&mut self, action: &TreemapAction) {
        match action {
            TreemapAction::None => {}
            TreemapAction::Click(id) => {
                self.click(*id);
            }
            TreemapAction::SelectBreadcrumb(index) => self.select_breadcrumb(*index),
        }
    }

    /// Advance the fade. Returns true while animating.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.fade.tick(dt)
    }

    pub fn opacity(&self) -> f32 {
        self.fade.value()
    }

    /// Re-tile for `bounds` if the surface size changed since the last layout
    pub fn ensure_layout(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.tiles = layout_tiles(&self.tree, bounds, &self.settings);
        self.tiles.remove(0);
        self.index = SpatialIndex::from_nodes(self.tiles.iter().map(|t| {
            SpatialNode::rect(
                t.source,
                [t.rect.min.x, t.rect.min.y],
                [t.rect.max.x, t.rect.max.y],
                t.depth,
            )
        }));
    }

    /// Deepest tile under `pos`
    pub fn tile_at(&self, pos: Pos2) -> Option<NodeId> {
        self.index.topmost_at([pos.x, pos.y]).map(|n| n.id)
    }
}

// =============================================================================
// RENDER
// =============================================================================

/// Draw the breadcrumb bar and tiles; returns the user's action
pub fn render_treemap(ui: &mut Ui, state: &mut TreemapState, scheme: &ColorScheme) -> TreemapAction {
    let mut action = TreemapAction::None;
    let animating = state.tick(ui.input(|i| i.stable_dt));

    ui.horizontal(|ui| {
        let last = state.breadcrumbs.len().saturating_sub(1);
        for (i, &id) in state.breadcrumbs.iter().enumerate() {
            if i > 0 {
                ui.label(RichText::new("›").color(scheme.muted_text));
            }
            let name = state.graph.node(id).display_name().to_string();
            if i == last {
                ui.label(RichText::new(name).strong().color(scheme.text));
            } else if ui.link(name).clicked() {
                action = TreemapAction::SelectBreadcrumb(i);
            }
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(
                RichText::new(state.stats.to_string())
                    .small()
                    .color(scheme.muted_text),
            );
        });
    });

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
    let full = response.rect;
    painter.rect_filled(full, 0.0, scheme.background);

    let (map_rect, legend_rect) = full.split_top_bottom_at_y(full.bottom() - LEGEND_HEIGHT);
    state.ensure_layout(map_rect);

    let pointer = response.hover_pos();
    state.hovered = pointer.and_then(|p| state.tile_at(p));

    let opacity = state.opacity();
    for tile in &state.tiles {
        paint_tile(&painter, state, tile, opacity);
    }
    if let Some(tile) = state
        .hovered
        .and_then(|id| state.tiles.iter().find(|t| t.source == id))
    {
        painter.rect_stroke(
            tile.rect,
            state.settings.corner_radius,
            Stroke::new(2.0, scheme.highlight),
        );
    }

    render_legend(&painter, &state.colors.legend(), legend_rect.shrink(2.0), scheme);

    if let (Some(id), Some(pos)) = (state.hovered, pointer) {
        if response.clicked() {
            action = TreemapAction::Click(id);
        }
        let content = describe(&state.graph, id);
        render_tooltip(
            ui.ctx(),
            response.id.with("tooltip"),
            &mut state.tooltip,
            &content,
            pos,
            full,
            &global_config().tooltip,
            scheme,
        );
    }

    if animating {
        ui.ctx().request_repaint();
    }
    action
}

fn paint_tile(painter: &egui::Painter, state: &TreemapState, tile: &TreemapTile, opacity: f32) {
    let node = state.graph.node(tile.source);
    let settings = &state.settings;
    let fill = apply_opacity(state.colors.color_of(node), opacity);
    painter.rect_filled(tile.rect, settings.corner_radius, fill);
    painter.rect_stroke(
        tile.rect,
        settings.corner_radius,
        Stroke::new(0.5, Color32::from_black_alpha(60)),
    );

    let text = apply_opacity(ON_FILL_TEXT, opacity);
    let width = tile.rect.width() - 8.0;

    if tile.is_container {
        if tile.rect.height() >= settings.header_height {
            if let Some(title) = fit_label(node.display_name(), width, CHAR_WIDTH) {
                painter.text(
                    tile.rect.left_top() + egui::vec2(4.0, 3.0),
                    Align2::LEFT_TOP,
                    title,
                    FontId::proportional(11.0),
                    text,
                );
            }
        }
        return;
    }

    let detail = LabelDetail::for_tile(tile.rect.width(), tile.rect.height(), settings);
    if !detail.shows_title() {
        return;
    }
    let Some(title) = fit_label(node.display_name(), width, CHAR_WIDTH) else {
        return;
    };
    painter.text(
        tile.rect.left_top() + egui::vec2(4.0, 4.0),
        Align2::LEFT_TOP,
        title,
        FontId::proportional(11.0),
        text,
    );
    if detail.shows_subtitle() {
        painter.text(
            tile.rect.left_top() + egui::vec2(4.0, 18.0),
            Align2::LEFT_TOP,
            subtitle(state, tile),
            FontId::proportional(10.0),
            apply_opacity(text, 0.75),
        );
    }
}

fn subtitle(state: &TreemapState, tile: &TreemapTile) -> String {
    let node = state.graph.node(tile.source);
    match tile.kind {
        ProjectedKind::Group | ProjectedKind::View => format!("{} fields", node.count),
        ProjectedKind::Passthrough => match node.data.field_type {
            Some(field_type) => field_type.to_string(),
            None => format!("{}", tile.value),
        },
    }
}
