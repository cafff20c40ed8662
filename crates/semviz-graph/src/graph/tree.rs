//! Collapsible node-link tree
//!
//! Left-to-right tree over the graph's visible children. Nodes at
//! `collapse_depth` and deeper start collapsed (children parked in
//! `hidden_children`). Clicking a non-leaf flips it and re-lays out the tree
//! with that node as the anchor:
//! - entering nodes start at the anchor's previous position
//! - exiting nodes travel to the anchor's new position and fade out
//!
//! Positions and opacities are [`Tween`]s, so a click during a running
//! transition starts from whatever is currently drawn.
//!
//! World coordinates: x = depth * `depth_spacing`, y = leaf row *
//! `row_height`. [`Camera2D`] maps them to the screen.

use std::collections::{HashMap, HashSet};

use egui::{Align, Align2, FontId, Layout, Pos2, Rect, RichText, Sense, Shape, Stroke, Ui, Vec2};
use semviz_types::TOPICS_SECTION;

use super::camera::Camera2D;
use super::colors::{render_legend, ColorMapper, ColorScheme};
use super::lod::apply_opacity;
use super::spatial::{SpatialIndex, SpatialNode};
use super::stats::TreeStats;
use super::tooltip::{describe, render_tooltip, TooltipState};
use super::transition::{Easing, Tween};
use crate::config::{global_config, TreeSettings};
use crate::model::{NodeId, SemanticGraph};

const LEGEND_HEIGHT: f32 = 20.0;
const LINK_SEGMENTS: usize = 16;
/// Extra world-space room on the right for leaf labels
const LABEL_ROOM: f32 = 160.0;

// =============================================================================
// LAYOUT
// =============================================================================

/// Positions for the visible subtree at `root`, in pre-order.
///
/// Leaves take consecutive rows in pre-order; a parent sits midway between
/// its first and last child.
pub fn layout_tree(graph: &SemanticGraph, root: NodeId, settings: &TreeSettings) -> Vec<(NodeId, Pos2)> {
    let mut out = Vec::new();
    let mut row = 0usize;
    place(graph, root, 0, settings, &mut row, &mut out);
    out
}

fn place(
    graph: &SemanticGraph,
    id: NodeId,
    depth: usize,
    settings: &TreeSettings,
    row: &mut usize,
    out: &mut Vec<(NodeId, Pos2)>,
) -> f32 {
    let slot = out.len();
    out.push((id, Pos2::ZERO));
    let children = &graph.node(id).children;
    let ys: Vec<f32> = children
        .iter()
        .map(|&child| place(graph, child, depth + 1, settings, row, out))
        .collect();
    let y = match (ys.first(), ys.last()) {
        (Some(first), Some(last)) => (first + last) / 2.0,
        _ => {
            let y = *row as f32 * settings.row_height;
            *row += 1;
            y
        }
    };
    out[slot].1 = Pos2::new(depth as f32 * settings.depth_spacing, y);
    y
}

/// Cubic link from parent to child with horizontal tangents at both ends
pub fn link_points(from: Pos2, to: Pos2, segments: usize) -> Vec<Pos2> {
    let mid_x = (from.x + to.x) / 2.0;
    let c1 = Pos2::new(mid_x, from.y);
    let c2 = Pos2::new(mid_x, to.y);
    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            let p = from.to_vec2() * (u * u * u)
                + c1.to_vec2() * (3.0 * u * u * t)
                + c2.to_vec2() * (3.0 * u * t * t)
                + to.to_vec2() * (t * t * t);
            p.to_pos2()
        })
        .collect()
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone)]
struct NodeMotion {
    pos: Tween<Pos2>,
    opacity: Tween<f32>,
    /// Left the layout; removed once its transition finishes
    exiting: bool,
}

impl NodeMotion {
    fn settled(pos: Pos2) -> Self {
        Self {
            pos: Tween::settled(pos),
            opacity: Tween::settled(1.0),
            exiting: false,
        }
    }

    fn entering(from: Pos2, to: Pos2, duration: f32) -> Self {
        Self {
            pos: Tween::new(from, to, duration, Easing::EaseInOutCubic),
            opacity: Tween::new(0.0, 1.0, duration, Easing::EaseInOutCubic),
            exiting: false,
        }
    }

    fn retarget(&mut self, pos: Pos2, opacity: f32, duration: f32) {
        self.pos.retarget(pos, duration, Easing::EaseInOutCubic);
        self.opacity.retarget(opacity, duration, Easing::EaseInOutCubic);
    }

    fn tick(&mut self, dt: f32) -> bool {
        let moving = self.pos.tick(dt);
        self.opacity.tick(dt) || moving
    }
}

/// Actions returned from [`render_tree`]
#[derive(Debug, Clone, PartialEq)]
pub enum TreeAction {
    None,
    Toggle(NodeId),
    Reset,
    ExpandAllTopics,
    Fit,
}

#[derive(Debug)]
pub struct TreeState {
    graph: SemanticGraph,
    colors: ColorMapper,
    settings: TreeSettings,
    /// Target positions of visible nodes, pre-order
    layout: Vec<(NodeId, Pos2)>,
    motion: HashMap<NodeId, NodeMotion>,
    index: SpatialIndex,
    bounds: Rect,
    stats: TreeStats,
    camera: Camera2D,
    needs_fit: bool,
    fitted: bool,
    hovered: Option<NodeId>,
    tooltip: TooltipState,
}

impl TreeState {
    /// Build from a prepared graph, applying the initial collapse policy
    pub fn new(mut graph: SemanticGraph) -> Self {
        let config = global_config();
        let settings = config.tree.clone();
        apply_collapse_policy(&mut graph, settings.collapse_depth);
        let colors = ColorMapper::for_graph(&graph, config.shading.tree);
        let mut state = Self {
            graph,
            colors,
            settings,
            layout: Vec::new(),
            motion: HashMap::new(),
            index: SpatialIndex::new(),
            bounds: Rect::NOTHING,
            stats: TreeStats::default(),
            camera: Camera2D::new(),
            needs_fit: true,
            fitted: false,
            hovered: None,
            tooltip: TooltipState::default(),
        };
        state.relayout(None);
        state
    }

    pub fn graph(&self) -> &SemanticGraph {
        &self.graph
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    /// World bounds of the current layout
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Target position of a visible node
    pub fn position(&self, id: NodeId) -> Option<Pos2> {
        self.layout.iter().find(|(n, _)| *n == id).map(|(_, p)| *p)
    }

    /// Position currently drawn (visible or exiting nodes)
    pub fn shown_position(&self, id: NodeId) -> Option<Pos2> {
        self.motion.get(&id).map(|m| m.pos.value())
    }

    pub fn shown_opacity(&self, id: NodeId) -> Option<f32> {
        self.motion.get(&id).map(|m| m.opacity.value())
    }

    pub fn is_exiting(&self, id: NodeId) -> bool {
        self.motion.get(&id).is_some_and(|m| m.exiting)
    }

    pub fn is_animating(&self) -> bool {
        self.motion
            .values()
            .any(|m| m.pos.is_animating() || m.opacity.is_animating())
    }

    /// Flip a non-leaf node. Returns false for leaves.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        let Some(node) = self.graph.get(id) else {
            return false;
        };
        if node.is_leaf() {
            return false;
        }
        let expanding = node.is_collapsed();
        if expanding {
            self.graph.expand(id);
        } else {
            self.graph.collapse(id);
        }
        tracing::debug!(node = %self.graph.node(id).name(), expanding, "Tree toggle");
        self.relayout(Some(id));
        true
    }

    /// Back to the initial policy: depth < `collapse_depth` expanded, the rest collapsed
    pub fn reset(&mut self) {
        apply_collapse_policy(&mut self.graph, self.settings.collapse_depth);
        tracing::debug!("Tree reset");
        self.relayout(Some(self.graph.root()));
        self.needs_fit = true;
    }

    /// Expand the topics section, every topic under it, and every topic
    /// under a grouping container one level down
    pub fn expand_all_topics(&mut self) -> bool {
        let Some(topics) = self.graph.section_node(TOPICS_SECTION) else {
            return false;
        };
        self.graph.expand(topics);
        let children: Vec<NodeId> = self.graph.node(topics).logical_children().collect();
        for child in children {
            self.graph.expand(child);
            if self.is_grouping_container(child) {
                let grandchildren: Vec<NodeId> =
                    self.graph.node(child).logical_children().collect();
                for grandchild in grandchildren {
                    self.graph.expand(grandchild);
                }
            }
        }
        tracing::debug!("Tree expand all topics");
        self.relayout(Some(topics));
        true
    }

    /// A container that groups topics rather than being one
    fn is_grouping_container(&self, id: NodeId) -> bool {
        let node = self.graph.node(id);
        node.data.base_view.is_none()
            && !node.is_reference()
            && !node.is_leaf()
            && !node
                .logical_children()
                .any(|c| self.graph.node(c).is_reference())
    }

    pub fn fit(&mut self) {
        self.needs_fit = true;
    }

    pub fn handle(&mut self, action: &TreeAction) {
        match action {
            TreeAction::None => {}
            TreeAction::Toggle(id) => {
                self.toggle(*id);
            }
            TreeAction::Reset => self.reset(),
            TreeAction::ExpandAllTopics => {
                self.expand_all_topics();
            }
            TreeAction::Fit => self.fit(),
        }
    }

    /// Recompute the layout. With an anchor, nodes animate relative to it;
    /// without one they appear in place.
    fn relayout(&mut self, anchor: Option<NodeId>) {
        let root = self.graph.root();
        let layout = layout_tree(&self.graph, root, &self.settings);
        let duration = global_config().animation.tree_secs();

        match anchor {
            None => {
                self.motion = layout
                    .iter()
                    .map(|&(id, pos)| (id, NodeMotion::settled(pos)))
                    .collect();
            }
            Some(anchor) => {
                let anchor_before = self.shown_position(anchor).unwrap_or(Pos2::ZERO);
                let anchor_after = layout
                    .iter()
                    .find(|(id, _)| *id == anchor)
                    .map(|(_, p)| *p)
                    .unwrap_or(anchor_before);
                let visible: HashSet<NodeId> = layout.iter().map(|(id, _)| *id).collect();

                for &(id, target) in &layout {
                    match self.motion.get_mut(&id) {
                        Some(motion) => {
                            motion.exiting = false;
                            motion.retarget(target, 1.0, duration);
                        }
                        None => {
                            self.motion
                                .insert(id, NodeMotion::entering(anchor_before, target, duration));
                        }
                    }
                }
                for (id, motion) in self.motion.iter_mut() {
                    if !visible.contains(id) && !motion.exiting {
                        motion.exiting = true;
                        motion.retarget(anchor_after, 0.0, duration);
                    }
                }
            }
        }

        let points: Vec<Pos2> = layout.iter().map(|(_, p)| *p).collect();
        self.bounds = if points.is_empty() {
            Rect::NOTHING
        } else {
            let rect = Rect::from_points(&points);
            Rect::from_min_max(rect.min, rect.max + Vec2::new(LABEL_ROOM, 0.0))
        };
        let radius = self.settings.node_radius;
        self.index = SpatialIndex::from_nodes(
            layout
                .iter()
                .map(|&(id, p)| SpatialNode::circle(id, [p.x, p.y], radius)),
        );
        self.layout = layout;
        self.stats = TreeStats::compute(&self.graph, root);
        tracing::debug!(
            visible = self.stats.visible,
            expanded = self.stats.expanded,
            collapsed = self.stats.collapsed,
            "Tree layout"
        );
    }

    /// Advance transitions and drop finished exits. Returns true while animating.
    pub fn tick(&mut self, dt: f32) -> bool {
        let mut animating = false;
        for motion in self.motion.values_mut() {
            animating |= motion.tick(dt);
        }
        self.motion
            .retain(|_, m| !m.exiting || m.pos.is_animating() || m.opacity.is_animating());
        animating
    }

    /// Visible node under a screen position
    pub fn node_at(&self, screen_pos: Pos2, screen_rect: Rect) -> Option<NodeId> {
        let world = self.camera.screen_to_world(screen_pos, screen_rect);
        let threshold = 4.0 / self.camera.zoom().max(f32::EPSILON);
        self.index
            .hit_test([world.x, world.y], threshold)
            .map(|n| n.id)
    }
}

/// Expand everything shallower than `collapse_depth`, collapse the rest
pub fn apply_collapse_policy(graph: &mut SemanticGraph, collapse_depth: usize) {
    for id in graph.logical_descendants(graph.root()) {
        if graph.node(id).depth < collapse_depth {
            graph.expand(id);
        } else {
            graph.collapse(id);
        }
    }
}

// =============================================================================
// RENDER
// =============================================================================

/// Draw toolbar, links and nodes; returns the user's action
pub fn render_tree(ui: &mut Ui, state: &mut TreeState, scheme: &ColorScheme) -> TreeAction {
    let mut action = TreeAction::None;

    ui.horizontal(|ui| {
        if ui.button("Reset").clicked() {
            action = TreeAction::Reset;
        }
        if ui.button("Expand all topics").clicked() {
            action = TreeAction::ExpandAllTopics;
        }
        if ui.button("Fit").clicked() {
            action = TreeAction::Fit;
        }
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.label(
                RichText::new(state.stats.to_string())
                    .small()
                    .color(scheme.muted_text),
            );
        });
    });

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let full = response.rect;
    painter.rect_filled(full, 0.0, scheme.background);
    let (canvas, legend_rect) = full.split_top_bottom_at_y(full.bottom() - LEGEND_HEIGHT);

    if state.needs_fit {
        state
            .camera
            .fit_to_bounds(state.bounds, canvas, state.settings.fit_padding);
        if !state.fitted {
            state.camera.snap_to_target();
            state.fitted = true;
        }
        state.needs_fit = false;
    }

    let dt = ui.input(|i| i.stable_dt);
    state.camera.update(dt);
    let animating = state.tick(dt);

    if response.dragged() {
        state.camera.pan(response.drag_delta());
    }
    if let Some(pointer) = response.hover_pos() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            state.camera.zoom_at((scroll * 0.002).exp(), pointer, canvas);
        }
    }

    let painter = painter.with_clip_rect(canvas);
    let zoom = state.camera.zoom();
    let to_screen = |p: Pos2| state.camera.world_to_screen(p, canvas);

    // Links
    for (&id, motion) in &state.motion {
        let Some(parent) = state.graph.parent(id) else {
            continue;
        };
        let Some(parent_pos) = state.shown_position(parent) else {
            continue;
        };
        let color = apply_opacity(scheme.stroke, motion.opacity.value());
        painter.add(Shape::line(
            link_points(to_screen(parent_pos), to_screen(motion.pos.value()), LINK_SEGMENTS),
            Stroke::new(1.0, color),
        ));
    }

    // Nodes and labels
    let font = FontId::proportional((11.0 * zoom).clamp(8.0, 14.0));
    for (&id, motion) in &state.motion {
        let node = state.graph.node(id);
        let opacity = motion.opacity.value();
        let pos = to_screen(motion.pos.value());
        let radius = state.settings.node_radius * zoom.clamp(0.5, 2.0);
        let color = apply_opacity(state.colors.color_of(node), opacity);

        if node.is_collapsed() {
            painter.circle_filled(pos, radius, color);
        } else {
            painter.circle(pos, radius, apply_opacity(scheme.background, opacity), Stroke::new(1.5, color));
        }
        if state.hovered == Some(id) {
            painter.circle_stroke(pos, radius + 3.0, Stroke::new(1.5, scheme.highlight));
        }

        let text_color = apply_opacity(scheme.text, opacity);
        if node.is_expanded() {
            painter.text(pos - Vec2::new(radius + 4.0, 0.0), Align2::RIGHT_CENTER, node.display_name(), font.clone(), text_color);
        } else {
            painter.text(pos + Vec2::new(radius + 4.0, 0.0), Align2::LEFT_CENTER, node.display_name(), font.clone(), text_color);
        }
    }

    render_legend(&painter, &state.colors.legend(), legend_rect.shrink(2.0), scheme);

    let pointer = response.hover_pos();
    state.hovered = pointer.and_then(|p| state.node_at(p, canvas));
    if let (Some(id), Some(pos)) = (state.hovered, pointer) {
        if response.clicked() {
            action = TreeAction::Toggle(id);
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

    if animating || state.camera.is_animating() {
        ui.ctx().request_repaint();
    }
    action
}
