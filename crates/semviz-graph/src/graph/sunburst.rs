//! Zoomable sunburst
//!
//! A radial partition of the whole enriched hierarchy: angle is proportional
//! to `count`, radius is depth. Every arc keeps its static partition `base`,
//! the displayed `current` rect and the `target` of the running transition.
//!
//! Zooming to a focus remaps every target relative to the focus span
//! (angle stretched to the full circle, rings shifted by the focus depth).
//! Only rings 1..=`visible_rings` around the centre are drawn; the centre
//! circle stands for the focus and zooms back out to its parent.
//!
//! Angles follow the usual sunburst convention: 0 at twelve o'clock,
//! increasing clockwise.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, Mesh, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use super::colors::{render_legend, ColorMapper, ColorScheme, ON_FILL_TEXT};
use super::lod::{apply_opacity, truncate_label};
use super::tooltip::{describe, render_tooltip, TooltipState};
use super::transition::{Easing, Lerp, Timeline};
use crate::config::{global_config, SunburstSettings};
use crate::model::{NodeId, SemanticGraph};

const LEGEND_HEIGHT: f32 = 20.0;

// =============================================================================
// ARC RECT
// =============================================================================

/// Angular span `[x0, x1]` (radians) by ring span `[y0, y1]` (depth units)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArcRect {
    pub x0: f32,
    pub x1: f32,
    pub y0: f32,
    pub y1: f32,
}

impl ArcRect {
    pub fn new(x0: f32, x1: f32, y0: f32, y1: f32) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn span(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Within rings 1..=`rings` and not collapsed to zero angle
    pub fn is_visible(&self, rings: f32) -> bool {
        self.y1 <= rings && self.y0 >= 1.0 && self.x1 > self.x0
    }

    /// Visible and large enough (angle x rings) to carry a label
    pub fn is_label_visible(&self, rings: f32, min_area: f32) -> bool {
        self.is_visible(rings) && (self.y1 - self.y0) * (self.x1 - self.x0) > min_area
    }
}

impl Lerp for ArcRect {
    fn interpolate(self, to: Self, t: f32) -> Self {
        Self {
            x0: self.x0.interpolate(to.x0, t),
            x1: self.x1.interpolate(to.x1, t),
            y0: self.y0.interpolate(to.y0, t),
            y1: self.y1.interpolate(to.y1, t),
        }
    }
}

// =============================================================================
// PARTITION
// =============================================================================

/// Radial partition of the visible subtree at `root`, in pre-order.
///
/// The root spans the full circle at ring 0. Children split their parent's
/// angle by `count`, largest first (ties keep document order), one ring per
/// depth level.
pub fn partition(graph: &SemanticGraph, root: NodeId) -> Vec<(NodeId, ArcRect)> {
    let mut out = Vec::with_capacity(graph.len());
    let mut stack = vec![(root, ArcRect::new(0.0, TAU, 0.0, 1.0))];
    while let Some((id, rect)) = stack.pop() {
        out.push((id, rect));
        let node = graph.node(id);
        let mut children: Vec<NodeId> = node.children.clone();
        children.sort_by(|&a, &b| {
            graph
                .node(b)
                .count
                .partial_cmp(&graph.node(a).count)
                .unwrap_or(Ordering::Equal)
        });
        let total: f64 = children.iter().map(|&c| graph.node(c).count.max(0.0)).sum();
        let k = if total > 0.0 {
            rect.span() as f64 / total
        } else {
            0.0
        };
        let mut x = rect.x0 as f64;
        let mut placed = Vec::with_capacity(children.len());
        for child in children {
            let next = x + graph.node(child).count.max(0.0) * k;
            placed.push((
                child,
                ArcRect::new(x as f32, next as f32, rect.y1, rect.y1 + 1.0),
            ));
            x = next;
        }
        stack.extend(placed.into_iter().rev());
    }
    out
}

/// Where `arc` lands when `focus` fills the circle
pub fn zoom_target(arc: ArcRect, focus: ArcRect, focus_depth: f32) -> ArcRect {
    let span = focus.span();
    let remap = |x: f32| ((x - focus.x0) / span).clamp(0.0, 1.0) * TAU;
    ArcRect {
        x0: remap(arc.x0),
        x1: remap(arc.x1),
        y0: (arc.y0 - focus_depth).max(0.0),
        y1: (arc.y1 - focus_depth).max(0.0),
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct SunburstArc {
    pub id: NodeId,
    pub depth: usize,
    pub has_children: bool,
    /// Static partition rect
    pub base: ArcRect,
    /// Rect being displayed
    pub current: ArcRect,
    /// Rect when the running transition started
    from: ArcRect,
    /// Rect at the end of the running transition
    pub target: ArcRect,
}

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunburstHit {
    Center,
    Arc(NodeId),
}

/// Actions returned from [`render_sunburst`]
#[derive(Debug, Clone, PartialEq)]
pub enum SunburstAction {
    None,
    /// Focus an arc; `slow` selects the slow-motion duration
    ZoomTo { id: NodeId, slow: bool },
    /// Focus the parent of the current focus
    ZoomOut { slow: bool },
}

#[derive(Debug)]
pub struct SunburstState {
    graph: SemanticGraph,
    colors: ColorMapper,
    settings: SunburstSettings,
    arcs: Vec<SunburstArc>,
    lookup: HashMap<NodeId, usize>,
    focus: NodeId,
    timeline: Timeline,
    bounds: Rect,
    center: Pos2,
    radius: f32,
    hovered: Option<SunburstHit>,
    tooltip: TooltipState,
}

impl SunburstState {
    /// Partition the prepared `graph` with the root in focus
    pub fn new(graph: SemanticGraph) -> Self {
        let config = global_config();
        let colors = ColorMapper::for_graph(&graph, config.shading.sunburst);
        let arcs: Vec<SunburstArc> = partition(&graph, graph.root())
            .into_iter()
            .map(|(id, base)| {
                let node = graph.node(id);
                SunburstArc {
                    id,
                    depth: node.depth,
                    has_children: !node.children.is_empty(),
                    base,
                    current: base,
                    from: base,
                    target: base,
                }
            })
            .collect();
        let lookup = arcs.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
        let focus = graph.root();
        Self {
            graph,
            colors,
            settings: config.sunburst.clone(),
            arcs,
            lookup,
            focus,
            timeline: Timeline::finished(),
            bounds: Rect::NOTHING,
            center: Pos2::ZERO,
            radius: 0.0,
            hovered: None,
            tooltip: TooltipState::default(),
        }
    }

    pub fn graph(&self) -> &SemanticGraph {
        &self.graph
    }

    pub fn focus(&self) -> NodeId {
        self.focus
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn arcs(&self) -> &[SunburstArc] {
        &self.arcs
    }

    pub fn arc(&self, id: NodeId) -> Option<&SunburstArc> {
        self.lookup.get(&id).map(|&i| &self.arcs[i])
    }

    pub fn is_animating(&self) -> bool {
        !self.timeline.is_finished()
    }

    /// Focus `id` and start the transition from what is currently shown.
    /// Returns false (nothing changes) for unknown ids or zero-angle arcs.
    pub fn zoom_to(&mut self, id: NodeId, slow: bool) -> bool {
        let Some(focus) = self.arc(id) else {
            return false;
        };
        if focus.base.span() <= 0.0 {
            tracing::debug!(node = %self.graph.node(id).name(), "Ignoring zoom to empty arc");
            return false;
        }
        let (focus_rect, focus_depth) = (focus.base, focus.depth as f32);

        for arc in &mut self.arcs {
            arc.from = arc.current;
            arc.target = zoom_target(arc.base, focus_rect, focus_depth);
        }
        self.focus = id;
        self.timeline = Timeline::new(
            global_config().animation.sunburst_secs(slow),
            Easing::EaseInOutCubic,
        );
        tracing::debug!(
            focus = %self.graph.node(id).name(),
            depth = focus_depth,
            slow,
            "Sunburst zoom"
        );
        true
    }

    /// Focus the parent of the current focus (the root stays the root)
    pub fn zoom_out(&mut self, slow: bool) -> bool {
        let parent = self
            .graph
            .parent(self.focus)
            .unwrap_or_else(|| self.graph.root());
        self.zoom_to(parent, slow)
    }

    /// Click on an arc: only arcs with children zoom
    pub fn click(&mut self, id: NodeId, slow: bool) -> bool {
        match self.arc(id) {
            Some(arc) if arc.has_children => self.zoom_to(id, slow),
            _ => false,
        }
    }

    pub fn handle(&mut self, action: &SunburstAction) {
        match *action {
            SunburstAction::None => {}
            SunburstAction::ZoomTo { id, slow } => {
                self.click(id, slow);
            }
            SunburstAction::ZoomOut { slow } => {
                self.zoom_out(slow);
            }
        }
    }

    /// Advance the transition. Returns true while animating.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.timeline.is_finished() {
            return false;
        }
        let running = self.timeline.tick(dt);
        if running {
            let t = self.timeline.progress();
            for arc in &mut self.arcs {
                arc.current = arc.from.interpolate(arc.target, t);
            }
        } else {
            self.snap_to_target();
        }
        running
    }

    fn snap_to_target(&mut self) {
        self.timeline.finish();
        for arc in &mut self.arcs {
            arc.current = arc.target;
            arc.from = arc.target;
        }
    }

    /// Fit the drawing to `bounds`. A size change keeps the focus and targets
    /// and finishes any running transition.
    pub fn resize(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        let first = self.bounds == Rect::NOTHING;
        self.bounds = bounds;
        self.center = bounds.center();
        self.radius = ((bounds.width().min(bounds.height()) - self.settings.margin) / 6.0).max(1.0);
        if !first {
            self.snap_to_target();
        }
    }

    /// Fill opacity for an arc, blended across the running transition
    pub fn opacity(&self, arc: &SunburstArc) -> f32 {
        let rings = self.settings.visible_rings;
        let level = if arc.has_children {
            self.settings.parent_opacity
        } else {
            self.settings.leaf_opacity
        };
        let at = |rect: ArcRect| if rect.is_visible(rings) { level } else { 0.0 };
        at(arc.from).interpolate(at(arc.target), self.timeline.progress())
    }

    /// Label opacity, blended the same way
    pub fn label_opacity(&self, arc: &SunburstArc) -> f32 {
        let (rings, min_area) = (self.settings.visible_rings, self.settings.label_min_area);
        let at = |rect: ArcRect| {
            if rect.is_label_visible(rings, min_area) {
                1.0
            } else {
                0.0
            }
        };
        at(arc.from).interpolate(at(arc.target), self.timeline.progress())
    }

    /// Polar hit test against the displayed arcs
    pub fn hit_test(&self, pos: Pos2) -> Option<SunburstHit> {
        if self.radius <= 0.0 {
            return None;
        }
        let v = pos - self.center;
        let ring = v.length() / self.radius;
        if ring < 1.0 {
            return Some(SunburstHit::Center);
        }
        let mut angle = v.x.atan2(-v.y);
        if angle < 0.0 {
            angle += TAU;
        }
        self.arcs
            .iter()
            .find(|a| {
                let r = a.current;
                r.is_visible(self.settings.visible_rings)
                    && angle >= r.x0
                    && angle < r.x1
                    && ring >= r.y0
                    && ring < r.y1
            })
            .map(|a| SunburstHit::Arc(a.id))
    }

    /// Text in the centre circle: focus name, plus a hint when zoomed in
    pub fn center_label(&self) -> (String, Option<&'static str>) {
        let name = self.graph.node(self.focus).display_name().to_string();
        if self.focus == self.graph.root() {
            (name, None)
        } else {
            (name, Some("click to zoom out"))
        }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

fn polar(center: Pos2, angle: f32, r: f32) -> Pos2 {
    center + Vec2::new(r * angle.sin(), -r * angle.cos())
}

/// Shrink `[a0, a1]` at radius `r` so that adjacent arcs are separated by a
/// constant gap of `pad_angle` measured at `pad_radius`
fn padded_span(a0: f32, a1: f32, r: f32, pad_angle: f32, pad_radius: f32) -> (f32, f32) {
    let mid = (a0 + a1) / 2.0;
    if r <= 0.0 {
        return (mid, mid);
    }
    let s = pad_radius / r * (pad_angle / 2.0).sin();
    if !(0.0..=1.0).contains(&s) {
        return (mid, mid);
    }
    let p = s.asin();
    if a1 - a0 - 2.0 * p > 1e-6 {
        (a0 + p, a1 - p)
    } else {
        (mid, mid)
    }
}

/// Sampled outer and inner edges of an annular sector
fn arc_edges(
    center: Pos2,
    rect: ArcRect,
    radius: f32,
    settings: &SunburstSettings,
) -> (Vec<Pos2>, Vec<Pos2>) {
    let pad_angle = (rect.span() / 2.0).min(settings.pad_angle);
    let pad_radius = radius * settings.pad_radius_factor;
    let r0 = rect.y0 * radius;
    let r1 = (rect.y1 * radius - 1.0).max(r0);

    let (o0, o1) = padded_span(rect.x0, rect.x1, r1, pad_angle, pad_radius);
    let (i0, i1) = padded_span(rect.x0, rect.x1, r0, pad_angle, pad_radius);

    let segments = ((o1 - o0).max(i1 - i0) / settings.segment_step.max(0.001))
        .ceil()
        .max(1.0) as usize;
    let sample = |a0: f32, a1: f32, r: f32| {
        (0..=segments)
            .map(|k| polar(center, a0 + (a1 - a0) * k as f32 / segments as f32, r))
            .collect::<Vec<_>>()
    };
    (sample(o0, o1, r1), sample(i0, i1, r0))
}

fn arc_mesh(outer: &[Pos2], inner: &[Pos2], color: Color32) -> Mesh {
    let mut mesh = Mesh::default();
    for (o, i) in outer.iter().zip(inner) {
        mesh.colored_vertex(*o, color);
        mesh.colored_vertex(*i, color);
    }
    for k in 0..outer.len().saturating_sub(1) as u32 {
        let base = 2 * k;
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base + 1, base + 3, base + 2);
    }
    mesh
}

fn arc_outline(outer: &[Pos2], inner: &[Pos2]) -> Vec<Pos2> {
    outer.iter().copied().chain(inner.iter().rev().copied()).collect()
}

// =============================================================================
// RENDER
// =============================================================================

/// Draw the sunburst; returns the user's action
pub fn render_sunburst(ui: &mut Ui, state: &mut SunburstState, scheme: &ColorScheme) -> SunburstAction {
    let mut action = SunburstAction::None;
    let (dt, slow) = ui.input(|i| (i.stable_dt, i.modifiers.alt));
    let animating = state.tick(dt);

    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
    let full = response.rect;
    painter.rect_filled(full, 0.0, scheme.background);
    let (chart, legend_rect) = full.split_top_bottom_at_y(full.bottom() - LEGEND_HEIGHT);
    state.resize(chart);

    let pointer = response.hover_pos();
    state.hovered = pointer.and_then(|p| state.hit_test(p));

    let rings = state.settings.visible_rings;
    for arc in &state.arcs {
        let opacity = state.opacity(arc);
        if opacity <= 0.001 || arc.current.span() <= 0.0 {
            continue;
        }
        let (outer, inner) = arc_edges(state.center, arc.current, state.radius, &state.settings);
        let fill = apply_opacity(state.colors.color_of(state.graph.node(arc.id)), opacity);
        painter.add(Shape::mesh(arc_mesh(&outer, &inner, fill)));
        if state.hovered == Some(SunburstHit::Arc(arc.id)) && arc.current.is_visible(rings) {
            painter.add(Shape::closed_line(
                arc_outline(&outer, &inner),
                Stroke::new(1.5, scheme.highlight),
            ));
        }
    }

    for arc in &state.arcs {
        let opacity = state.label_opacity(arc);
        if opacity <= 0.001 {
            continue;
        }
        paint_label(&painter, state, arc, opacity);
    }

    let (title, hint) = state.center_label();
    painter.text(
        state.center,
        Align2::CENTER_CENTER,
        truncate_label(&title, state.settings.max_label_chars),
        FontId::proportional(13.0),
        scheme.muted_text,
    );
    if let Some(hint) = hint {
        painter.text(
            state.center + Vec2::new(0.0, 16.0),
            Align2::CENTER_CENTER,
            hint,
            FontId::proportional(10.0),
            scheme.muted_text,
        );
    }

    render_legend(&painter, &state.colors.legend(), legend_rect.shrink(2.0), scheme);

    match (state.hovered, pointer) {
        (Some(SunburstHit::Center), _) => {
            if response.clicked() {
                action = SunburstAction::ZoomOut { slow };
            }
        }
        (Some(SunburstHit::Arc(id)), Some(pos)) => {
            if response.clicked() {
                action = SunburstAction::ZoomTo { id, slow };
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
        _ => {}
    }

    if animating {
        ui.ctx().request_repaint();
    }
    action
}

fn paint_label(painter: &egui::Painter, state: &SunburstState, arc: &SunburstArc, opacity: f32) {
    let rect = arc.current;
    let mid_angle = (rect.x0 + rect.x1) / 2.0;
    let mid_radius = (rect.y0 + rect.y1) / 2.0 * state.radius;
    let anchor = polar(state.center, mid_angle, mid_radius);

    // Read along the radius, flipped on the left half so text is never upside down
    let mut angle = mid_angle - PI / 2.0;
    if mid_angle >= PI {
        angle += PI;
    }

    let text = truncate_label(
        state.graph.node(arc.id).display_name(),
        state.settings.max_label_chars,
    );
    let galley = painter.layout_no_wrap(
        text,
        FontId::proportional(11.0),
        apply_opacity(ON_FILL_TEXT, opacity),
    );
    let half = galley.size() / 2.0;
    let offset = egui::emath::Rot2::from_angle(angle) * half;
    let shape = TextShape::new(anchor - offset, galley, ON_FILL_TEXT).with_angle(angle);
    painter.add(shape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_document;
    use semviz_types::SemanticNode;

    fn state() -> SunburstState {
        let (graph, _) = SemanticGraph::prepare(&sample_document());
        let mut state = SunburstState::new(graph);
        state.resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(608.0, 608.0)));
        state
    }

    fn root_span(state: &SunburstState) -> f32 {
        state.arc(state.graph().root()).unwrap().target.span()
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn test_partition_spans() {
        let (graph, _) = SemanticGraph::prepare(&sample_document());
        let arcs: HashMap<NodeId, ArcRect> = partition(&graph, graph.root()).into_iter().collect();
        assert_eq!(arcs.len(), graph.descendants(graph.root()).len());
        assert_close(arcs[&graph.root()].span(), TAU);

        for id in graph.descendants(graph.root()) {
            let node = graph.node(id);
            if node.children.is_empty() {
                continue;
            }
            let sum: f32 = node.children.iter().map(|c| arcs[c].span()).sum();
            assert_close(sum, arcs[&id].span());
            for child in &node.children {
                assert_eq!(arcs[child].y0, arcs[&id].y1);
            }
        }
    }

    #[test]
    fn test_partition_orders_largest_first() {
        let (graph, _) = SemanticGraph::prepare(&sample_document());
        let arcs: HashMap<NodeId, ArcRect> = partition(&graph, graph.root()).into_iter().collect();
        let orders = graph.find_path(&["views", "s1", "orders"]).unwrap();
        let items = graph.find_path(&["views", "s1", "items"]).unwrap();
        assert!(arcs[&orders].x0 < arcs[&items].x0);
    }

    #[test]
    fn test_radius_from_bounds() {
        let state = state();
        assert_eq!(state.radius(), 100.0);
    }

    #[test]
    fn test_zoom_remaps_focus_to_full_circle() {
        let mut state = state();
        let s1 = state.graph().find_path(&["views", "s1"]).unwrap();
        assert!(state.click(s1, false));
        let focus = state.arc(s1).unwrap().target;
        assert_eq!(focus, ArcRect::new(0.0, TAU, 0.0, 1.0));

        let orders = state.graph().find_path(&["views", "s1", "orders"]).unwrap();
        let target = state.arc(orders).unwrap().target;
        assert_eq!((target.y0, target.y1), (1.0, 2.0));
        assert!(target.is_visible(3.0));

        let total = state
            .graph()
            .find_path(&["views", "s1", "orders", "measures", "total"])
            .unwrap();
        assert!(!state.arc(total).unwrap().target.is_visible(3.0));
    }

    #[test]
    fn test_root_span_survives_zooms() {
        let mut state = state();
        let views = state.graph().section_node("views").unwrap();
        let s1 = state.graph().find_path(&["views", "s1"]).unwrap();
        let orders = state.graph().find_path(&["views", "s1", "orders"]).unwrap();
        state.click(views, false);
        state.click(s1, false);
        state.tick(0.2);
        state.click(orders, false);
        state.zoom_out(false);
        state.zoom_out(false);
        assert_close(root_span(&state), TAU);
    }

    #[test]
    fn test_leaf_click_does_not_zoom() {
        let mut state = state();
        let missing = state
            .graph()
            .find_path(&["joins", "order_analysis", "s1__missing"])
            .unwrap();
        assert!(!state.click(missing, false));
        assert_eq!(state.focus(), state.graph().root());
        assert!(!state.is_animating());
    }

    #[test]
    fn test_zoom_out_at_root_stays_at_root() {
        let mut state = state();
        state.zoom_out(false);
        assert_eq!(state.focus(), state.graph().root());
        let views = state.graph().section_node("views").unwrap();
        state.click(views, false);
        state.zoom_out(false);
        assert_eq!(state.focus(), state.graph().root());
    }

    #[test]
    fn test_transition_reaches_target() {
        let mut state = state();
        let views = state.graph().section_node("views").unwrap();
        state.click(views, false);
        assert!(state.tick(0.3));
        let mid = state.arc(views).unwrap().current;
        assert!(mid.x0 > 0.0 || mid.x1 < TAU);
        assert!(!state.tick(1.0));
        let arc = state.arc(views).unwrap();
        assert_eq!(arc.current, arc.target);
    }

    #[test]
    fn test_retarget_mid_flight_starts_from_current() {
        let mut state = state();
        let views = state.graph().section_node("views").unwrap();
        let topics = state.graph().section_node("topics").unwrap();
        state.click(views, false);
        state.tick(0.3);
        let shown = state.arc(topics).unwrap().current;
        state.click(topics, false);
        assert_eq!(state.arc(topics).unwrap().current, shown);
        state.tick(0.0001);
        let next = state.arc(topics).unwrap().current;
        assert!((next.x0 - shown.x0).abs() < 0.01);
    }

    #[test]
    fn test_slow_motion_only_changes_duration() {
        let mut fast = state();
        let mut slow = state();
        let views = fast.graph().section_node("views").unwrap();
        fast.click(views, false);
        slow.click(views, true);
        assert!(!fast.tick(0.8));
        assert!(slow.tick(0.8));
        slow.tick(10.0);
        assert_eq!(fast.arc(views).unwrap().current, slow.arc(views).unwrap().current);
    }

    #[test]
    fn test_resize_keeps_focus_and_targets() {
        let mut state = state();
        let views = state.graph().section_node("views").unwrap();
        let s1 = state.graph().find_path(&["views", "s1"]).unwrap();
        state.click(views, false);
        state.tick(1.0);
        state.click(s1, false);
        state.tick(0.1);
        let targets: Vec<ArcRect> = state.arcs().iter().map(|a| a.target).collect();

        state.resize(Rect::from_min_size(Pos2::ZERO, Vec2::new(1208.0, 900.0)));
        assert_eq!(state.focus(), s1);
        assert_eq!(state.radius(), 892.0 / 6.0);
        assert!(!state.is_animating());
        let after: Vec<ArcRect> = state.arcs().iter().map(|a| a.target).collect();
        assert_eq!(after, targets);
        assert!(state.arcs().iter().all(|a| a.current == a.target));
    }

    #[test]
    fn test_zero_span_zoom_is_ignored() {
        let mut empty = SemanticNode::new("empty").with_children(vec![SemanticNode::new("z")]);
        empty.children[0].value = Some(0.0);
        let doc = SemanticNode::new("root").with_children(vec![
            SemanticNode::new("full").with_children(vec![SemanticNode::new("a")]),
            empty,
        ]);
        let (graph, _) = SemanticGraph::prepare(&doc);
        let empty_id = graph.find_path(&["empty"]).unwrap();
        let mut state = SunburstState::new(graph);
        assert!(!state.click(empty_id, false));
        assert_eq!(state.focus(), state.graph().root());
    }

    #[test]
    fn test_opacity_by_kind_and_visibility() {
        let mut state = state();
        let views = state.graph().section_node("views").unwrap();
        let root = state.graph().root();
        assert_eq!(state.opacity(state.arc(views).unwrap()), 0.85);
        assert_eq!(state.opacity(state.arc(root).unwrap()), 0.0);
        let total = state
            .graph()
            .find_path(&["views", "s1", "orders", "measures", "total"])
            .unwrap();
        assert_eq!(state.opacity(state.arc(total).unwrap()), 0.0);

        let joins = state.graph().section_node("joins").unwrap();
        state.click(joins, false);
        state.tick(10.0);
        let missing = state
            .graph()
            .find_path(&["joins", "order_analysis", "s1__missing"])
            .unwrap();
        assert_eq!(state.opacity(state.arc(missing).unwrap()), 0.55);
    }

    #[test]
    fn test_hit_test_polar() {
        let state = state();
        let center = Pos2::new(304.0, 304.0);
        assert_eq!(state.hit_test(center), Some(SunburstHit::Center));

        let views = state.graph().section_node("views").unwrap();
        let arc = state.arc(views).unwrap().current;
        let mid = (arc.x0 + arc.x1) / 2.0;
        let pos = polar(center, mid, 150.0);
        assert_eq!(state.hit_test(pos), Some(SunburstHit::Arc(views)));
        assert_eq!(state.hit_test(polar(center, mid, 1000.0)), None);
    }

    #[test]
    fn test_center_label() {
        let mut state = state();
        assert_eq!(state.center_label(), ("omni".to_string(), None));
        let topics = state.graph().section_node("topics").unwrap();
        state.click(topics, false);
        assert_eq!(state.center_label().1, Some("click to zoom out"));
    }

    #[test]
    fn test_padded_span() {
        let (a0, a1) = padded_span(0.0, 1.0, 100.0, 0.005, 150.0);
        assert!(a0 > 0.0 && a1 < 1.0);
        assert_close(a0, 1.0 - a1);
        let (b0, b1) = padded_span(0.5, 0.5001, 100.0, 0.005, 150.0);
        assert_eq!(b0, b1);
    }
}
