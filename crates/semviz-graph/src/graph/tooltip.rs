//! Hover details panel
//!
//! [`describe`] turns a node into ordered label/value rows, skipping every
//! field the node does not carry. [`render_tooltip`] draws those rows in a
//! floating area next to the pointer, flipping to the other side when the
//! panel would leave the widget rect.

use std::collections::BTreeMap;

use egui::{Color32, Pos2, Rect, RichText, Stroke, Vec2};
use semviz_types::{display_filter_value, FilterCondition};

use super::colors::ColorScheme;
use crate::config::TooltipSettings;
use crate::model::{GraphNode, NodeId, SemanticGraph};

// =============================================================================
// CONTENT
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub label: &'static str,
    pub value: String,
    /// Render the value in a monospace block
    pub code: bool,
}

impl TooltipRow {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            code: false,
        }
    }

    fn code(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
            code: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub rows: Vec<TooltipRow>,
}

impl TooltipContent {
    pub fn row(&self, label: &str) -> Option<&TooltipRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.rows.iter().map(|r| r.label).collect()
    }
}

/// Describe a node for the hover panel
pub fn describe(graph: &SemanticGraph, id: NodeId) -> TooltipContent {
    describe_node(graph.node(id))
}

pub fn describe_node(node: &GraphNode) -> TooltipContent {
    let data = &node.data;
    let mut rows = Vec::new();

    if let Some(section) = &node.section {
        rows.push(TooltipRow::text("Section", section.clone()));
    }
    if let Some(ref_type) = data.ref_type {
        rows.push(TooltipRow::text("Role", ref_type.role()));
    } else if let Some(base_view) = &data.base_view {
        rows.push(TooltipRow::text("Base view", base_view.clone()));
    }
    if let Some(table) = &data.table_name {
        rows.push(TooltipRow::text("Table", table.clone()));
    }
    if let Some(schema) = &node.schema {
        rows.push(TooltipRow::text("Schema", schema.clone()));
    }
    if let Some(field_type) = data.field_type {
        rows.push(TooltipRow::text("Type", field_type.as_str()));
    }
    if let Some(aggregate) = &data.aggregate_type {
        rows.push(TooltipRow::text("Aggregate", aggregate.clone()));
    }
    if let Some(sql) = &data.sql {
        rows.push(TooltipRow::code("SQL", sql.clone()));
    }
    if let Some(description) = &data.description {
        rows.push(TooltipRow::text("Description", description.clone()));
    }
    if let Some(order) = &data.display_order {
        rows.push(TooltipRow::text("Display order", order.to_string()));
    }
    if let Some(filters) = data.default_filters.as_ref().filter(|f| !f.is_empty()) {
        rows.push(TooltipRow::code("Default filters", format_filters(filters)));
    }
    if let Some(chars) = data.ai_context_chars.filter(|&c| c > 0) {
        rows.push(TooltipRow::text("AI context", format!("{chars} chars")));
    }
    if let Some(chars) = data.sample_queries_chars.filter(|&c| c > 0) {
        rows.push(TooltipRow::text("Sample queries", format!("{chars} chars")));
    }
    if !node.children.is_empty() {
        rows.push(TooltipRow::text("Children", node.children.len().to_string()));
    }
    if !node.hidden_children.is_empty() {
        rows.push(TooltipRow::text(
            "Collapsed",
            format!("{} hidden", node.hidden_children.len()),
        ));
    }

    TooltipContent {
        title: node.display_name().to_string(),
        rows,
    }
}

/// One line per filter: `field → op: value, op: value`, or `field: value`
pub fn format_filters(filters: &BTreeMap<String, FilterCondition>) -> String {
    filters
        .iter()
        .map(|(field, condition)| match condition {
            FilterCondition::Operators(ops) => {
                let ops = ops
                    .iter()
                    .map(|(op, value)| format!("{op}: {}", display_filter_value(value)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{field} → {ops}")
            }
            FilterCondition::Value(value) => {
                format!("{field}: {}", display_filter_value(value))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// PLACEMENT
// =============================================================================

/// Top-left corner for a panel of `size` near `pointer`, kept inside `bounds`.
///
/// The panel sits `offset` right of and below the pointer; on an axis where
/// that would overflow it flips to the left of / above the pointer.
pub fn place_tooltip(pointer: Pos2, size: Vec2, bounds: Rect, offset: f32) -> Pos2 {
    let flip = |p: f32, extent: f32, min: f32, max: f32| {
        let after = p + offset;
        if after + extent <= max {
            after
        } else {
            (p - offset - extent).max(min)
        }
    };
    Pos2::new(
        flip(pointer.x, size.x, bounds.left(), bounds.right()),
        flip(pointer.y, size.y, bounds.top(), bounds.bottom()),
    )
}

/// Last measured panel size, used to place the next frame's panel
#[derive(Debug, Clone, Default)]
pub struct TooltipState {
    last_size: Vec2,
}

/// Draw the hover panel for `content` near `pointer`
#[allow(clippy::too_many_arguments)]
pub fn render_tooltip(
    ctx: &egui::Context,
    id: egui::Id,
    state: &mut TooltipState,
    content: &TooltipContent,
    pointer: Pos2,
    bounds: Rect,
    settings: &TooltipSettings,
    scheme: &ColorScheme,
) {
    let estimate = if state.last_size == Vec2::ZERO {
        Vec2::new(settings.max_width * 0.6, 24.0 + 18.0 * content.rows.len() as f32)
    } else {
        state.last_size
    };
    let pos = place_tooltip(pointer, estimate, bounds, settings.offset);

    let response = egui::Area::new(id)
        .order(egui::Order::Tooltip)
        .fixed_pos(pos)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(scheme.tooltip_fill)
                .stroke(Stroke::new(1.0, scheme.tooltip_stroke))
                .rounding(6.0)
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.set_max_width(settings.max_width);
                    ui.label(RichText::new(&content.title).strong().color(scheme.text));
                    if content.rows.is_empty() {
                        return;
                    }
                    ui.add_space(4.0);
                    egui::Grid::new(id.with("rows"))
                        .num_columns(2)
                        .spacing([10.0, 2.0])
                        .show(ui, |ui| {
                            for row in &content.rows {
                                ui.label(
                                    RichText::new(row.label).small().color(scheme.muted_text),
                                );
                                let value = RichText::new(&row.value).color(scheme.text);
                                if row.code {
                                    ui.label(value.monospace().background_color(code_bg(scheme)));
                                } else {
                                    ui.label(value);
                                }
                                ui.end_row();
                            }
                        });
                });
        });

    state.last_size = response.response.rect.size();
}

fn code_bg(scheme: &ColorScheme) -> Color32 {
    scheme.background.gamma_multiply(0.8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_document;
    use pretty_assertions::assert_eq;
    use semviz_types::{FieldType, SemanticNode};
    use serde_json::json;

    fn filters(value: serde_json::Value) -> BTreeMap<String, FilterCondition> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_unresolved_join_shows_role_only() {
        let (graph, _) = SemanticGraph::prepare(&sample_document());
        let missing = graph
            .find_path(&["joins", "order_analysis", "s1__missing"])
            .unwrap();
        let content = describe(&graph, missing);
        assert_eq!(content.title, "s1__missing");
        assert_eq!(content.labels(), vec!["Section", "Role"]);
        assert_eq!(content.row("Role").unwrap().value, "join");
    }

    #[test]
    fn test_topic_shows_base_view() {
        let (graph, _) = SemanticGraph::prepare(&sample_document());
        let topic = graph.find_path(&["topics", "order_analysis"]).unwrap();
        let content = describe(&graph, topic);
        assert_eq!(content.title, "Order Analysis");
        assert_eq!(content.row("Base view").unwrap().value, "orders");
        assert_eq!(content.row("Children").unwrap().value, "3");
    }

    #[test]
    fn test_field_rows_in_order() {
        let (mut graph, _) = SemanticGraph::prepare(&sample_document());
        let total = graph
            .find_path(&["views", "s1", "orders", "measures", "total"])
            .unwrap();
        {
            let data = &mut graph.node_mut(total).data;
            data.aggregate_type = Some("sum".into());
            data.sql = Some("${orders.amount}".into());
            data.description = Some("Order total".into());
            data.display_order = Some(serde_json::Number::from(3u64));
            data.ai_context_chars = Some(120);
        }
        let content = describe(&graph, total);
        assert_eq!(
            content.labels(),
            vec![
                "Section",
                "Schema",
                "Type",
                "Aggregate",
                "SQL",
                "Description",
                "Display order",
                "AI context"
            ]
        );
        assert!(content.row("SQL").unwrap().code);
        assert_eq!(content.row("Type").unwrap().value, "measure");
        assert_eq!(content.row("AI context").unwrap().value, "120 chars");
    }

    #[test]
    fn test_collapsed_node_reports_hidden_children() {
        let (mut graph, _) = SemanticGraph::prepare(&sample_document());
        let s1 = graph.find_path(&["views", "s1"]).unwrap();
        graph.collapse(s1);
        let content = describe(&graph, s1);
        assert!(content.row("Children").is_none());
        assert_eq!(content.row("Collapsed").unwrap().value, "2 hidden");
    }

    #[test]
    fn test_absent_fields_never_render() {
        let graph = SemanticGraph::from_document(&SemanticNode::field("bare", FieldType::Dimension));
        let content = describe(&graph, graph.root());
        assert_eq!(content.labels(), vec!["Type"]);
        assert!(content.rows.iter().all(|r| !r.value.is_empty()));
    }

    #[test]
    fn test_zero_sizes_are_omitted() {
        let mut topic = SemanticNode::new("orders");
        topic.ai_context_chars = Some(0);
        topic.sample_queries_chars = Some(0);
        let graph = SemanticGraph::from_document(&topic);
        let content = describe(&graph, graph.root());
        assert!(content.row("AI context").is_none());
        assert!(content.row("Sample queries").is_none());

        topic.sample_queries_chars = Some(40);
        let graph = SemanticGraph::from_document(&topic);
        let content = describe(&graph, graph.root());
        assert!(content.row("AI context").is_none());
        assert_eq!(content.row("Sample queries").unwrap().value, "40 chars");
    }

    #[test]
    fn test_format_filters() {
        let formatted = format_filters(&filters(json!({
            "status": {"is": "open", "not": ["a", "b"]},
            "is_test": false,
        })));
        assert_eq!(formatted, "is_test: false\nstatus → is: open, not: [a, b]");
    }

    #[test]
    fn test_place_tooltip_default_side() {
        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let pos = place_tooltip(Pos2::new(100.0, 100.0), Vec2::new(200.0, 100.0), bounds, 14.0);
        assert_eq!(pos, Pos2::new(114.0, 114.0));
    }

    #[test]
    fn test_place_tooltip_flips_near_edges() {
        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0));
        let pos = place_tooltip(Pos2::new(700.0, 550.0), Vec2::new(200.0, 100.0), bounds, 14.0);
        assert_eq!(pos, Pos2::new(486.0, 436.0));
    }

    #[test]
    fn test_place_tooltip_clamps_when_no_side_fits() {
        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(300.0, 200.0));
        let pos = place_tooltip(Pos2::new(150.0, 100.0), Vec2::new(280.0, 50.0), bounds, 14.0);
        assert_eq!(pos.x, 0.0);
        assert_eq!(pos.y, 114.0);
    }
}
