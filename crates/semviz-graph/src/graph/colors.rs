//! Color palettes for the semantic graph views
//!
//! Node colors are a pure function of the node's category and depth and are
//! shared by every renderer; only the depth-darkening table differs per view.
//! Chrome colors (background, text, tooltip) follow the host light/dark
//! preference and never affect node colors.

use std::collections::HashMap;

use egui::Color32;
use semviz_types::{
    FieldType, RefType, DIMENSIONS_GROUP, JOINS_SECTION, MEASURES_GROUP, TOPICS_SECTION,
};

use crate::config::DepthShading;
use crate::model::{GraphNode, SemanticGraph};

// =============================================================================
// FIXED CATEGORY COLORS
// =============================================================================

pub const DIMENSION: Color32 = Color32::from_rgb(0x1d, 0x4e, 0xd8); // Blue 700
pub const MEASURE: Color32 = Color32::from_rgb(0x04, 0x78, 0x57); // Emerald 700
pub const TOPIC: Color32 = Color32::from_rgb(0x7c, 0x3a, 0xed); // Violet 600
pub const JOIN: Color32 = Color32::from_rgb(0xd9, 0x77, 0x06); // Amber 600
pub const BASE_VIEW_REF: Color32 = Color32::from_rgb(0x0e, 0x74, 0x90); // Cyan 700
pub const JOIN_REF: Color32 = Color32::from_rgb(0x5b, 0x21, 0xb6); // Violet 800
pub const FALLBACK: Color32 = Color32::from_rgb(0x33, 0x41, 0x55); // Slate 700

/// Categorical palette for schemas (Tableau 10)
pub const SCHEMA_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x4e, 0x79, 0xa7),
    Color32::from_rgb(0xf2, 0x8e, 0x2c),
    Color32::from_rgb(0xe1, 0x57, 0x59),
    Color32::from_rgb(0x76, 0xb7, 0xb2),
    Color32::from_rgb(0x59, 0xa1, 0x4f),
    Color32::from_rgb(0xed, 0xc9, 0x49),
    Color32::from_rgb(0xaf, 0x7a, 0xa1),
    Color32::from_rgb(0xff, 0x9d, 0xa7),
    Color32::from_rgb(0x9c, 0x75, 0x5f),
    Color32::from_rgb(0xba, 0xb0, 0xab),
];

/// Label text drawn on filled shapes
pub const ON_FILL_TEXT: Color32 = Color32::from_rgb(0xf1, 0xf5, 0xf9);

/// Multiply each channel by `0.7^k` (negative `k` brightens)
pub fn darker(color: Color32, k: f32) -> Color32 {
    let factor = 0.7_f32.powf(k);
    let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(scale(color.r()), scale(color.g()), scale(color.b()))
}

// =============================================================================
// SCHEMA PALETTE
// =============================================================================

/// Schema name → palette slot, in views-section order (cycling past 10)
#[derive(Debug, Clone, Default)]
pub struct SchemaPalette {
    slots: HashMap<String, usize>,
    order: Vec<String>,
}

impl SchemaPalette {
    pub fn new(schemas: impl IntoIterator<Item = String>) -> Self {
        let mut palette = Self::default();
        for schema in schemas {
            if !palette.slots.contains_key(&schema) {
                palette.slots.insert(schema.clone(), palette.order.len());
                palette.order.push(schema);
            }
        }
        palette
    }

    pub fn from_graph(graph: &SemanticGraph) -> Self {
        Self::new(graph.schema_names())
    }

    /// Color for a key; unknown keys hash to a stable slot
    pub fn color(&self, key: &str) -> Color32 {
        let slot = self
            .slots
            .get(key)
            .copied()
            .unwrap_or_else(|| stable_hash(key) as usize);
        SCHEMA_PALETTE[slot % SCHEMA_PALETTE.len()]
    }

    pub fn schemas(&self) -> &[String] {
        &self.order
    }
}

/// FNV-1a, stable across runs and platforms
fn stable_hash(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

// =============================================================================
// COLOR MAPPER
// =============================================================================

/// Deterministic node → color mapping for one renderer
#[derive(Debug, Clone)]
pub struct ColorMapper {
    palette: SchemaPalette,
    shading: DepthShading,
}

impl ColorMapper {
    pub fn new(palette: SchemaPalette, shading: DepthShading) -> Self {
        Self { palette, shading }
    }

    pub fn for_graph(graph: &SemanticGraph, shading: DepthShading) -> Self {
        Self::new(SchemaPalette::from_graph(graph), shading)
    }

    pub fn palette(&self) -> &SchemaPalette {
        &self.palette
    }

    /// First match wins: reference role, field type, group container name,
    /// topics/joins section, then schema palette darkened by depth.
    pub fn color_of(&self, node: &GraphNode) -> Color32 {
        let data = &node.data;
        match data.ref_type {
            Some(RefType::BaseView) => return BASE_VIEW_REF,
            Some(RefType::Join) => return JOIN_REF,
            None => {}
        }
        match data.field_type {
            Some(FieldType::Dimension) => return DIMENSION,
            Some(FieldType::Measure) => return MEASURE,
            None => {}
        }
        match data.name.as_str() {
            DIMENSIONS_GROUP => return DIMENSION,
            MEASURES_GROUP => return MEASURE,
            _ => {}
        }
        match node.section.as_deref() {
            Some(TOPICS_SECTION) => darker(TOPIC, self.shading.topic_factor(node.depth)),
            Some(JOINS_SECTION) => darker(JOIN, self.shading.topic_factor(node.depth)),
            Some(_) => {
                let key = node.schema.as_deref().unwrap_or(&data.name);
                darker(self.palette.color(key), self.shading.view_factor(node.depth))
            }
            None => FALLBACK,
        }
    }

    /// Legend: sections, schemas, then reference and field roles
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries = vec![
            LegendEntry::new("topics", TOPIC),
            LegendEntry::new("joins", JOIN),
        ];
        entries.extend(
            self.palette
                .schemas()
                .iter()
                .map(|s| LegendEntry::new(s.clone(), self.palette.color(s))),
        );
        entries.extend([
            LegendEntry::new("base view", BASE_VIEW_REF),
            LegendEntry::new("join ref", JOIN_REF),
            LegendEntry::new("dimensions", DIMENSION),
            LegendEntry::new("measures", MEASURE),
        ]);
        entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color32) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Draw legend swatches left to right, wrapping inside `rect`
pub fn render_legend(
    painter: &egui::Painter,
    entries: &[LegendEntry],
    rect: egui::Rect,
    scheme: &ColorScheme,
) {
    let font = egui::FontId::proportional(11.0);
    let mut cursor = rect.left_top();
    for entry in entries {
        let galley = painter.layout_no_wrap(entry.label.clone(), font.clone(), scheme.muted_text);
        let width = 14.0 + galley.size().x + 12.0;
        if cursor.x + width > rect.right() && cursor.x > rect.left() {
            cursor = egui::pos2(rect.left(), cursor.y + 16.0);
        }
        painter.circle_filled(cursor + egui::vec2(5.0, 7.0), 5.0, entry.color);
        painter.galley(cursor + egui::vec2(14.0, 0.0), galley, scheme.muted_text);
        cursor.x += width;
    }
}

// =============================================================================
// CHROME (light / dark)
// =============================================================================

/// Non-node colors chosen by the host's light/dark preference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScheme {
    pub background: Color32,
    pub text: Color32,
    pub muted_text: Color32,
    pub stroke: Color32,
    pub highlight: Color32,
    pub tooltip_fill: Color32,
    pub tooltip_stroke: Color32,
    pub error: Color32,
}

impl ColorScheme {
    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(0x0f, 0x17, 0x2a),
            text: Color32::from_rgb(0xe2, 0xe8, 0xf0),
            muted_text: Color32::from_rgb(0x94, 0xa3, 0xb8),
            stroke: Color32::from_rgb(0x47, 0x55, 0x69),
            highlight: Color32::from_rgb(0xfb, 0xbf, 0x24),
            tooltip_fill: Color32::from_rgb(0x1e, 0x29, 0x3b),
            tooltip_stroke: Color32::from_rgb(0x33, 0x41, 0x55),
            error: Color32::from_rgb(0xf8, 0x71, 0x71),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(0xf8, 0xfa, 0xfc),
            text: Color32::from_rgb(0x0f, 0x17, 0x2a),
            muted_text: Color32::from_rgb(0x47, 0x55, 0x69),
            stroke: Color32::from_rgb(0xcb, 0xd5, 0xe1),
            highlight: Color32::from_rgb(0xd9, 0x77, 0x06),
            tooltip_fill: Color32::WHITE,
            tooltip_stroke: Color32::from_rgb(0xcb, 0xd5, 0xe1),
            error: Color32::from_rgb(0xdc, 0x26, 0x26),
        }
    }

    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}
