//! Level of detail for labels
//!
//! Decides how much text a tile or arc can carry from its on-screen size.

use egui::Color32;

use crate::config::TreemapSettings;

/// Text shown on a treemap tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LabelDetail {
    None,
    Title,
    TitleAndSubtitle,
}

impl LabelDetail {
    /// Gate by tile area (px^2) and width
    pub fn for_tile(width: f32, height: f32, settings: &TreemapSettings) -> Self {
        let area = width * height;
        if area < settings.label_min_area || width < settings.label_min_width {
            LabelDetail::None
        } else if area < settings.subtitle_min_area {
            LabelDetail::Title
        } else {
            LabelDetail::TitleAndSubtitle
        }
    }

    pub fn shows_title(self) -> bool {
        self >= LabelDetail::Title
    }

    pub fn shows_subtitle(self) -> bool {
        self == LabelDetail::TitleAndSubtitle
    }
}

/// Keep at most `max_chars` characters; longer names keep `max_chars - 1`
/// and end in an ellipsis
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Truncate so the text fits roughly in `width` pixels at `char_width` per char
pub fn fit_label(name: &str, width: f32, char_width: f32) -> Option<String> {
    let max_chars = (width / char_width.max(1.0)).floor() as usize;
    if max_chars < 2 {
        return None;
    }
    Some(truncate_label(name, max_chars))
}

/// Scale a color's alpha by `opacity`
pub fn apply_opacity(color: Color32, opacity: f32) -> Color32 {
    let [r, g, b, a] = color.to_array();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8)
}
