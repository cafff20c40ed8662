//! Graph widget settings
//!
//! Settings are embedded from `config/graph_settings.yaml` and loaded once via
//! [`global_config`]. Setting `SEMVIZ_GRAPH_SETTINGS` to a YAML file path
//! overrides the embedded copy; an unreadable or invalid override logs a warning
//! and the embedded defaults are used instead.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::{GraphError, Result};

/// Environment variable naming an override settings file
pub const SETTINGS_ENV_VAR: &str = "SEMVIZ_GRAPH_SETTINGS";

const EMBEDDED_SETTINGS: &str = include_str!("../config/graph_settings.yaml");

static CONFIG: OnceLock<GraphSettings> = OnceLock::new();

/// Get the global graph settings (loads on first access)
pub fn global_config() -> &'static GraphSettings {
    CONFIG.get_or_init(|| {
        if let Ok(path) = std::env::var(SETTINGS_ENV_VAR) {
            match GraphSettings::from_path(Path::new(&path)) {
                Ok(settings) => {
                    tracing::info!(path = %path, "Loaded graph settings override");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Ignoring graph settings override");
                }
            }
        }
        GraphSettings::embedded()
    })
}

// =============================================================================
// ROOT
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub animation: AnimationSettings,
    pub treemap: TreemapSettings,
    pub sunburst: SunburstSettings,
    pub tree: TreeSettings,
    pub tooltip: TooltipSettings,
    pub shading: ShadingSettings,
}

impl GraphSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Settings compiled into the crate
    pub fn embedded() -> Self {
        Self::from_yaml_str(EMBEDDED_SETTINGS).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Embedded graph settings invalid, using defaults");
            Self::default()
        })
    }
}

// =============================================================================
// ANIMATION
// =============================================================================

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SpringConfigYaml {
    pub stiffness: f32,
    pub damping: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub springs: HashMap<String, SpringConfigYaml>,
    pub treemap_fade_ms: u64,
    pub sunburst_ms: u64,
    pub sunburst_slow_ms: u64,
    pub tree_ms: u64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            springs: HashMap::new(),
            treemap_fade_ms: 250,
            sunburst_ms: 750,
            sunburst_slow_ms: 7500,
            tree_ms: 500,
        }
    }
}

impl AnimationSettings {
    /// Spring preset by name, falling back to a critically damped medium spring
    pub fn spring(&self, name: &str) -> SpringConfigYaml {
        self.springs.get(name).copied().unwrap_or(SpringConfigYaml {
            stiffness: 180.0,
            damping: 1.0,
        })
    }

    /// Sunburst zoom duration in seconds; `slow_motion` selects the long variant
    pub fn sunburst_secs(&self, slow_motion: bool) -> f32 {
        let ms = if slow_motion {
            self.sunburst_slow_ms
        } else {
            self.sunburst_ms
        };
        ms as f32 / 1000.0
    }

    pub fn tree_secs(&self) -> f32 {
        self.tree_ms as f32 / 1000.0
    }

    pub fn treemap_fade_secs(&self) -> f32 {
        self.treemap_fade_ms as f32 / 1000.0
    }
}

// =============================================================================
// RENDERERS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreemapSettings {
    pub padding_outer: f32,
    pub padding_inner: f32,
    pub header_height: f32,
    pub corner_radius: f32,
    pub label_min_area: f32,
    pub subtitle_min_area: f32,
    pub label_min_width: f32,
}

impl Default for TreemapSettings {
    fn default() -> Self {
        Self {
            padding_outer: 3.0,
            padding_inner: 2.0,
            header_height: 18.0,
            corner_radius: 2.0,
            label_min_area: 1200.0,
            subtitle_min_area: 4000.0,
            label_min_width: 36.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SunburstSettings {
    /// Rings shown outward from the focus (the focus itself occupies ring 0)
    pub visible_rings: f32,
    /// Minimum angular x radial area (radians x rings) for a label
    pub label_min_area: f32,
    pub max_label_chars: usize,
    pub pad_angle: f32,
    pub pad_radius_factor: f32,
    pub parent_opacity: f32,
    pub leaf_opacity: f32,
    pub margin: f32,
    /// Angular step (radians) when tessellating arcs
    pub segment_step: f32,
}

impl Default for SunburstSettings {
    fn default() -> Self {
        Self {
            visible_rings: 3.0,
            label_min_area: 0.04,
            max_label_chars: 18,
            pad_angle: 0.005,
            pad_radius_factor: 1.5,
            parent_opacity: 0.85,
            leaf_opacity: 0.55,
            margin: 8.0,
            segment_step: 0.04,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    pub depth_spacing: f32,
    pub row_height: f32,
    /// Nodes at this depth and deeper start collapsed
    pub collapse_depth: usize,
    pub node_radius: f32,
    pub fit_padding: f32,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            depth_spacing: 200.0,
            row_height: 22.0,
            collapse_depth: 2,
            node_radius: 4.5,
            fit_padding: 40.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TooltipSettings {
    pub offset: f32,
    pub max_width: f32,
}

impl Default for TooltipSettings {
    fn default() -> Self {
        Self {
            offset: 14.0,
            max_width: 360.0,
        }
    }
}

// =============================================================================
// DEPTH SHADING
// =============================================================================

/// Depth darkening table for one renderer.
///
/// Topics/joins use `min(depth * topic_step, topic_cap)`, views use
/// `min((depth - view_offset) * view_step, view_cap)`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DepthShading {
    pub topic_step: f32,
    pub topic_cap: f32,
    pub view_step: f32,
    pub view_cap: f32,
    pub view_offset: i32,
}

impl Default for DepthShading {
    fn default() -> Self {
        Self {
            topic_step: 0.22,
            topic_cap: 1.1,
            view_step: 0.3,
            view_cap: 1.2,
            view_offset: 2,
        }
    }
}

impl DepthShading {
    pub fn topic_factor(&self, depth: usize) -> f32 {
        (depth as f32 * self.topic_step).min(self.topic_cap)
    }

    pub fn view_factor(&self, depth: usize) -> f32 {
        ((depth as i32 - self.view_offset) as f32 * self.view_step).min(self.view_cap)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    pub treemap: DepthShading,
    pub sunburst: DepthShading,
    pub tree: DepthShading,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_settings_parse() {
        let settings = GraphSettings::from_yaml_str(EMBEDDED_SETTINGS).unwrap();
        assert_eq!(settings.animation.sunburst_ms, 750);
        assert_eq!(settings.animation.sunburst_slow_ms, 7500);
        assert_eq!(settings.sunburst.max_label_chars, 18);
        assert_eq!(settings.tree.collapse_depth, 2);
        assert!(settings.animation.springs.contains_key("camera"));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings = GraphSettings::from_yaml_str("tree:\n  row_height: 30.0\n").unwrap();
        assert_eq!(settings.tree.row_height, 30.0);
        assert_eq!(settings.tree.collapse_depth, 2);
        assert_eq!(settings.tooltip.offset, 14.0);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = GraphSettings::from_yaml_str("tree: [unclosed").unwrap_err();
        assert!(matches!(err, GraphError::Config(_)));
    }

    #[test]
    fn test_missing_override_file_is_io_error() {
        let err = GraphSettings::from_path(Path::new("/nonexistent/graph_settings.yaml"))
            .unwrap_err();
        assert!(matches!(err, GraphError::Io { .. }));
    }

    #[test]
    fn test_unknown_spring_falls_back() {
        let settings = GraphSettings::embedded();
        let spring = settings.animation.spring("does-not-exist");
        assert_eq!(spring.damping, 1.0);
    }

    #[test]
    fn test_depth_shading_caps() {
        let shading = DepthShading::default();
        assert!((shading.topic_factor(2) - 0.44).abs() < 1e-6);
        assert_eq!(shading.topic_factor(20), 1.1);
        assert_eq!(shading.view_factor(2), 0.0);
        assert_eq!(shading.view_factor(50), 1.2);
        assert!(shading.view_factor(1) < 0.0);
    }
}
