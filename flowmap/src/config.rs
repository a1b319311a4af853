//! Tunables for geometry, selection, transitions and labels.

use crate::error::Result;
use crate::scale::FlowColors;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SHIPPED_LABEL_OFFSETS: &str = include_str!("../../data/label_offsets.json");

/// Manual label nudge applied after the centroid is projected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelOffset {
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMapConfig {
    /// Gap between the curve end and the target centroid (px).
    pub offset: f64,
    /// Room reserved for the arrowhead (px).
    pub arrow_offset: f64,
    /// Extra length of the draw-in path past the arrow path (px).
    pub animation_extension: f64,
    pub top_n: usize,
    pub dim_opacity: f64,
    pub flow_draw_ms: f64,
    pub label_fade_ms: f64,
    pub fill_fade_ms: f64,
    /// Fade-out before removal; 0 removes exiting entries at once.
    pub exit_ms: f64,
    pub topo_width: f64,
    pub topo_height: f64,
    /// Keyed by region abbreviation. Defaults to the shipped table; a
    /// table given in JSON replaces it whole.
    pub label_offsets: HashMap<String, LabelOffset>,
    /// Feature name → label text overrides.
    pub display_names: HashMap<String, String>,
    pub label_fill: String,
    pub selected_label_fill: String,
    pub animation_stroke_width: f64,
    pub gradient_stop_offsets: Vec<String>,
    pub colors: FlowColors,
    pub size_range: [f64; 2],
    pub show_values: bool,
}

/// The offset table in `data/label_offsets.json`, compiled in.
pub fn shipped_label_offsets() -> HashMap<String, LabelOffset> {
    FlowMapConfig::label_offsets_from_json(SHIPPED_LABEL_OFFSETS).unwrap_or_else(|e| {
        warn!("shipped label offsets unreadable: {}", e);
        HashMap::new()
    })
}

impl Default for FlowMapConfig {
    fn default() -> Self {
        Self {
            offset: 12.0,
            arrow_offset: 4.0,
            animation_extension: 20.0,
            top_n: 10,
            dim_opacity: 0.1,
            flow_draw_ms: 1000.0,
            label_fade_ms: 1500.0,
            fill_fade_ms: 1000.0,
            exit_ms: 0.0,
            topo_width: 975.0,
            topo_height: 610.0,
            label_offsets: shipped_label_offsets(),
            display_names: HashMap::from([("China".to_string(), "Mainland China".to_string())]),
            label_fill: "black".to_string(),
            selected_label_fill: "#a61629".to_string(),
            animation_stroke_width: 100.0,
            gradient_stop_offsets: vec!["25%".to_string(), "100%".to_string()],
            colors: FlowColors::default(),
            size_range: [1.0, 24.0],
            show_values: false,
        }
    }
}

impl FlowMapConfig {
    /// Parse a (possibly partial) JSON config; missing keys keep defaults.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse an `{abbr: {dx, dy}}` table, as shipped in `data/label_offsets.json`.
    pub fn label_offsets_from_json(s: &str) -> Result<HashMap<String, LabelOffset>> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn label_offset(&self, abbr: Option<&str>) -> LabelOffset {
        abbr.and_then(|a| self.label_offsets.get(a)).copied().unwrap_or_default()
    }

    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.display_names.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Stop offset for the i-th colour of a gradient.
    pub fn stop_offset(&self, i: usize) -> &str {
        self.gradient_stop_offsets
            .get(i)
            .or_else(|| self.gradient_stop_offsets.last())
            .map(String::as_str)
            .unwrap_or("100%")
    }

    /// Viewport height for a given width, never taller than the topology.
    pub fn viewport_height(&self, width: f64) -> f64 {
        self.topo_height.min((width / self.topo_width * self.topo_height).ceil())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let c = FlowMapConfig::from_json(r#"{"top_n": 5, "label_offsets": {"USA": {"dx": 20, "dy": 20}}}"#).unwrap();
        assert_eq!(c.top_n, 5);
        assert_eq!(c.offset, 12.0);
        assert_eq!(c.label_offset(Some("USA")), LabelOffset { dx: 20.0, dy: 20.0 });
        assert_eq!(c.label_offset(Some("FRA")), LabelOffset::default());
        assert_eq!(c.label_offset(None), LabelOffset::default());
    }

    #[test]
    fn defaults_carry_shipped_offsets_and_names() {
        let c = FlowMapConfig::default();
        assert_eq!(c.label_offset(Some("USA")), LabelOffset { dx: 20.0, dy: 20.0 });
        assert_eq!(c.label_offset(Some("FRA")), LabelOffset { dx: 10.0, dy: -12.0 });
        assert_eq!(c.label_offsets, shipped_label_offsets());
        assert_eq!(c.display_name("China"), "Mainland China");

        let json = FlowMapConfig::from_json(r#"{"top_n": 3}"#).unwrap();
        assert_eq!(json.label_offsets.len(), 8);
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = FlowMapConfig::from_json("{\"top_n\": \"ten\"}").unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn viewport_height_is_capped() {
        let c = FlowMapConfig::default();
        assert_eq!(c.viewport_height(975.0), 610.0);
        assert_eq!(c.viewport_height(2000.0), 610.0);
        assert_eq!(c.viewport_height(487.5), 305.0);
        assert_eq!(c.viewport_height(100.0), 63.0);
    }

    #[test]
    fn shipped_offset_table_parses() {
        let table = FlowMapConfig::label_offsets_from_json(SHIPPED_LABEL_OFFSETS).unwrap();
        assert_eq!(table.get("GBA"), Some(&LabelOffset { dx: 30.0, dy: 40.0 }));
        assert_eq!(table.get("GBR"), Some(&LabelOffset { dx: 0.0, dy: -10.0 }));
    }

    #[test]
    fn display_name_override() {
        let mut c = FlowMapConfig::default();
        c.display_names.insert("China".into(), "Mainland China".into());
        assert_eq!(c.display_name("China"), "Mainland China");
        assert_eq!(c.display_name("Japan"), "Japan");
    }
}
