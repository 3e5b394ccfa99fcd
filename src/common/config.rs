use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::GridSpec;

const MAX_PAGES_HARD_CAP: usize = 16;

/// Tunables for the placement engine. Everything here has a default matching
/// the stock launcher; shells override individual fields from TOML.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GridSettings {
    /// Grid resolution of ordinary icon/folder pages.
    #[serde(default = "default_cluster_grid")]
    pub cluster_grid: GridSpec,
    /// Fine virtual grid of the resizable-widget panel, so widgets can align
    /// sub-cell relative to the coarse icon grid.
    #[serde(default = "default_widget_grid")]
    pub widget_grid: GridSpec,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default)]
    pub edge_scroll: EdgeScrollSettings,
    /// Press-and-hold delay before an item is picked up for repositioning.
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    /// Movement tolerance while waiting for the long press; beyond this the
    /// gesture is treated as a swipe and the pick-up is disarmed.
    #[serde(default = "default_press_slop_px")]
    pub press_slop_px: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct EdgeScrollSettings {
    /// Width in pixels of the zones at the left/right page boundary that
    /// trigger auto-scroll while dragging.
    #[serde(default = "default_edge_threshold_px")]
    pub threshold_px: f64,
    /// How long the pointer must dwell inside an edge zone before the panel
    /// scrolls one page. Also the repeat interval while it stays there.
    #[serde(default = "default_edge_dwell_ms")]
    pub dwell_ms: u64,
}

fn default_cluster_grid() -> GridSpec { GridSpec::CLUSTER }
fn default_widget_grid() -> GridSpec { GridSpec::WIDGET_PANEL }
fn default_max_pages() -> usize { 6 }
fn default_long_press_ms() -> u64 { 500 }
fn default_press_slop_px() -> f64 { 12.0 }
fn default_edge_threshold_px() -> f64 { 100.0 }
fn default_edge_dwell_ms() -> u64 { 300 }

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cluster_grid: default_cluster_grid(),
            widget_grid: default_widget_grid(),
            max_pages: default_max_pages(),
            edge_scroll: EdgeScrollSettings::default(),
            long_press_ms: default_long_press_ms(),
            press_slop_px: default_press_slop_px(),
        }
    }
}

impl Default for EdgeScrollSettings {
    fn default() -> Self {
        Self {
            threshold_px: default_edge_threshold_px(),
            dwell_ms: default_edge_dwell_ms(),
        }
    }
}

impl GridSettings {
    /// Collects configuration issues instead of failing on the first one, so
    /// a shell can report all of them at once.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, spec) in [("cluster_grid", self.cluster_grid), ("widget_grid", self.widget_grid)]
        {
            if spec.columns <= 0 || spec.rows <= 0 {
                issues.push(format!(
                    "{} must have positive dimensions (got {}x{})",
                    name, spec.columns, spec.rows
                ));
            }
        }
        if self.max_pages == 0 {
            issues.push("max_pages must be at least 1".to_string());
        }
        if self.max_pages > MAX_PAGES_HARD_CAP {
            issues.push(format!("max_pages must be at most {}", MAX_PAGES_HARD_CAP));
        }
        if self.edge_scroll.threshold_px < 0.0 {
            issues.push("edge_scroll.threshold_px must not be negative".to_string());
        }
        if self.edge_scroll.dwell_ms == 0 {
            issues.push("edge_scroll.dwell_ms must be at least 1".to_string());
        }
        if self.press_slop_px < 0.0 {
            issues.push("press_slop_px must not be negative".to_string());
        }

        issues
    }

    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let settings: GridSettings =
            toml::from_str(input).context("failed to parse grid settings")?;
        let issues = settings.validate();
        if !issues.is_empty() {
            anyhow::bail!("invalid grid settings: {}", issues.join("; "));
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }
}
