//! Chart configuration.
//!
//! Every field has a default matching the stock chart, so an empty JSON
//! object is a valid configuration.

use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Color, Margin};
use crate::{ChartError, Result};

/// Which flavour of the chart to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Static layout, window resize only.
    Basic,
    /// Hover tooltips, small-screen layout, `noSource` and iframe embedding.
    #[default]
    Interactive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegendLabels {
    pub negative: String,
    pub positive: String,
}

impl Default for LegendLabels {
    fn default() -> Self {
        Self {
            negative: "Less Likely".to_string(),
            positive: "More Likely".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub variant: Variant,
    pub margin: Margin,
    pub negative_color: Color,
    pub positive_color: Color,
    pub circle_radius: f64,
    /// Horizontal gap between a marker (or the midline) and its label.
    pub label_gap: f64,
    /// Baseline of the legend labels, relative to the top of the plot.
    pub legend_offset: f64,
    pub legend_labels: LegendLabels,
    /// Containers narrower than this use the small-screen label layout.
    pub small_screen_width: f64,
    pub debounce_ms: u64,
    pub tick_count: usize,
    pub label_font_size: f64,
    pub data_url: String,
    pub container_selector: String,
    pub source_selector: String,
    pub highlight_class: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            margin: Margin::default(),
            negative_color: Color::NEGATIVE,
            positive_color: Color::POSITIVE,
            circle_radius: 4.0,
            label_gap: 10.0,
            legend_offset: -30.0,
            legend_labels: LegendLabels::default(),
            small_screen_width: 500.0,
            debounce_ms: 50,
            tick_count: 10,
            label_font_size: 12.0,
            data_url: "relative_percent.csv".to_string(),
            container_selector: "#chart".to_string(),
            source_selector: ".source".to_string(),
            highlight_class: "highlight".to_string(),
        }
    }
}

impl ChartConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .change_context(ChartError::Config)
            .attach("failed to parse chart configuration JSON")
    }

    pub fn basic() -> Self {
        Self {
            variant: Variant::Basic,
            ..Self::default()
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.variant == Variant::Interactive
    }

    pub fn debounce_wait(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn color_for(&self, p: f64) -> Color {
        if p < 0.0 {
            self.negative_color
        } else {
            self.positive_color
        }
    }
}
