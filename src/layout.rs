//! Chart layout.
//!
//! [`ChartLayout::compute`] resolves every mark of the chart to plot
//! coordinates for one container size. Coordinates are relative to the
//! plot origin (top-left corner inside the margins) unless noted; row marks
//! are relative to their row's translation.

use serde::Serialize;

use crate::config::ChartConfig;
use crate::core::{Color, Dataset, Margin, Point, Size};
use crate::measure::{TextExtent, TextMeasurer, TextStyle};
use crate::scale::{LinearScale, format_percent};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LineMark {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CircleMark {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

/// Which side of its anchor a label sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSide {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelMark {
    pub text: String,
    /// Start of the text (SVG `x`, left edge).
    pub x: f64,
    /// Baseline (SVG `y`).
    pub y: f64,
    pub extent: TextExtent,
    pub side: LabelSide,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowLayout {
    pub index: usize,
    pub p: f64,
    /// Vertical translation of the row group.
    pub offset_y: f64,
    pub color: Color,
    pub line: LineMark,
    pub circle: CircleMark,
    pub label: LabelMark,
}

impl RowLayout {
    /// Vertical centre of the row in plot coordinates.
    pub fn center_y(&self) -> f64 {
        self.offset_y + self.circle.cy
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisTick {
    pub value: f64,
    pub x: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendMark {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLayout {
    /// Container bounding box; also the outer SVG size.
    pub viewport: Size,
    pub margin: Margin,
    pub content: Size,
    pub small_screen: bool,
    /// Row height.
    pub dy: f64,
    pub scale: LinearScale,
    pub rows: Vec<RowLayout>,
    pub ticks: Vec<AxisTick>,
    pub midline: LineMark,
    pub legends: Vec<LegendMark>,
    /// Style every label and legend was measured with.
    pub text_style: TextStyle,
}

impl ChartLayout {
    pub fn compute<M: TextMeasurer>(
        data: &Dataset,
        viewport: Size,
        config: &ChartConfig,
        measurer: &M,
    ) -> Self {
        let margin = config.margin;
        let content = viewport.inset(&margin);
        let small_screen = config.is_interactive() && viewport.width < config.small_screen_width;
        let scale = LinearScale::likelihood(content.width);
        let style = TextStyle::new(config.label_font_size);

        let dy = if data.is_empty() {
            0.0
        } else {
            content.height / data.len() as f64
        };
        let mid_x = content.width / 2.0;

        let rows = data
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let x = scale.apply(record.p);
                let cy = dy / 2.0;
                let extent = measurer.measure(&record.subject, &style);
                let anchor = if small_screen { scale.apply(0.0) } else { x };
                let (label_x, side) = if record.is_negative() {
                    (anchor - extent.width - config.label_gap, LabelSide::Left)
                } else {
                    (anchor + config.label_gap, LabelSide::Right)
                };
                let baseline_shift = extent.height / 4.0;
                let label_y = if small_screen {
                    cy - baseline_shift
                } else {
                    cy + baseline_shift
                };
                RowLayout {
                    index,
                    p: record.p,
                    offset_y: index as f64 * dy,
                    color: config.color_for(record.p),
                    line: LineMark {
                        x1: mid_x,
                        y1: cy,
                        x2: x,
                        y2: cy,
                    },
                    circle: CircleMark {
                        cx: x,
                        cy,
                        r: config.circle_radius,
                    },
                    label: LabelMark {
                        text: record.subject.clone(),
                        x: label_x,
                        y: label_y,
                        extent,
                        side,
                    },
                }
            })
            .collect();

        let ticks = scale
            .ticks(config.tick_count)
            .into_iter()
            .map(|value| AxisTick {
                value,
                x: scale.apply(value),
                label: format_percent(value),
            })
            .collect();

        let legend = |text: &str, center: f64, color: Color| {
            let extent = measurer.measure(text, &style);
            LegendMark {
                text: text.to_string(),
                x: center - extent.width / 2.0,
                y: config.legend_offset,
                color,
            }
        };
        let legends = vec![
            legend(
                &config.legend_labels.negative,
                content.width / 4.0,
                config.negative_color,
            ),
            legend(
                &config.legend_labels.positive,
                content.width * 0.75,
                config.positive_color,
            ),
        ];

        Self {
            viewport,
            margin,
            content,
            small_screen,
            dy,
            scale,
            rows,
            ticks,
            midline: LineMark {
                x1: mid_x,
                y1: 0.0,
                x2: mid_x,
                y2: content.height,
            },
            legends,
            text_style: style,
        }
    }

    pub fn row(&self, index: usize) -> Option<&RowLayout> {
        self.rows.get(index)
    }

    /// Circle centre of row `index` in container coordinates (margins
    /// included), where the tooltip is anchored.
    pub fn marker_position(&self, index: usize) -> Option<Point> {
        self.row(index).map(|row| {
            Point::new(
                self.margin.left + row.circle.cx,
                self.margin.top + row.offset_y + row.circle.cy,
            )
        })
    }
}
