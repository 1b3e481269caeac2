//! SVG serialization of a [`ChartLayout`].
//!
//! The output depends only on the layout, so two equal layouts produce
//! byte-identical markup.

use std::fmt::{self, Write as _};

use crate::layout::{ChartLayout, LineMark};
use crate::measure::TextStyle;

/// Length of the outer axis ticks, pointing up from the axis line.
const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

pub const ROW_CLASS: &str = "row";
pub const LABEL_CLASS: &str = "label";
/// Attribute carrying the row index, used to route hover events.
pub const ROW_INDEX_ATTR: &str = "data-row";

/// Render the full chart markup.
pub fn render(layout: &ChartLayout) -> String {
    let mut out = String::with_capacity(256 + layout.rows.len() * 256);
    // writing into a String cannot fail
    let _ = write_chart(&mut out, layout);
    out
}

fn write_chart(out: &mut String, layout: &ChartLayout) -> fmt::Result {
    let width = layout.content.width;
    let height = layout.content.height;
    // labels must render at the size they were measured at
    let font = font_style(&layout.text_style);

    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="likelihood-chart" width="{}" height="{}">"#,
        num(layout.viewport.width),
        num(layout.viewport.height),
    )?;
    writeln!(
        out,
        r#"<g transform="translate({},{})">"#,
        num(layout.margin.left),
        num(layout.margin.top),
    )?;

    // top axis
    writeln!(out, r#"<g class="x axis">"#)?;
    for tick in &layout.ticks {
        writeln!(
            out,
            r#"<g class="tick" transform="translate({},0)"><line y2="{}"/><text y="{}" text-anchor="middle">{}</text></g>"#,
            num(tick.x),
            num(-TICK_SIZE),
            num(-(TICK_SIZE + TICK_PADDING)),
            escape(&tick.label),
        )?;
    }
    writeln!(
        out,
        r#"<path class="domain" d="M0,{t}V0H{w}V{t}"/>"#,
        t = num(-TICK_SIZE),
        w = num(width),
    )?;
    writeln!(out, "</g>")?;

    // gridlines: same ticks, extended down through the plot, no text
    writeln!(out, r#"<g class="x grid">"#)?;
    for tick in &layout.ticks {
        writeln!(
            out,
            r#"<g class="tick" transform="translate({},0)"><line y2="{}"/></g>"#,
            num(tick.x),
            num(height),
        )?;
    }
    writeln!(out, "</g>")?;

    writeln!(out, r#"<g class="rows">"#)?;
    for row in &layout.rows {
        write!(
            out,
            r#"<g class="{ROW_CLASS}" {ROW_INDEX_ATTR}="{}" transform="translate(0,{})">"#,
            row.index,
            num(row.offset_y),
        )?;
        write_line(out, &row.line, None, Some(&row.color.to_string()))?;
        write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}"/>"#,
            num(row.circle.cx),
            num(row.circle.cy),
            num(row.circle.r),
        )?;
        writeln!(
            out,
            r#"<text class="{LABEL_CLASS}" x="{}" y="{}" style="{font}">{}</text></g>"#,
            num(row.label.x),
            num(row.label.y),
            escape(&row.label.text),
        )?;
    }
    writeln!(out, "</g>")?;

    write_line(out, &layout.midline, Some("midline"), None)?;
    writeln!(out)?;

    for legend in &layout.legends {
        writeln!(
            out,
            r#"<g class="legend"><text x="{}" y="{}" style="fill:{};{font}">{}</text></g>"#,
            num(legend.x),
            num(legend.y),
            legend.color,
            escape(&legend.text),
        )?;
    }

    writeln!(out, "</g>")?;
    write!(out, "</svg>")
}

fn write_line(
    out: &mut String,
    line: &LineMark,
    class: Option<&str>,
    stroke: Option<&str>,
) -> fmt::Result {
    out.push_str("<line");
    if let Some(class) = class {
        write!(out, r#" class="{class}""#)?;
    }
    write!(
        out,
        r#" x1="{}" y1="{}" x2="{}" y2="{}""#,
        num(line.x1),
        num(line.y1),
        num(line.x2),
        num(line.y2),
    )?;
    if let Some(stroke) = stroke {
        write!(out, r#" style="stroke:{stroke}""#)?;
    }
    out.push_str("/>");
    Ok(())
}

/// Inline CSS for text laid out with `style`.
pub fn font_style(style: &TextStyle) -> String {
    format!("font-size:{}px", num(style.font_size))
}

/// Coordinates rounded to thousandths, without a trailing `.0` or `-0`.
fn num(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == 0.0 || !r.is_finite() {
        "0".to_string()
    } else {
        r.to_string()
    }
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::core::{Dataset, Record, Size};
    use crate::measure::FontMetrics;

    fn layout(rows: &[(&str, f64)], size: Size) -> ChartLayout {
        let data = Dataset::new(
            rows.iter()
                .map(|&(s, p)| Record {
                    subject: s.to_string(),
                    relative_percentage: p.to_string(),
                    p,
                })
                .collect(),
        );
        ChartLayout::compute(&data, size, &ChartConfig::default(), &FontMetrics::default())
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(405.0), "405");
        assert_eq!(num(188.99999999999997), "189");
        assert_eq!(num(-0.0), "0");
        assert_eq!(num(12.3456), "12.346");
        assert_eq!(num(f64::NAN), "0");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"R&D <"x">"#), "R&amp;D &lt;&quot;x&quot;&gt;");
    }

    #[test]
    fn renders_every_mark() {
        let svg = render(&layout(&[("A", 0.5), ("B", -0.3)], Size::new(600.0, 200.0)));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="600" height="200""#));
        assert!(svg.contains(r#"<g transform="translate(30,50)">"#));
        assert_eq!(svg.matches(r#"class="row""#).count(), 2);
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(r#"data-row="1" transform="translate(0,70)""#));
        assert!(svg.contains(r#"<circle cx="405" cy="35" r="4"/>"#));
        assert!(svg.contains(r#"<circle cx="189" cy="35" r="4"/>"#));
        assert!(svg.contains("stroke:#2ca02c"));
        assert!(svg.contains("stroke:#d62728"));
        assert!(svg.contains(r#"<line class="midline" x1="270" y1="0" x2="270" y2="140"/>"#));
        assert!(svg.contains(">Less Likely</text>"));
        assert!(svg.contains(">More Likely</text>"));
        assert!(svg.contains(">-100%</text>"));
        assert!(svg.contains(">100%</text>"));
    }

    #[test]
    fn grid_ticks_span_plot_and_have_no_text() {
        let svg = render(&layout(&[("A", 0.5)], Size::new(600.0, 200.0)));
        let grid = svg
            .split(r#"<g class="x grid">"#)
            .nth(1)
            .and_then(|rest| rest.split("</g>\n<g class=\"rows\">").next())
            .unwrap();
        assert_eq!(grid.matches(r#"<line y2="140"/>"#).count(), 11);
        assert!(!grid.contains("<text"));
    }

    #[test]
    fn labels_and_legends_carry_measured_font_size() {
        let data = Dataset::new(vec![Record {
            subject: "Negative subject".to_string(),
            relative_percentage: "-0.3".to_string(),
            p: -0.3,
        }]);
        let config = ChartConfig {
            label_font_size: 20.0,
            ..ChartConfig::default()
        };
        let layout = ChartLayout::compute(
            &data,
            Size::new(600.0, 200.0),
            &config,
            &FontMetrics::default(),
        );
        let svg = render(&layout);
        assert!(svg.contains(r#"<text class="label" x="#));
        assert_eq!(svg.matches(r#"style="font-size:20px">"#).count(), 1);
        assert_eq!(svg.matches(";font-size:20px\">").count(), 2);
        assert!(!svg.contains("font-size:12px"));
    }

    #[test]
    fn subjects_are_escaped() {
        let svg = render(&layout(&[("Q&A <live>", 0.1)], Size::new(600.0, 200.0)));
        assert!(svg.contains(">Q&amp;A &lt;live&gt;</text>"));
    }
}
