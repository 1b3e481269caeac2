use float_cmp::approx_eq;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use likelihood_chart::chart::SharedChart;
use likelihood_chart::layout::LabelSide;
use likelihood_chart::prelude::*;

const WAIT: Duration = Duration::from_millis(50);

/// Stand-in for the DOM mount point.
#[derive(Default)]
struct Page {
    size: Size,
    markup: String,
    replaced: usize,
    highlight: Option<usize>,
}

impl Container for Page {
    fn bounding_box(&self) -> Size {
        self.size
    }

    fn replace_contents(&mut self, markup: &str) {
        self.markup = markup.to_string();
        self.replaced += 1;
    }

    fn set_highlight(&mut self, row: Option<usize>, _class: &str) {
        self.highlight = row;
    }
}

/// 7px per glyph, 16px line box.
struct FixedWidth;

impl TextMeasurer for FixedWidth {
    fn measure(&self, text: &str, _style: &TextStyle) -> TextExtent {
        TextExtent::new(text.chars().count() as f64 * 7.0, 16.0)
    }
}

#[derive(Default)]
struct Outbox(Mutex<Vec<String>>);

impl ParentPort for Outbox {
    fn post(&self, message: &str) {
        self.0.lock().push(message.to_string());
    }
}

const SAMPLE: &str = "subject,relative_percentage\nA,0.5\nB,-0.3\n";

fn mount(csv: &str, size: Size, config: ChartConfig) -> Chart<Page, FixedWidth, TooltipState> {
    let data = load_dataset(csv).unwrap();
    let page = Page {
        size,
        ..Default::default()
    };
    Chart::new(data, page, FixedWidth, config).with_tooltip(TooltipState::default())
}

#[test]
fn end_to_end_two_rows() {
    let mut chart = mount(SAMPLE, Size::new(600.0, 200.0), ChartConfig::default());
    let order: Vec<_> = chart.data().iter().map(|r| r.subject.clone()).collect();
    assert_eq!(order, ["A", "B"]);

    let layout = chart.draw().clone();
    assert_eq!(layout.content, Size::new(540.0, 140.0));
    assert_eq!(layout.dy, 70.0);

    let a = &layout.rows[0];
    assert_eq!(a.center_y(), 35.0);
    assert!(approx_eq!(f64, a.circle.cx, 405.0, epsilon = 1e-9));
    assert_eq!(a.color, Color::POSITIVE);
    assert_eq!(a.line.x1, 270.0);

    let b = &layout.rows[1];
    assert_eq!(b.center_y(), 105.0);
    assert!(approx_eq!(f64, b.circle.cx, 189.0, epsilon = 1e-9));
    assert_eq!(b.color, Color::NEGATIVE);

    let markup = &chart.container().markup;
    assert!(markup.contains(r#"<line x1="270" y1="35" x2="405" y2="35" style="stroke:#2ca02c"/>"#));
    assert!(markup.contains(r#"<line x1="270" y1="35" x2="189" y2="35" style="stroke:#d62728"/>"#));
}

#[test]
fn rendered_labels_use_measured_font_size() {
    let config = ChartConfig {
        label_font_size: 20.0,
        ..ChartConfig::default()
    };
    let mut chart = mount(
        "subject,relative_percentage\nNegative subject,-0.3\n",
        Size::new(600.0, 200.0),
        config,
    );
    let layout = chart.draw().clone();
    let label = &layout.rows[0].label;
    // 16 glyphs at the fixed 7px advance
    assert_eq!(label.extent.width, 112.0);
    assert!(label.x + label.extent.width < layout.rows[0].circle.cx);

    let markup = &chart.container().markup;
    assert!(markup.contains(r#">Negative subject</text>"#));
    assert!(markup.contains(r#"style="font-size:20px">Negative subject</text>"#));
    assert!(markup.contains(r#"font-size:20px">Less Likely</text>"#));
}

#[test]
fn row_centres_follow_row_height() {
    let csv = "subject,relative_percentage\n\
               a,0.9\nb,0.4\nc,0.1\nd,0\ne,-0.2\nf,-0.6\ng,-1\n";
    let mut chart = mount(csv, Size::new(900.0, 410.0), ChartConfig::default());
    let layout = chart.draw();
    let dy = layout.content.height / 7.0;
    for (i, row) in layout.rows.iter().enumerate() {
        assert!(approx_eq!(
            f64,
            row.center_y(),
            i as f64 * dy + dy / 2.0,
            epsilon = 1e-9
        ));
    }
}

#[test]
fn colours_and_label_sides_follow_sign() {
    let csv = "subject,relative_percentage\nup,0.4\nflat,0\ndown,-0.4\n";
    for width in [900.0, 420.0] {
        let mut chart = mount(csv, Size::new(width, 300.0), ChartConfig::default());
        let layout = chart.draw();
        let mid = layout.scale.apply(0.0);
        for row in &layout.rows {
            let anchor = if layout.small_screen {
                mid
            } else {
                row.circle.cx
            };
            if row.p < 0.0 {
                assert_eq!(row.color, Color::NEGATIVE);
                assert_eq!(row.label.side, LabelSide::Left);
                assert!(row.label.x + row.label.extent.width < anchor);
            } else {
                assert_eq!(row.color, Color::POSITIVE);
                assert_eq!(row.label.side, LabelSide::Right);
                assert!(row.label.x > anchor);
            }
        }
        assert_eq!(layout.small_screen, width < 500.0);
    }
}

#[test]
fn draw_is_idempotent() {
    let mut chart = mount(SAMPLE, Size::new(640.0, 320.0), ChartConfig::default());
    let first_layout = chart.draw().clone();
    let first_markup = chart.container().markup.clone();
    let second_layout = chart.draw().clone();
    assert_eq!(first_layout, second_layout);
    assert_eq!(first_markup, chart.container().markup);
    assert_eq!(chart.container().replaced, 2);
}

#[test]
fn idempotent_after_hover() {
    let mut chart = mount(SAMPLE, Size::new(640.0, 320.0), ChartConfig::default());
    let base = chart.draw().clone();
    chart.hover(0);
    chart.unhover();
    chart.hover(1);
    assert_eq!(chart.draw(), &base);
}

#[test]
fn degenerate_inputs_render_without_rows() {
    let mut chart = mount(SAMPLE, Size::ZERO, ChartConfig::default());
    let layout = chart.draw();
    assert_eq!(layout.content, Size::ZERO);
    assert!(layout.rows.iter().all(|r| r.offset_y == 0.0 && r.circle.cx == 0.0));

    let mut empty = mount(
        "subject,relative_percentage\n",
        Size::new(600.0, 200.0),
        ChartConfig::default(),
    );
    assert!(empty.draw().rows.is_empty());
    assert!(empty.container().markup.contains("Less Likely"));
}

fn shared(size: Size) -> SharedChart<Page, FixedWidth, TooltipState> {
    let chart = Arc::new(Mutex::new(mount(SAMPLE, size, ChartConfig::default())));
    chart.lock().draw();
    chart
}

#[test]
fn resize_burst_redraws_once() {
    let clock = ManualScheduler::new();
    let chart = shared(Size::new(600.0, 200.0));
    let mut window = ResizeEvents::new();
    {
        let mut sources: [&mut dyn ResizeSource; 1] = [&mut window];
        bind_redraw(Arc::clone(&chart), clock.clone(), WAIT, |_| {}, &mut sources);
    }

    for _ in 0..6 {
        window.notify();
        clock.advance(Duration::from_millis(8));
    }
    assert_eq!(chart.lock().draw_count(), 1);

    clock.advance(WAIT);
    assert_eq!(chart.lock().draw_count(), 2);

    clock.advance(Duration::from_secs(5));
    assert_eq!(chart.lock().draw_count(), 2);
}

#[test]
fn parent_resize_redraws_and_reports_height() {
    let clock = ManualScheduler::new();
    let chart = shared(Size::new(600.0, 200.0));
    let outbox = Arc::new(Outbox::default());
    let bridge = Arc::new(Mutex::new(EmbeddingBridge::new(
        "likely",
        Arc::clone(&outbox),
    )));
    let mut window = ResizeEvents::new();

    let reporter = Arc::clone(&bridge);
    {
        let mut guard = bridge.lock();
        let mut sources: [&mut dyn ResizeSource; 2] = [&mut window, &mut *guard];
        bind_redraw(
            Arc::clone(&chart),
            clock.clone(),
            WAIT,
            move |layout| reporter.lock().send_height(layout.viewport.height),
            &mut sources,
        );
    }

    // the host narrows the frame; the page reflows before the message lands
    chart.lock().container_mut().size = Size::new(420.0, 260.0);
    assert!(bridge.lock().handle_message("pymxPYMxlikelyxPYMxwidthxPYMx420"));
    window.notify();
    assert!(!bridge.lock().handle_message("pymxPYMxotherxPYMxwidthxPYMx420"));

    clock.advance(WAIT);
    let chart = chart.lock();
    assert_eq!(chart.draw_count(), 2);
    assert!(chart.layout().unwrap().small_screen);
    assert_eq!(
        *outbox.0.lock(),
        ["pymxPYMxlikelyxPYMxheightxPYMx260"]
    );
}

#[test]
fn tooltip_tracks_hovered_marker() {
    let mut chart = mount(SAMPLE, Size::new(600.0, 200.0), ChartConfig::default());
    chart.draw();
    assert!(chart.hover(0));
    let tip = chart.tooltip();
    assert_eq!(tip.text, "50%");
    let at = tip.at.unwrap();
    assert!(approx_eq!(f64, at.x, 435.0, epsilon = 1e-9));
    assert_eq!(at.y, 85.0);
    assert_eq!(chart.container().highlight, Some(0));
}
