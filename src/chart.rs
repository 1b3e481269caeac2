//! The chart component.
//!
//! A [`Chart`] owns the sorted dataset and a [`Container`] handle. Each
//! [`draw`](Chart::draw) recomputes the layout for the container's current
//! size and replaces the container's markup wholesale; there is no diffing.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::ChartConfig;
use crate::core::{Dataset, Size};
use crate::debounce::{Debouncer, Scheduler};
use crate::layout::ChartLayout;
use crate::measure::TextMeasurer;
use crate::scale::format_percent;
use crate::svg;
use crate::tooltip::{NoTooltip, Tooltip};

/// The element the chart renders into.
pub trait Container {
    fn bounding_box(&self) -> Size;
    /// Replace everything inside the container with `markup`.
    fn replace_contents(&mut self, markup: &str);
    /// Put `class` on the label of `row` and remove it from every other
    /// label; `None` clears all.
    fn set_highlight(&mut self, row: Option<usize>, class: &str);
}

pub type ResizeCallback = Box<dyn FnMut()>;

/// Something that can tell the chart its size may have changed.
pub trait ResizeSource {
    fn subscribe(&mut self, callback: ResizeCallback);
}

/// Fan-out of resize notifications to every subscriber.
#[derive(Default)]
pub struct ResizeEvents {
    subscribers: Vec<ResizeCallback>,
}

impl ResizeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self) {
        for callback in &mut self.subscribers {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl ResizeSource for ResizeEvents {
    fn subscribe(&mut self, callback: ResizeCallback) {
        self.subscribers.push(callback);
    }
}

pub struct Chart<C, M, T = NoTooltip> {
    data: Dataset,
    container: C,
    measurer: M,
    tooltip: T,
    config: ChartConfig,
    layout: Option<ChartLayout>,
    highlighted: Option<usize>,
    draw_count: u64,
}

impl<C: Container, M: TextMeasurer> Chart<C, M, NoTooltip> {
    pub fn new(data: Dataset, container: C, measurer: M, config: ChartConfig) -> Self {
        Self {
            data,
            container,
            measurer,
            tooltip: NoTooltip,
            config,
            layout: None,
            highlighted: None,
            draw_count: 0,
        }
    }
}

impl<C: Container, M: TextMeasurer, T: Tooltip> Chart<C, M, T> {
    pub fn with_tooltip<U: Tooltip>(self, tooltip: U) -> Chart<C, M, U> {
        Chart {
            data: self.data,
            container: self.container,
            measurer: self.measurer,
            tooltip,
            config: self.config,
            layout: self.layout,
            highlighted: self.highlighted,
            draw_count: self.draw_count,
        }
    }

    /// Lay out and render the whole chart for the container's current size.
    pub fn draw(&mut self) -> &ChartLayout {
        let size = self.container.bounding_box();
        let layout = ChartLayout::compute(&self.data, size, &self.config, &self.measurer);
        let markup = svg::render(&layout);
        self.container.replace_contents(&markup);

        // the new subtree has no highlight
        self.highlighted = None;
        self.tooltip.hide();
        self.draw_count += 1;

        debug!(
            width = size.width,
            height = size.height,
            rows = layout.rows.len(),
            small_screen = layout.small_screen,
            "chart drawn"
        );
        self.layout.insert(layout)
    }

    /// Highlight row `index` and show its value in the tooltip.
    ///
    /// Returns `false` when hovering is disabled, nothing has been drawn yet,
    /// or the row does not exist.
    pub fn hover(&mut self, index: usize) -> bool {
        if !self.config.is_interactive() {
            return false;
        }
        let Some(layout) = &self.layout else {
            return false;
        };
        let (Some(row), Some(at)) = (layout.row(index), layout.marker_position(index)) else {
            return false;
        };
        let text = format_percent(row.p);
        self.container
            .set_highlight(Some(index), &self.config.highlight_class);
        self.tooltip.text(&text);
        self.tooltip.position(at);
        self.highlighted = Some(index);
        true
    }

    /// Clear every row highlight and hide the tooltip.
    pub fn unhover(&mut self) {
        if !self.config.is_interactive() {
            return;
        }
        self.container
            .set_highlight(None, &self.config.highlight_class);
        self.tooltip.hide();
        self.highlighted = None;
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn tooltip(&self) -> &T {
        &self.tooltip
    }

    /// Layout of the most recent draw.
    pub fn layout(&self) -> Option<&ChartLayout> {
        self.layout.as_ref()
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }
}

pub type SharedChart<C, M, T = NoTooltip> = Arc<Mutex<Chart<C, M, T>>>;

/// Redraw `chart` (debounced by `wait`) whenever any of `sources` fires.
///
/// All sources share one debouncer, so a window resize and a parent resize
/// arriving together produce a single redraw. `after_draw` runs after every
/// debounced redraw, e.g. to report the new height to an embedding host.
pub fn bind_redraw<C, M, T, S, F>(
    chart: SharedChart<C, M, T>,
    scheduler: S,
    wait: Duration,
    mut after_draw: F,
    sources: &mut [&mut dyn ResizeSource],
) -> Debouncer<S>
where
    C: Container + 'static,
    M: TextMeasurer + 'static,
    T: Tooltip + 'static,
    S: Scheduler + 'static,
    S::Handle: 'static,
    F: FnMut(&ChartLayout) + 'static,
{
    let debouncer = Debouncer::new(scheduler, wait, move || {
        let mut chart = chart.lock();
        let layout = chart.draw();
        after_draw(layout);
    });
    for source in sources.iter_mut() {
        let debouncer = debouncer.clone();
        source.subscribe(Box::new(move || debouncer.call()));
    }
    debouncer
}
