//! Browser bindings.
//!
//! DOM-backed implementations of the chart's capability traits and the
//! boot sequence that wires them together. Only compiled for wasm32.

#![cfg(target_arch = "wasm32")]

use error_stack::{Report, ResultExt, report};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, SvgGraphicsElement, Window};

use crate::chart::{Chart, Container, ResizeEvents, ResizeSource, bind_redraw};
use crate::config::ChartConfig;
use crate::core::{Point, Size};
use crate::data::load_dataset;
use crate::debounce::{Scheduler, Task, timeout_millis};
use crate::embed::{EmbeddingBridge, ParentPort};
use crate::measure::{FontMetrics, TextExtent, TextMeasurer, TextStyle};
use crate::query::QueryParams;
use crate::svg::{self, LABEL_CLASS, ROW_CLASS, ROW_INDEX_ATTR};
use crate::tooltip::{NoTooltip, Tooltip};
use crate::{ChartError, Result};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

fn dom_error(err: JsValue) -> Report<ChartError> {
    report!(ChartError::Dom(format!("{err:?}")))
}

fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| report!(ChartError::MissingElement("window".into())))
}

fn document(window: &Window) -> Result<Document> {
    window
        .document()
        .ok_or_else(|| report!(ChartError::MissingElement("document".into())))
}

fn select(document: &Document, selector: &str) -> Result<Element> {
    document
        .query_selector(selector)
        .map_err(dom_error)?
        .ok_or_else(|| report!(ChartError::MissingElement(selector.to_string())))
}

/* -------------------- CONTAINER -------------------- */

pub struct DomContainer {
    element: Element,
}

impl DomContainer {
    pub fn new(element: Element) -> Self {
        Self { element }
    }
}

impl Container for DomContainer {
    fn bounding_box(&self) -> Size {
        let rect = self.element.get_bounding_client_rect();
        Size::new(rect.width(), rect.height())
    }

    fn replace_contents(&mut self, markup: &str) {
        self.element.set_inner_html(markup);
    }

    fn set_highlight(&mut self, row: Option<usize>, class: &str) {
        let Ok(labels) = self
            .element
            .query_selector_all(&format!(".{ROW_CLASS} .{LABEL_CLASS}"))
        else {
            return;
        };
        for i in 0..labels.length() {
            let Some(label) = labels.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let _ = label.class_list().remove_1(class);
        }
        if let Some(row) = row {
            let selector =
                format!(r#".{ROW_CLASS}[{ROW_INDEX_ATTR}="{row}"] .{LABEL_CLASS}"#);
            if let Ok(Some(label)) = self.element.query_selector(&selector) {
                let _ = label.class_list().add_1(class);
            }
        }
    }
}

/* -------------------- TEXT MEASUREMENT -------------------- */

/// Measures text by rendering it into a hidden SVG and reading `getBBox()`.
pub struct SvgTextMeasurer {
    document: Document,
    scratch: Element,
    fallback: FontMetrics,
}

impl SvgTextMeasurer {
    pub fn new(document: &Document) -> Result<Self> {
        let scratch = document
            .create_element_ns(Some(SVG_NS), "svg")
            .map_err(dom_error)?;
        scratch
            .set_attribute(
                "style",
                "position:absolute;visibility:hidden;width:0;height:0;overflow:hidden",
            )
            .map_err(dom_error)?;
        let body = document
            .body()
            .ok_or_else(|| report!(ChartError::MissingElement("body".into())))?;
        body.append_child(&scratch).map_err(dom_error)?;
        Ok(Self {
            document: document.clone(),
            scratch,
            fallback: FontMetrics::default(),
        })
    }

    fn try_measure(&self, text: &str, style: &TextStyle) -> Option<TextExtent> {
        let node = self.document.create_element_ns(Some(SVG_NS), "text").ok()?;
        node.set_text_content(Some(text));
        node.set_attribute("style", &svg::font_style(style)).ok()?;
        self.scratch.append_child(&node).ok()?;
        let bbox = node
            .clone()
            .dyn_into::<SvgGraphicsElement>()
            .ok()
            .and_then(|g| g.get_b_box().ok());
        let _ = self.scratch.remove_child(&node);
        bbox.map(|b| TextExtent::new(b.width() as f64, b.height() as f64))
    }
}

impl TextMeasurer for SvgTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextExtent {
        self.try_measure(text, style)
            .unwrap_or_else(|| self.fallback.measure(text, style))
    }
}

/* -------------------- TOOLTIP -------------------- */

pub struct DomTooltip {
    element: HtmlElement,
    container: Option<HtmlElement>,
}

impl DomTooltip {
    /// Create the tooltip element next to the chart container.
    pub fn attach(document: &Document, container: &Element) -> Result<Self> {
        let element: HtmlElement = document
            .create_element("div")
            .map_err(dom_error)?
            .dyn_into()
            .map_err(|_| report!(ChartError::Dom("div is not an HtmlElement".into())))?;
        element.set_class_name("tooltip");
        let style = element.style();
        style.set_property("position", "absolute").map_err(dom_error)?;
        style.set_property("pointer-events", "none").map_err(dom_error)?;
        style.set_property("display", "none").map_err(dom_error)?;
        let parent = container
            .parent_element()
            .ok_or_else(|| report!(ChartError::MissingElement("chart container parent".into())))?;
        parent.append_child(&element).map_err(dom_error)?;
        Ok(Self {
            element,
            container: container.dyn_ref::<HtmlElement>().cloned(),
        })
    }
}

impl Tooltip for DomTooltip {
    fn text(&mut self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn position(&mut self, at: Point) {
        // the tooltip lives in the container's parent, offset accordingly
        let (left, top) = self
            .container
            .as_ref()
            .map(|c| (c.offset_left() as f64, c.offset_top() as f64))
            .unwrap_or_default();
        let style = self.element.style();
        let _ = style.set_property("left", &format!("{}px", left + at.x));
        let _ = style.set_property("top", &format!("{}px", top + at.y));
        let _ = style.set_property("display", "block");
    }

    fn hide(&mut self) {
        let _ = self.element.style().set_property("display", "none");
    }
}

/* -------------------- TIMERS & MESSAGING -------------------- */

/// `setTimeout` / `clearTimeout`.
#[derive(Clone)]
pub struct TimeoutScheduler {
    window: Window,
}

impl TimeoutScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for TimeoutScheduler {
    type Handle = i32;

    fn schedule(&self, delay: Duration, task: Task) -> i32 {
        let callback = Closure::once_into_js(move || task());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout_millis(delay),
            )
            .unwrap_or_else(|err| {
                warn!(?err, "setTimeout failed");
                -1
            })
    }

    fn cancel(&self, handle: i32) {
        self.window.clear_timeout_with_handle(handle);
    }
}

/// Posts to `window.parent`.
pub struct WindowParentPort {
    window: Window,
}

impl ParentPort for WindowParentPort {
    fn post(&self, message: &str) {
        let Ok(Some(parent)) = self.window.parent() else {
            return;
        };
        if let Err(err) = parent.post_message(&JsValue::from_str(message), "*") {
            warn!(?err, "postMessage to parent failed");
        }
    }
}

fn document_height(document: &Document) -> f64 {
    document
        .body()
        .map(|body| body.offset_height() as f64)
        .unwrap_or_default()
}

/* -------------------- BOOT -------------------- */

pub async fn fetch_text(window: &Window, url: &str) -> Result<String> {
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(dom_error)
        .change_context(ChartError::Fetch(url.to_string()))?;
    let resp: web_sys::Response = resp
        .dyn_into()
        .map_err(|_| report!(ChartError::Fetch(url.to_string())))
        .attach("fetch did not resolve to a Response")?;
    if !resp.ok() {
        return Err(report!(ChartError::Fetch(url.to_string())))
            .attach(format!("HTTP {}", resp.status()));
    }
    let text = JsFuture::from(resp.text().map_err(dom_error)?)
        .await
        .map_err(dom_error)
        .change_context(ChartError::Fetch(url.to_string()))?;
    text.as_string()
        .ok_or_else(|| report!(ChartError::Fetch(url.to_string())))
        .attach("response body is not text")
}

type DomChart = Chart<DomContainer, SvgTextMeasurer, Box<dyn Tooltip>>;

fn row_index(target: Option<web_sys::EventTarget>) -> Option<usize> {
    let element = target?.dyn_into::<Element>().ok()?;
    let row = element.closest(&format!(".{ROW_CLASS}")).ok()??;
    row.get_attribute(ROW_INDEX_ATTR)?.parse().ok()
}

fn wire_hover(container: &Element, chart: &Arc<Mutex<DomChart>>) -> Result<()> {
    let over_chart = Arc::clone(chart);
    let over = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let mut chart = over_chart.lock();
        match row_index(ev.target()) {
            Some(i) if chart.highlighted() != Some(i) => {
                chart.hover(i);
            }
            Some(_) => {}
            None if chart.highlighted().is_some() => chart.unhover(),
            None => {}
        }
    });
    container
        .add_event_listener_with_callback("mouseover", over.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    over.forget();

    let leave_chart = Arc::clone(chart);
    let leave = Closure::<dyn FnMut()>::new(move || leave_chart.lock().unhover());
    container
        .add_event_listener_with_callback("mouseleave", leave.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    leave.forget();
    Ok(())
}

/// Load the data, mount the chart and keep it sized to the page.
pub async fn mount(config: ChartConfig) -> Result<()> {
    let window = window()?;
    let document = document(&window)?;
    let search = window.location().search().map_err(dom_error)?;
    let query = QueryParams::parse(&search);

    if config.is_interactive() && query.hide_source() {
        if let Ok(Some(source)) = document.query_selector(&config.source_selector) {
            source.remove();
        }
    }

    let element = select(&document, &config.container_selector)?;
    let text = fetch_text(&window, &config.data_url).await?;
    let data = load_dataset(&text).attach(format!("data from {}", config.data_url))?;

    let measurer = SvgTextMeasurer::new(&document)?;
    let tooltip: Box<dyn Tooltip> = if config.is_interactive() {
        Box::new(DomTooltip::attach(&document, &element)?)
    } else {
        Box::new(NoTooltip)
    };
    let wait = config.debounce_wait();
    let interactive = config.is_interactive();
    let chart = Chart::new(data, DomContainer::new(element.clone()), measurer, config)
        .with_tooltip(tooltip);
    let chart = Arc::new(Mutex::new(chart));
    chart.lock().draw();
    info!("chart mounted");

    let resize = Arc::new(Mutex::new(ResizeEvents::new()));
    let window_resize = Arc::clone(&resize);
    let on_resize = Closure::<dyn FnMut()>::new(move || window_resize.lock().notify());
    window
        .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        .map_err(dom_error)?;
    on_resize.forget();

    let scheduler = TimeoutScheduler::new(window.clone());
    if interactive {
        let bridge = Arc::new(Mutex::new(EmbeddingBridge::new(
            query.child_id(),
            WindowParentPort {
                window: window.clone(),
            },
        )));
        bridge.lock().send_height(document_height(&document));

        let inbound = Arc::clone(&bridge);
        let on_message = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |ev: web_sys::MessageEvent| {
                if let Some(raw) = ev.data().as_string() {
                    inbound.lock().handle_message(&raw);
                }
            },
        );
        window
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
            .map_err(dom_error)?;
        on_message.forget();

        let outbound = Arc::clone(&bridge);
        let doc = document.clone();
        let mut resize_guard = resize.lock();
        let mut bridge_guard = bridge.lock();
        let mut sources: [&mut dyn ResizeSource; 2] = [&mut *resize_guard, &mut *bridge_guard];
        bind_redraw(
            Arc::clone(&chart),
            scheduler,
            wait,
            move |_| outbound.lock().send_height(document_height(&doc)),
            &mut sources,
        );
        drop(bridge_guard);
        drop(resize_guard);

        wire_hover(&element, &chart)?;
    } else {
        let mut resize_guard = resize.lock();
        let mut sources: [&mut dyn ResizeSource; 1] = [&mut *resize_guard];
        bind_redraw(Arc::clone(&chart), scheduler, wait, |_| {}, &mut sources);
    }
    Ok(())
}

/// JS entry point: `await mountChart(configJson)`.
#[wasm_bindgen(js_name = mountChart)]
pub async fn mount_chart(config_json: String) -> std::result::Result<(), JsValue> {
    let config = ChartConfig::from_json(&config_json).map_err(|report| {
        error!(?report, "bad chart configuration");
        JsValue::from_str(&report.to_string())
    })?;
    mount(config).await.map_err(|report| {
        error!(?report, "failed to mount chart");
        JsValue::from_str(&format!("{report:?}"))
    })
}
