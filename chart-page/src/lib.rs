//! Chart page WASM crate
//!
//! Mounts the likelihood chart on page load, using the configuration baked
//! in at compile time.
//!
//! Note: This crate is only intended to be compiled for wasm32-unknown-unknown.

#![cfg(target_arch = "wasm32")]

use likelihood_chart::config::ChartConfig;
use likelihood_chart::web;
use wasm_bindgen::prelude::*;

/// The baked-in chart configuration from build time
static CHART_JSON: &str = include_str!(concat!(env!("OUT_DIR"), "/chart.json"));

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let config = match ChartConfig::from_json(CHART_JSON) {
        Ok(config) => config,
        Err(report) => {
            tracing::error!(?report, "baked-in chart configuration is invalid");
            return;
        }
    };

    wasm_bindgen_futures::spawn_local(async move {
        // no retry: a failed load leaves the page without a chart
        if let Err(report) = web::mount(config).await {
            tracing::error!(?report, "chart failed to load");
        }
    });
}

/// Get the baked-in configuration as JSON (for debugging)
#[wasm_bindgen]
pub fn get_chart_json() -> String {
    CHART_JSON.to_string()
}
