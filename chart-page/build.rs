//! Build script for chart-page
//!
//! Copies chart.json to OUT_DIR so the page configuration is baked into the
//! wasm module.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("chart.json");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let src_path = Path::new(&manifest_dir).join("chart.json");

    if src_path.exists() {
        fs::copy(&src_path, &dest_path).expect("Failed to copy chart.json");
    } else {
        // every field of the chart configuration has a default
        fs::write(&dest_path, "{}").expect("Failed to write default chart.json");
    }

    println!("cargo:rerun-if-changed=chart.json");
}
