//! Linear scale, tick generation and percent formatting.

use serde::{Deserialize, Serialize};

/// Domain of every likelihood chart. Percentages always compare against the
/// full +/-100% range, independent of the data.
pub const LIKELIHOOD_DOMAIN: [f64; 2] = [-1.0, 1.0];

/// Affine map from a data domain onto a pixel range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub const fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// `[-1, 1] -> [0, width]`.
    pub const fn likelihood(width: f64) -> Self {
        Self::new(LIKELIHOOD_DOMAIN, [0.0, width])
    }

    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` evenly spaced round values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let lo = self.domain[0].min(self.domain[1]);
        let hi = self.domain[0].max(self.domain[1]);
        let step = tick_step(hi - lo, count);
        if !step.is_finite() || step <= 0.0 {
            return vec![];
        }
        // tolerate step rounding so the domain ends stay included
        let first = (lo / step - 1e-9).ceil() as i64;
        let last = (hi / step + 1e-9).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Step of 1, 2 or 5 times a power of ten giving close to `count` ticks
/// over `span`.
pub fn tick_step(span: f64, count: usize) -> f64 {
    if span <= 0.0 || !span.is_finite() || count == 0 {
        return 0.0;
    }
    let rough = span / count as f64;
    let mut step = 10f64.powf(rough.log10().floor());
    let err = count as f64 / span * step;
    if err <= 0.15 {
        step *= 10.0;
    } else if err <= 0.35 {
        step *= 5.0;
    } else if err <= 0.75 {
        step *= 2.0;
    }
    step
}

/// `0.23 -> "23%"`, rounded to whole percent.
pub fn format_percent(v: f64) -> String {
    let pct = (v * 100.0).round();
    // avoid "-0%"
    let pct = if pct == 0.0 { 0.0 } else { pct };
    format!("{pct:.0}%")
}
