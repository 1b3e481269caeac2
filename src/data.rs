//! CSV loading.

use error_stack::{ResultExt, report};
use tracing::{debug, info};

use crate::core::{Dataset, Record};
use crate::{ChartError, Result};

pub const SUBJECT_COLUMN: &str = "subject";
pub const PERCENTAGE_COLUMN: &str = "relative_percentage";

/// Numeric coercion of a percentage cell.
///
/// Whitespace is ignored and an empty cell reads as zero. Only decimal
/// notation is accepted (`0.25`, `-1`, `2.5e-1`); hex, binary and octal
/// prefixes are rejected, as is anything that is not a finite number.
pub fn coerce_percentage(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(p) if p.is_finite() => Ok(p),
        _ => Err(report!(ChartError::InvalidValue(raw.to_string()))),
    }
}

/// Parse CSV text into records in file order.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .change_context(ChartError::Csv)
        .attach("failed to read CSV header")?
        .clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| report!(ChartError::MissingColumn(name)))
    };
    let subject_idx = column(SUBJECT_COLUMN)?;
    let pct_idx = column(PERCENTAGE_COLUMN)?;

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        // header is line 1
        let line = i + 2;
        let row = row
            .change_context(ChartError::Csv)
            .attach(format!("line {line}"))?;
        let subject = row.get(subject_idx).unwrap_or_default().to_string();
        let relative_percentage = row
            .get(pct_idx)
            .ok_or_else(|| report!(ChartError::InvalidValue(String::new())))
            .attach(format!("line {line}: missing {PERCENTAGE_COLUMN}"))?
            .to_string();
        let p = coerce_percentage(&relative_percentage).attach(format!("line {line}"))?;
        records.push(Record {
            subject,
            relative_percentage,
            p,
        });
    }
    debug!(rows = records.len(), "parsed CSV");
    Ok(records)
}

/// Parse and sort. This is the whole load path once the text is in hand.
pub fn load_dataset(text: &str) -> Result<Dataset> {
    let data = Dataset::new(parse_records(text)?);
    info!(records = data.len(), "dataset loaded");
    Ok(data)
}
