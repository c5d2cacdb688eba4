//! Shared helpers for ADSL writers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use adam_common::format_numeric;
use adam_model::AdslValue;

/// Create the output directory if needed.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))
}

/// Text form of a cell: empty for null, `YYYY-MM-DD` for dates, numbers
/// without trailing zeros.
pub fn format_cell(value: AdslValue<'_>) -> String {
    match value {
        AdslValue::Text(text) => text.to_string(),
        AdslValue::Number(number) => format_numeric(number),
        AdslValue::Integer(number) => number.to_string(),
        AdslValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        AdslValue::Null => String::new(),
    }
}
