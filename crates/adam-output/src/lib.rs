//! ADSL serialization.
//!
//! Every requested output is rendered in memory before any file is created,
//! so a failing render leaves the output directory untouched.

mod common;
mod csv;
mod types;
mod xpt;

pub use crate::common::{ensure_output_dir, format_cell};
pub use crate::csv::{CSV_FILE_NAME, render_csv};
pub use crate::types::{OutputFormat, OutputPaths};
pub use crate::xpt::{ADSL_DATASET_LABEL, ADSL_DATASET_NAME, XPT_FILE_NAME, build_xpt_dataset, render_xpt};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use adam_model::AdslDataset;

/// Render and write the requested outputs into `output_dir`.
pub fn write_outputs(
    dataset: &AdslDataset,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<OutputPaths> {
    let csv_bytes = if format.includes_csv() {
        Some(render_csv(dataset).context("render ADSL CSV")?)
    } else {
        None
    };
    let xpt_bytes = if format.includes_xpt() {
        Some(render_xpt(dataset).context("render ADSL XPT")?)
    } else {
        None
    };

    ensure_output_dir(output_dir)?;
    let mut paths = OutputPaths::default();
    if let Some(bytes) = csv_bytes {
        let path = output_dir.join(CSV_FILE_NAME);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        paths.csv = Some(path);
    }
    if let Some(bytes) = xpt_bytes {
        let path = output_dir.join(XPT_FILE_NAME);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        paths.xpt = Some(path);
    }
    info!(
        output_dir = %output_dir.display(),
        rows = dataset.len(),
        files = paths.iter().count(),
        "outputs written"
    );
    Ok(paths)
}
