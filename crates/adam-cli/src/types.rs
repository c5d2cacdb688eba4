use std::path::PathBuf;

use adam_core::DomainSummary;
use adam_output::OutputPaths;

/// Outcome of `adsl run`.
#[derive(Debug)]
pub struct RunResult {
    pub rules: String,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub domains: Vec<DomainSummary>,
    pub subjects: usize,
    pub columns: usize,
    pub outputs: OutputPaths,
    pub dry_run: bool,
}
