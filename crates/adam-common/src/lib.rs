//! Shared utilities for the ADaM crates.
//!
//! Polars `AnyValue` conversions and numeric formatting used by the merger,
//! the aggregators, and the writers, plus the log redaction switch.

pub mod polars;
pub mod redact;

pub use polars::{any_to_f64, any_to_opt_string, any_to_string, format_numeric, parse_f64};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data_enabled};
