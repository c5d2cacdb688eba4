//! Row-level value redaction for log output.
//!
//! Subject identifiers and dates only reach the logs when the binary enables
//! them (`--log-data`); library crates log through [`redact_value`].

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when row-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data_enabled(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// Returns the input value when row-level logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_unless_enabled() {
        set_log_data_enabled(false);
        assert_eq!(redact_value("01-701-1015"), REDACTED_VALUE);
        set_log_data_enabled(true);
        assert_eq!(redact_value("01-701-1015"), "01-701-1015");
        set_log_data_enabled(false);
    }
}
