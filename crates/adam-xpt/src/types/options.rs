//! Reader and writer options.

use chrono::{NaiveDate, NaiveDateTime};

use crate::header::NAMESTR_LEN;

/// Options controlling how observations are decoded.
#[derive(Debug, Clone)]
pub struct XptReaderOptions {
    /// Strip the blank padding SAS adds to character values.
    pub trim_strings: bool,
}

impl Default for XptReaderOptions {
    fn default() -> Self {
        Self { trim_strings: true }
    }
}

/// Options controlling header contents of written files.
#[derive(Debug, Clone)]
pub struct XptWriterOptions {
    pub sas_version: String,
    pub os_name: String,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
    pub namestr_length: usize,
}

impl Default for XptWriterOptions {
    /// Header timestamps default to the SAS epoch so repeated exports of the
    /// same data are byte-identical.
    fn default() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1960, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self {
            sas_version: "9.4".to_string(),
            os_name: "RUST".to_string(),
            created: epoch,
            modified: epoch,
            namestr_length: NAMESTR_LEN,
        }
    }
}

impl XptWriterOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sas_version(mut self, version: impl Into<String>) -> Self {
        self.sas_version = version.into();
        self
    }

    #[must_use]
    pub fn with_os_name(mut self, os_name: impl Into<String>) -> Self {
        self.os_name = os_name.into();
        self
    }

    #[must_use]
    pub fn with_created(mut self, created: NaiveDateTime) -> Self {
        self.created = created;
        self
    }

    #[must_use]
    pub fn with_modified(mut self, modified: NaiveDateTime) -> Self {
        self.modified = modified;
        self
    }

    /// Created timestamp in the header's `ddMMMyy:hh:mm:ss` form.
    #[must_use]
    pub fn format_created(&self) -> String {
        format_xpt_datetime(self.created)
    }

    #[must_use]
    pub fn format_modified(&self) -> String {
        format_xpt_datetime(self.modified)
    }
}

fn format_xpt_datetime(value: NaiveDateTime) -> String {
    value.format("%d%b%y:%H:%M:%S").to_string().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timestamp_is_sas_epoch() {
        let options = XptWriterOptions::default();
        assert_eq!(options.format_created(), "01JAN60:00:00:00");
        assert_eq!(options.format_modified(), "01JAN60:00:00:00");
    }

    #[test]
    fn test_custom_timestamp() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(14, 30, 45)
            .unwrap();
        let options = XptWriterOptions::new().with_created(dt);
        assert_eq!(options.format_created(), "15MAR24:14:30:45");
    }
}
