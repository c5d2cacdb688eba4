//! Treatment window from exposure records.

use std::collections::BTreeMap;

use adam_model::domain::{EX, USUBJID, ex};
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::DataFrame;
use tracing::debug;

use crate::datetime::parse_dtc;
use crate::frame_utils::{require_columns, string_values};

/// First and last exposure dates of one subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreatmentWindow {
    /// Earliest parseable `EXSTDTC`.
    pub start: Option<NaiveDate>,
    /// Latest parseable `EXENDTC`.
    pub end: Option<NaiveDate>,
}

fn earliest(current: Option<NaiveDateTime>, candidate: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn latest(current: Option<NaiveDateTime>, candidate: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    current.max(candidate)
}

/// One [`TreatmentWindow`] per subject with at least one exposure record.
///
/// Unparseable dates are ignored; a subject whose dates are all unparseable
/// still gets a window with both ends `None`.
pub fn aggregate_exposure(ex_df: &DataFrame) -> Result<BTreeMap<String, TreatmentWindow>> {
    require_columns(ex_df, EX, &[USUBJID, ex::EXSTDTC, ex::EXENDTC])?;
    let subjects = string_values(ex_df, USUBJID)?;
    let starts = string_values(ex_df, ex::EXSTDTC)?;
    let ends = string_values(ex_df, ex::EXENDTC)?;

    let mut extremes: BTreeMap<String, (Option<NaiveDateTime>, Option<NaiveDateTime>)> =
        BTreeMap::new();
    let mut unparseable = 0usize;
    for idx in 0..ex_df.height() {
        let Some(subject) = &subjects[idx] else {
            continue;
        };
        let start = parse_field(starts[idx].as_deref(), &mut unparseable);
        let end = parse_field(ends[idx].as_deref(), &mut unparseable);
        let entry = extremes.entry(subject.clone()).or_default();
        entry.0 = earliest(entry.0, start);
        entry.1 = latest(entry.1, end);
    }

    debug!(
        records = ex_df.height(),
        subjects = extremes.len(),
        unparseable_dates = unparseable,
        "exposure aggregated"
    );
    Ok(extremes
        .into_iter()
        .map(|(subject, (start, end))| {
            let window = TreatmentWindow {
                start: start.map(|dt| dt.date()),
                end: end.map(|dt| dt.date()),
            };
            (subject, window)
        })
        .collect())
}

/// Parse a date field, counting non-blank values that fail to parse.
pub(crate) fn parse_field(value: Option<&str>, unparseable: &mut usize) -> Option<NaiveDateTime> {
    let text = value?;
    let parsed = parse_dtc(text);
    if parsed.is_none() && !text.trim().is_empty() {
        *unparseable += 1;
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(text: &str) -> Option<NaiveDateTime> {
        parse_dtc(text)
    }

    #[test]
    fn earliest_ignores_missing() {
        assert_eq!(earliest(None, dt("2014-01-02")), dt("2014-01-02"));
        assert_eq!(earliest(dt("2014-01-02"), None), dt("2014-01-02"));
        assert_eq!(
            earliest(dt("2014-01-02"), dt("2013-12-31")),
            dt("2013-12-31")
        );
    }

    #[test]
    fn latest_ignores_missing() {
        assert_eq!(latest(None, dt("2014-01-02")), dt("2014-01-02"));
        assert_eq!(latest(dt("2014-01-02"), None), dt("2014-01-02"));
        assert_eq!(latest(dt("2014-01-02"), dt("2014-01-02T08:00")), dt("2014-01-02T08:00"));
    }

    #[test]
    fn counts_unparseable_values() {
        let mut count = 0;
        assert!(parse_field(Some("2014-01"), &mut count).is_none());
        assert!(parse_field(Some(""), &mut count).is_none());
        assert!(parse_field(None, &mut count).is_none());
        assert!(parse_field(Some("2014-01-02"), &mut count).is_some());
        assert_eq!(count, 1);
    }
}
