//! End-of-study disposition from disposition events.

use std::collections::{BTreeMap, BTreeSet};

use adam_model::domain::{DS, USUBJID, ds};
use adam_model::{DispositionSelection, StatusRules};
use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::exposure::parse_field;
use crate::frame_utils::{require_columns, string_values};

/// Classified disposition of one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispositionOutcome {
    /// Mapped status, `None` for a term outside the status table.
    pub status: Option<String>,
    pub status_date: Option<NaiveDate>,
    /// The decoded term when the status is the discontinued status, else empty.
    pub reason: String,
    /// `DSDECOD` of the selected record.
    pub term: Option<String>,
}

/// One [`DispositionOutcome`] per subject with a record in the status category.
///
/// Among several records the rule set's selection applies: the latest status
/// date (missing dates rank last, equal dates keep the earlier record), or the
/// first record in source order.
pub fn aggregate_disposition(
    ds_df: &DataFrame,
    rules: &StatusRules,
) -> Result<BTreeMap<String, DispositionOutcome>> {
    require_columns(ds_df, DS, &[USUBJID, ds::DSCAT, ds::DSDECOD, ds::DSSTDTC])?;
    let subjects = string_values(ds_df, USUBJID)?;
    let categories = string_values(ds_df, ds::DSCAT)?;
    let terms = string_values(ds_df, ds::DSDECOD)?;
    let dates = string_values(ds_df, ds::DSSTDTC)?;

    let mut selected: BTreeMap<String, DispositionOutcome> = BTreeMap::new();
    let mut qualifying = 0usize;
    let mut unparseable = 0usize;
    let mut unmapped: BTreeSet<String> = BTreeSet::new();

    for idx in 0..ds_df.height() {
        if categories[idx].as_deref() != Some(rules.category.as_str()) {
            continue;
        }
        let Some(subject) = &subjects[idx] else {
            continue;
        };
        qualifying += 1;

        let term = terms[idx].clone();
        let status = term
            .as_deref()
            .and_then(|t| rules.status_for(t))
            .map(str::to_string);
        if status.is_none() {
            unmapped.insert(term.clone().unwrap_or_default());
        }
        let reason = match (&status, &term) {
            (Some(status), Some(term)) if *status == rules.discontinued => term.clone(),
            _ => String::new(),
        };
        let candidate = DispositionOutcome {
            status,
            status_date: parse_field(dates[idx].as_deref(), &mut unparseable)
                .map(|dt| dt.date()),
            reason,
            term,
        };

        match selected.get_mut(subject) {
            None => {
                selected.insert(subject.clone(), candidate);
            }
            Some(current) => {
                if replaces(rules.selection, current, &candidate) {
                    *current = candidate;
                }
            }
        }
    }

    if !unmapped.is_empty() {
        warn!(
            terms = ?unmapped,
            "disposition terms without a status mapping"
        );
    }
    debug!(
        records = ds_df.height(),
        qualifying,
        subjects = selected.len(),
        unparseable_dates = unparseable,
        selection = %rules.selection,
        "disposition aggregated"
    );

    Ok(selected)
}

/// Records are visited in source order, so a later record only wins on a
/// strictly later calendar date; time of day is ignored and `None` orders
/// below every date.
fn replaces(
    selection: DispositionSelection,
    current: &DispositionOutcome,
    candidate: &DispositionOutcome,
) -> bool {
    match selection {
        DispositionSelection::MostRecent => candidate.status_date > current.status_date,
        DispositionSelection::FirstListed => false,
    }
}
