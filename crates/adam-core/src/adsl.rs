//! Subject-level assembly onto the demographics backbone.

use std::collections::{BTreeMap, BTreeSet};

use adam_common::redact_value;
use adam_model::domain::{DM, USUBJID, dm};
use adam_model::{AdamError, AdslDataset, AdslRecord, RuleSet};
use anyhow::Result;
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::disposition::DispositionOutcome;
use crate::exposure::TreatmentWindow;
use crate::frame_utils::{f64_values, has_column, require_columns, string_values};

/// Build one [`AdslRecord`] per backbone row, in backbone order.
///
/// Only `USUBJID` is required of the backbone; other demographic columns that
/// are missing produce null fields. Fails with
/// [`AdamError::DuplicateSubjects`] when a subject appears more than once.
pub fn assemble_adsl(
    dm_df: &DataFrame,
    windows: &BTreeMap<String, TreatmentWindow>,
    outcomes: &BTreeMap<String, DispositionOutcome>,
    rules: &RuleSet,
) -> Result<AdslDataset> {
    require_columns(dm_df, DM, &[USUBJID])?;
    let subjects = string_values(dm_df, USUBJID)?;

    let studyid = backbone_text(dm_df, dm::STUDYID)?;
    let subjid = backbone_text(dm_df, dm::SUBJID)?;
    let ageu = backbone_text(dm_df, dm::AGEU)?;
    let sex = backbone_text(dm_df, dm::SEX)?;
    let race = backbone_text(dm_df, dm::RACE)?;
    let arm = backbone_text(dm_df, dm::ARM)?;
    let actarm = backbone_text(dm_df, dm::ACTARM)?;
    let age = if has_column(dm_df, dm::AGE) {
        f64_values(dm_df, dm::AGE)?
    } else {
        warn!(column = dm::AGE, "demographics column missing, values left null");
        vec![None; dm_df.height()]
    };

    let mut flag_sources = Vec::with_capacity(rules.flags.len());
    for flag in &rules.flags {
        let values = if has_column(dm_df, &flag.source) {
            string_values(dm_df, &flag.source)?
        } else {
            debug!(source = %flag.source, target = %flag.target, "flag source absent, defaulted");
            vec![None; dm_df.height()]
        };
        flag_sources.push((flag.target.as_str(), values));
    }

    let missing_subject_rows: Vec<usize> = subjects
        .iter()
        .enumerate()
        .filter(|(_, subject)| subject.is_none())
        .map(|(idx, _)| idx + 1)
        .collect();
    if !missing_subject_rows.is_empty() {
        warn!(rows = ?missing_subject_rows, "demographics rows without USUBJID");
    }

    let mut records = Vec::with_capacity(dm_df.height());
    let mut unknown_arms: BTreeSet<&str> = BTreeSet::new();
    for idx in 0..dm_df.height() {
        let usubjid = subjects[idx].clone().unwrap_or_default();
        let window = windows.get(&usubjid).copied().unwrap_or_default();
        let outcome = outcomes.get(&usubjid);

        let trt01p = arm[idx].clone();
        let trt01a = actarm[idx].clone();
        let trt01pn = code_for(rules, arm[idx].as_deref(), &mut unknown_arms);
        let trt01an = code_for(rules, actarm[idx].as_deref(), &mut unknown_arms);

        let flags = flag_sources
            .iter()
            .map(|(target, values)| {
                let value = values[idx]
                    .clone()
                    .unwrap_or_else(|| rules.flag_default.clone());
                (String::from(*target), value)
            })
            .collect();

        let eosstt = outcome
            .and_then(|o| o.status.clone())
            .or_else(|| rules.status.fallback_status().map(str::to_string));

        records.push(AdslRecord {
            studyid: studyid[idx].clone(),
            usubjid,
            subjid: subjid[idx].clone(),
            age: age[idx],
            ageu: ageu[idx].clone(),
            agegrp1: age[idx]
                .and_then(|value| rules.age_groups.group(value))
                .map(str::to_string),
            sex: sex[idx].clone(),
            race: race[idx].clone(),
            trtsdt: window.start,
            trtedt: window.end,
            trt01p,
            trt01pn,
            trt01a,
            trt01an,
            fasfl: if window.start.is_some() { "Y" } else { "N" }.to_string(),
            flags,
            eosstt,
            eosdt: outcome.and_then(|o| o.status_date),
            dcsreas: outcome.map(|o| o.reason.clone()),
        });
    }

    if !unknown_arms.is_empty() {
        debug!(arms = ?unknown_arms, "arms without a treatment code");
    }
    ensure_unique_subjects(&records)?;

    let dataset = AdslDataset::new(rules.columns.clone(), rules.flag_columns(), records)?;
    Ok(dataset)
}

fn backbone_text(dm_df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    if has_column(dm_df, column) {
        string_values(dm_df, column)
    } else {
        warn!(column, "demographics column missing, values left null");
        Ok(vec![None; dm_df.height()])
    }
}

fn code_for<'a>(rules: &RuleSet, arm: Option<&'a str>, unknown: &mut BTreeSet<&'a str>) -> Option<i64> {
    let arm = arm?;
    let code = rules.treatment_code(arm);
    if code.is_none() && !rules.treatment_codes.is_empty() {
        unknown.insert(arm);
    }
    code
}

const BLANK_SUBJECT: &str = "(blank)";

/// Fail when any `USUBJID` occurs on more than one record. Blank identifiers
/// are reported as `(blank)`.
pub fn ensure_unique_subjects(records: &[AdslRecord]) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for record in records {
        if !seen.insert(record.usubjid.as_str()) {
            duplicates.insert(record.usubjid.as_str());
        }
    }
    if duplicates.is_empty() {
        return Ok(());
    }
    for subject in &duplicates {
        debug!(usubjid = %redact_value(subject), "duplicate subject");
    }
    Err(AdamError::DuplicateSubjects {
        subjects: duplicates
            .into_iter()
            .map(|subject| {
                if subject.trim().is_empty() {
                    BLANK_SUBJECT.to_string()
                } else {
                    subject.to_string()
                }
            })
            .collect(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(usubjid: &str) -> AdslRecord {
        AdslRecord {
            usubjid: usubjid.to_string(),
            ..AdslRecord::default()
        }
    }

    #[test]
    fn unique_subjects_pass() {
        assert!(ensure_unique_subjects(&[record("S1"), record("S2")]).is_ok());
        assert!(ensure_unique_subjects(&[]).is_ok());
    }

    #[test]
    fn duplicates_are_listed_sorted() {
        let records = [record("S2"), record("S1"), record("S2"), record("S1"), record("S3")];
        let err = ensure_unique_subjects(&records).unwrap_err();
        match err.downcast_ref::<AdamError>() {
            Some(AdamError::DuplicateSubjects { subjects }) => {
                assert_eq!(subjects, &["S1".to_string(), "S2".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_arm_has_no_code() {
        let rules = RuleSet::standard();
        let mut unknown = BTreeSet::new();
        assert_eq!(code_for(&rules, Some("Placebo"), &mut unknown), Some(3));
        assert_eq!(code_for(&rules, Some("Unknown Arm"), &mut unknown), None);
        assert_eq!(code_for(&rules, None, &mut unknown), None);
        assert!(unknown.contains("Unknown Arm"));
    }
}
