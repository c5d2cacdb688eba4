//! Merging supplemental qualifiers (SUPP--) onto their main domain table.
//!
//! Qualifier records are accumulated into a typed map keyed by subject (and
//! by sub-key value when `IDVAR` is used), then projected into one column per
//! qualifier name and left-joined onto the main table.

use std::collections::{BTreeMap, BTreeSet};

use adam_common::{any_to_f64, any_to_opt_string, format_numeric, parse_f64, redact_value};
use adam_ingest::{SourceTable, SupplementalData};
use adam_model::domain::{USUBJID, supp};
use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame, NamedFrom, Series};
use tracing::{debug, info_span, warn};

use crate::frame_utils::{
    has_column, is_blank, is_numeric_column, optional_string_values, require_columns,
    string_values,
};

/// Main table after the merge, with the columns the merge introduced.
#[derive(Debug, Clone)]
pub struct SupplementalMerge {
    pub table: SourceTable,
    pub added_columns: Vec<String>,
}

impl SupplementalMerge {
    fn unchanged(table: SourceTable) -> Self {
        Self {
            table,
            added_columns: Vec::new(),
        }
    }
}

/// One qualifier record that belongs to the domain being merged.
struct QualifierRow {
    usubjid: String,
    idvar: Option<String>,
    idvarval: Option<String>,
    qnam: String,
    qval: String,
}

/// Usable qualifier records of one domain. `has_subkey` is decided over every
/// record of the domain, including those dropped for a blank name or value.
struct QualifierRecords {
    rows: Vec<QualifierRow>,
    has_subkey: bool,
}

/// Qualifier values per join key, first non-null value wins.
struct Pivot<K> {
    values: BTreeMap<K, BTreeMap<String, String>>,
    qualifiers: BTreeSet<String>,
}

impl<K: Ord> Pivot<K> {
    fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            qualifiers: BTreeSet::new(),
        }
    }

    fn insert(&mut self, key: K, qnam: &str, qval: &str) {
        self.qualifiers.insert(qnam.to_string());
        self.values
            .entry(key)
            .or_default()
            .entry(qnam.to_string())
            .or_insert_with(|| qval.to_string());
    }

    fn lookup(&self, key: Option<&K>, qnam: &str) -> Option<String> {
        key.and_then(|key| self.values.get(key))
            .and_then(|row| row.get(qnam))
            .cloned()
    }
}

/// Merge a domain's supplemental qualifiers onto its main table.
///
/// Absent or empty supplemental data, or data with no records for `domain`,
/// leaves the table unchanged. Without usable `IDVAR` values the qualifiers
/// join by `USUBJID`; otherwise each distinct `IDVAR` joins separately by
/// `USUBJID` plus the named main-table column.
pub fn merge_supplemental(
    main: SourceTable,
    supplemental: &SupplementalData,
    domain: &str,
) -> Result<SupplementalMerge> {
    let span = info_span!("merge_supplemental", domain = %domain);
    let _guard = span.enter();

    let Some(supp_table) = supplemental.table() else {
        return Ok(SupplementalMerge::unchanged(main));
    };
    let supp_df = &supp_table.data;
    require_columns(supp_df, &supp_table.domain, &supp::REQUIRED)?;

    let QualifierRecords { rows, has_subkey } = qualifier_rows(supp_df, domain)?;
    if rows.is_empty() {
        debug!(domain, "no supplemental records for domain");
        return Ok(SupplementalMerge::unchanged(main));
    }
    require_columns(&main.data, &main.domain, &[USUBJID])?;

    let SourceTable {
        domain: table_domain,
        path,
        mut data,
    } = main;
    let before: BTreeSet<String> = column_names(&data);

    if has_subkey {
        merge_by_subkey(&mut data, &rows)?;
    } else {
        merge_by_subject(&mut data, &rows)?;
    }

    let added_columns: Vec<String> = data
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| !before.contains(name))
        .collect();
    debug!(
        domain,
        qualifier_rows = rows.len(),
        added = added_columns.len(),
        by_subkey = has_subkey,
        "supplemental qualifiers merged"
    );

    Ok(SupplementalMerge {
        table: SourceTable::new(table_domain, path, data),
        added_columns,
    })
}

fn column_names(df: &DataFrame) -> BTreeSet<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Records whose `RDOMAIN` equals `domain` exactly, with a subject, a
/// qualifier name and a non-null value.
fn qualifier_rows(supp_df: &DataFrame, domain: &str) -> Result<QualifierRecords> {
    let rdomain = string_values(supp_df, supp::RDOMAIN)?;
    let usubjid = string_values(supp_df, USUBJID)?;
    let qnam = string_values(supp_df, supp::QNAM)?;
    let qval = string_values(supp_df, supp::QVAL)?;
    let idvar = optional_string_values(supp_df, supp::IDVAR);
    let idvarval = optional_string_values(supp_df, supp::IDVARVAL);

    let mut rows = Vec::new();
    let mut has_subkey = false;
    for idx in 0..supp_df.height() {
        if rdomain[idx].as_deref() != Some(domain) {
            continue;
        }
        has_subkey |= !is_blank(idvar[idx].as_deref());
        let (Some(subject), Some(name), Some(value)) =
            (&usubjid[idx], &qnam[idx], &qval[idx])
        else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }
        rows.push(QualifierRow {
            usubjid: subject.clone(),
            idvar: idvar[idx].clone(),
            idvarval: idvarval[idx].clone(),
            qnam: name.clone(),
            qval: value.clone(),
        });
    }
    Ok(QualifierRecords { rows, has_subkey })
}

fn merge_by_subject(data: &mut DataFrame, rows: &[QualifierRow]) -> Result<()> {
    let mut pivot = Pivot::new();
    for row in rows {
        pivot.insert(row.usubjid.clone(), &row.qnam, &row.qval);
    }
    let subjects = string_values(data, USUBJID)?;
    for qnam in &pivot.qualifiers {
        let values: Vec<Option<String>> = subjects
            .iter()
            .map(|subject| pivot.lookup(subject.as_ref(), qnam))
            .collect();
        set_qualifier_column(data, qnam, values)?;
    }
    Ok(())
}

fn merge_by_subkey(data: &mut DataFrame, rows: &[QualifierRow]) -> Result<()> {
    let mut idvars: Vec<&str> = Vec::new();
    for row in rows {
        if let Some(idvar) = row.idvar.as_deref()
            && !idvar.trim().is_empty()
            && !idvars.contains(&idvar)
        {
            idvars.push(idvar);
        }
    }

    for idvar in idvars {
        if !has_column(data, idvar) {
            warn!(idvar, "IDVAR is not a column of the main table, qualifiers skipped");
            continue;
        }
        let numeric = is_numeric_column(data, idvar);

        let mut pivot = Pivot::new();
        let mut unmatched = 0usize;
        for row in rows.iter().filter(|row| row.idvar.as_deref() == Some(idvar)) {
            match subkey_from_text(row.idvarval.as_deref(), numeric) {
                Some(key) => pivot.insert((row.usubjid.clone(), key), &row.qnam, &row.qval),
                None => {
                    unmatched += 1;
                    debug!(
                        idvar,
                        usubjid = redact_value(&row.usubjid),
                        "IDVARVAL cannot be matched"
                    );
                }
            }
        }
        if unmatched > 0 {
            warn!(idvar, unmatched, "supplemental records with unusable IDVARVAL");
        }

        let subjects = string_values(data, USUBJID)?;
        let keys = subkey_values(data, idvar, numeric)?;
        let join_keys: Vec<Option<(String, String)>> = subjects
            .into_iter()
            .zip(keys)
            .map(|(subject, key)| subject.zip(key))
            .collect();

        for qnam in &pivot.qualifiers {
            let values: Vec<Option<String>> = join_keys
                .iter()
                .map(|key| pivot.lookup(key.as_ref(), qnam))
                .collect();
            set_qualifier_column(data, qnam, values)?;
        }
    }
    Ok(())
}

/// Normalized sub-key text: numbers compare by value, text exactly.
fn subkey_from_text(value: Option<&str>, numeric: bool) -> Option<String> {
    let value = value?;
    if numeric {
        parse_f64(value).map(format_numeric)
    } else {
        Some(value.to_string())
    }
}

fn subkey_values(data: &DataFrame, name: &str, numeric: bool) -> Result<Vec<Option<String>>> {
    let column = data.column(name)?;
    Ok((0..data.height())
        .map(|idx| {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            if numeric {
                any_to_f64(value).map(format_numeric)
            } else {
                any_to_opt_string(value)
            }
        })
        .collect())
}

/// Add a qualifier column, or fill the nulls of an existing column of that name.
fn set_qualifier_column(
    data: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> Result<()> {
    if !has_column(data, name) {
        data.with_column(Series::new(name.into(), values))?;
        return Ok(());
    }

    let existing = data.column(name)?;
    let series = if is_numeric_column(data, name) {
        let merged: Vec<Option<f64>> = values
            .iter()
            .enumerate()
            .map(|(idx, new)| {
                any_to_f64(existing.get(idx).unwrap_or(AnyValue::Null))
                    .or_else(|| new.as_deref().and_then(parse_f64))
            })
            .collect();
        Series::new(name.into(), merged)
    } else {
        let merged: Vec<Option<String>> = values
            .into_iter()
            .enumerate()
            .map(|(idx, new)| any_to_opt_string(existing.get(idx).unwrap_or(AnyValue::Null)).or(new))
            .collect();
        Series::new(name.into(), merged)
    };
    data.with_column(series)?;
    Ok(())
}
