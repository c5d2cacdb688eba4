//! The subject-level analysis dataset.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{AdamError, Result};

/// Storage kind of an ADSL column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// Name, label and kind of a fixed ADSL variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
}

const fn spec(name: &'static str, label: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, label, kind }
}

/// Variables derived for every subject, independent of flag renames.
pub const ADSL_FIELDS: [ColumnSpec; 18] = [
    spec("STUDYID", "Study Identifier", ColumnKind::Text),
    spec("USUBJID", "Unique Subject Identifier", ColumnKind::Text),
    spec("SUBJID", "Subject Identifier for the Study", ColumnKind::Text),
    spec("AGE", "Age", ColumnKind::Number),
    spec("AGEU", "Age Units", ColumnKind::Text),
    spec("AGEGRP1", "Pooled Age Group 1", ColumnKind::Text),
    spec("SEX", "Sex", ColumnKind::Text),
    spec("RACE", "Race", ColumnKind::Text),
    spec("TRTSDT", "Date of First Exposure to Treatment", ColumnKind::Date),
    spec("TRTEDT", "Date of Last Exposure to Treatment", ColumnKind::Date),
    spec("TRT01P", "Planned Treatment for Period 01", ColumnKind::Text),
    spec("TRT01PN", "Planned Treatment for Period 01 (N)", ColumnKind::Number),
    spec("TRT01A", "Actual Treatment for Period 01", ColumnKind::Text),
    spec("TRT01AN", "Actual Treatment for Period 01 (N)", ColumnKind::Number),
    spec("FASFL", "Full Analysis Set Population Flag", ColumnKind::Text),
    spec("EOSSTT", "End of Study Status", ColumnKind::Text),
    spec("EOSDT", "End of Study Date", ColumnKind::Date),
    spec("DCSREAS", "Reason for Discontinuation from Study", ColumnKind::Text),
];

pub fn field_spec(name: &str) -> Option<&'static ColumnSpec> {
    ADSL_FIELDS.iter().find(|spec| spec.name == name)
}

/// Labels of the population flags the built-in rule sets produce.
pub fn flag_label(name: &str) -> Option<&'static str> {
    match name {
        "SAFFL" => Some("Safety Population Flag"),
        "ITTFL" => Some("Intent-To-Treat Population Flag"),
        "EFFFL" => Some("Efficacy Population Flag"),
        "COMPFL8" => Some("Completers of Week 8 Population Flag"),
        "COMPFL16" => Some("Completers of Week 16 Population Flag"),
        "COMPFL24" => Some("Completers of Week 24 Population Flag"),
        _ => None,
    }
}

/// A single ADSL cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdslValue<'a> {
    Text(&'a str),
    Number(f64),
    Integer(i64),
    Date(NaiveDate),
    Null,
}

impl AdslValue<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

fn text(value: Option<&String>) -> AdslValue<'_> {
    value.map_or(AdslValue::Null, |v| AdslValue::Text(v.as_str()))
}

fn date(value: Option<NaiveDate>) -> AdslValue<'static> {
    value.map_or(AdslValue::Null, AdslValue::Date)
}

/// One row of ADSL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdslRecord {
    pub studyid: Option<String>,
    pub usubjid: String,
    pub subjid: Option<String>,
    pub age: Option<f64>,
    pub ageu: Option<String>,
    pub agegrp1: Option<String>,
    pub sex: Option<String>,
    pub race: Option<String>,
    pub trtsdt: Option<NaiveDate>,
    pub trtedt: Option<NaiveDate>,
    pub trt01p: Option<String>,
    pub trt01pn: Option<i64>,
    pub trt01a: Option<String>,
    pub trt01an: Option<i64>,
    pub fasfl: String,
    /// Renamed population flags keyed by their ADSL name.
    pub flags: BTreeMap<String, String>,
    pub eosstt: Option<String>,
    pub eosdt: Option<NaiveDate>,
    pub dcsreas: Option<String>,
}

impl AdslRecord {
    /// Value of a column by ADSL name, `None` if the record has no such column.
    pub fn value(&self, column: &str) -> Option<AdslValue<'_>> {
        let value = match column {
            "STUDYID" => text(self.studyid.as_ref()),
            "USUBJID" => AdslValue::Text(&self.usubjid),
            "SUBJID" => text(self.subjid.as_ref()),
            "AGE" => self.age.map_or(AdslValue::Null, AdslValue::Number),
            "AGEU" => text(self.ageu.as_ref()),
            "AGEGRP1" => text(self.agegrp1.as_ref()),
            "SEX" => text(self.sex.as_ref()),
            "RACE" => text(self.race.as_ref()),
            "TRTSDT" => date(self.trtsdt),
            "TRTEDT" => date(self.trtedt),
            "TRT01P" => text(self.trt01p.as_ref()),
            "TRT01PN" => self.trt01pn.map_or(AdslValue::Null, AdslValue::Integer),
            "TRT01A" => text(self.trt01a.as_ref()),
            "TRT01AN" => self.trt01an.map_or(AdslValue::Null, AdslValue::Integer),
            "FASFL" => AdslValue::Text(&self.fasfl),
            "EOSSTT" => text(self.eosstt.as_ref()),
            "EOSDT" => date(self.eosdt),
            "DCSREAS" => text(self.dcsreas.as_ref()),
            other => return self.flags.get(other).map(|v| AdslValue::Text(v.as_str())),
        };
        Some(value)
    }
}

/// Assembled ADSL with its projected column list.
#[derive(Debug, Clone, PartialEq)]
pub struct AdslDataset {
    pub columns: Vec<String>,
    pub flag_columns: Vec<String>,
    pub records: Vec<AdslRecord>,
}

impl AdslDataset {
    /// Build the dataset, rejecting columns that are neither fixed ADSL
    /// variables nor flag renames.
    pub fn new(
        columns: Vec<String>,
        flag_columns: Vec<String>,
        records: Vec<AdslRecord>,
    ) -> Result<Self> {
        if let Some(unknown) = columns
            .iter()
            .find(|c| field_spec(c).is_none() && !flag_columns.contains(c))
        {
            return Err(AdamError::UnknownColumn {
                column: unknown.clone(),
            });
        }
        Ok(Self {
            columns,
            flag_columns,
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        match field_spec(column) {
            Some(spec) => Some(spec.kind),
            None if self.flag_columns.iter().any(|f| f == column) => Some(ColumnKind::Text),
            None => None,
        }
    }

    pub fn column_label(&self, column: &str) -> Option<&'static str> {
        field_spec(column)
            .map(|spec| spec.label)
            .or_else(|| flag_label(column))
    }

    /// Cells of one record in column order.
    pub fn row<'r>(&self, record: &'r AdslRecord) -> Vec<AdslValue<'r>> {
        self.columns
            .iter()
            .map(|column| record.value(column).unwrap_or(AdslValue::Null))
            .collect()
    }
}
