use std::collections::BTreeMap;

use chrono::NaiveDate;
use tempfile::TempDir;

use adam_model::{AdslDataset, AdslRecord, RuleSet};
use adam_output::{OutputFormat, write_outputs};
use adam_xpt::{XptValue, read_xpt};

fn record(usubjid: &str) -> AdslRecord {
    AdslRecord {
        studyid: Some("CDISCPILOT01".to_string()),
        usubjid: usubjid.to_string(),
        fasfl: "N".to_string(),
        ..AdslRecord::default()
    }
}

fn dataset() -> AdslDataset {
    let rules = RuleSet::population_flags();
    let mut flags = BTreeMap::new();
    flags.insert("SAFFL".to_string(), "Y".to_string());
    flags.insert("ITTFL".to_string(), "N".to_string());
    let first = AdslRecord {
        subjid: Some("1015".to_string()),
        age: Some(63.0),
        ageu: Some("YEARS".to_string()),
        agegrp1: Some("<65".to_string()),
        sex: Some("F".to_string()),
        race: Some("WHITE".to_string()),
        trtsdt: NaiveDate::from_ymd_opt(2014, 1, 2),
        trtedt: NaiveDate::from_ymd_opt(2014, 7, 2),
        trt01p: Some("Placebo".to_string()),
        trt01a: Some("Placebo".to_string()),
        fasfl: "Y".to_string(),
        flags,
        ..record("01-701-1015")
    };
    let mut second = record("01-701-1023");
    second.age = Some(64.5);
    second.flags.insert("SAFFL".to_string(), "N".to_string());
    second.flags.insert("ITTFL".to_string(), "N".to_string());
    AdslDataset::new(rules.columns.clone(), rules.flag_columns(), vec![first, second])
        .expect("dataset")
}

#[test]
fn csv_output_snapshot() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("output");
    let paths = write_outputs(&dataset(), &out, OutputFormat::Csv).expect("write");

    assert!(paths.xpt.is_none());
    let csv_path = paths.csv.expect("csv path");
    assert_eq!(csv_path, out.join("adsl.csv"));
    let text = std::fs::read_to_string(csv_path).expect("read csv");
    insta::assert_snapshot!(text.trim_end(), @r"
    STUDYID,USUBJID,SUBJID,AGE,AGEU,AGEGRP1,SEX,RACE,TRTSDT,TRTEDT,TRT01P,TRT01A,FASFL,SAFFL,ITTFL
    CDISCPILOT01,01-701-1015,1015,63,YEARS,<65,F,WHITE,2014-01-02,2014-07-02,Placebo,Placebo,Y,Y,N
    CDISCPILOT01,01-701-1023,,64.5,,,,,,,,,N,N,N
    ");
}

#[test]
fn xpt_output_reads_back() {
    let dir = TempDir::new().expect("tempdir");
    let paths = write_outputs(&dataset(), dir.path(), OutputFormat::Both).expect("write");
    assert!(paths.csv.is_some());

    let parsed = read_xpt(&paths.xpt.expect("xpt path")).expect("read xpt");
    assert_eq!(parsed.name, "ADSL");
    assert_eq!(parsed.label.as_deref(), Some("Subject-Level Analysis Dataset"));
    assert_eq!(parsed.num_rows(), 2);

    let usubjid = parsed.column_by_name("USUBJID").expect("USUBJID");
    assert_eq!(usubjid.length, 11);
    let trtsdt = parsed.column_by_name("TRTSDT").expect("TRTSDT");
    assert_eq!(trtsdt.format.as_deref(), Some("DATE"));

    let idx = parsed.column_index("TRTSDT").expect("TRTSDT index");
    assert_eq!(parsed.rows[0][idx], XptValue::numeric(19_725.0));
    assert!(parsed.rows[1][idx].is_missing());
}

#[test]
fn failed_render_writes_nothing() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("output");
    let dataset = AdslDataset::new(
        vec!["USUBJID".to_string(), "POPULATIONFL".to_string()],
        vec!["POPULATIONFL".to_string()],
        vec![record("01-701-1015")],
    )
    .expect("dataset");

    assert!(write_outputs(&dataset, &out, OutputFormat::Both).is_err());
    assert!(!out.exists());
}
