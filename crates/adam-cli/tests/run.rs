//! End-to-end tests for the `run` and `rules` commands.

use std::path::Path;

use clap::Parser;
use tempfile::TempDir;

use adam_cli::cli::{Cli, Command, RunArgs};
use adam_cli::commands::{resolve_rules, rule_tables, run};
use adam_cli::summary::summary_table;
use adam_xpt::{XptColumn, XptDataset, XptValue, write_xpt};

fn char_dataset(name: &str, columns: &[&str], rows: &[Vec<&str>]) -> XptDataset {
    let mut dataset = XptDataset::with_columns(
        name,
        columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let width = rows.iter().map(|row| row[idx].len()).max().unwrap_or(1).max(1);
                XptColumn::character(*column, u16::try_from(width).unwrap())
            })
            .collect(),
    );
    for row in rows {
        dataset.add_row(row.iter().map(|v| XptValue::character(*v)).collect());
    }
    dataset
}

fn write_study(dir: &Path) {
    let subjects = [
        ("1015", 63.0, "F", "WHITE", "Placebo"),
        ("1023", 64.0, "M", "WHITE", "Xanomeline High Dose"),
        ("1028", 71.0, "M", "BLACK OR AFRICAN AMERICAN", "Screen Failure"),
    ];
    let mut dm = XptDataset::with_columns(
        "DM",
        vec![
            XptColumn::character("STUDYID", 12),
            XptColumn::character("USUBJID", 11),
            XptColumn::character("SUBJID", 4),
            XptColumn::numeric("AGE"),
            XptColumn::character("AGEU", 5),
            XptColumn::character("SEX", 1),
            XptColumn::character("RACE", 25),
            XptColumn::character("ARM", 20),
            XptColumn::character("ACTARM", 20),
        ],
    )
    .with_label("Demographics");
    for (subjid, age, sex, race, arm) in subjects {
        dm.add_row(vec![
            XptValue::character("CDISCPILOT01"),
            XptValue::character(format!("01-701-{subjid}")),
            XptValue::character(subjid),
            XptValue::numeric(age),
            XptValue::character("YEARS"),
            XptValue::character(sex),
            XptValue::character(race),
            XptValue::character(arm),
            XptValue::character(arm),
        ]);
    }
    write_xpt(&dir.join("dm.xpt"), &dm).unwrap();

    let suppdm = char_dataset(
        "SUPPDM",
        &["STUDYID", "RDOMAIN", "USUBJID", "IDVAR", "IDVARVAL", "QNAM", "QVAL"],
        &[
            vec!["CDISCPILOT01", "DM", "01-701-1015", "", "", "SAFETY", "Y"],
            vec!["CDISCPILOT01", "DM", "01-701-1015", "", "", "ITT", "Y"],
            vec!["CDISCPILOT01", "DM", "01-701-1015", "", "", "EFFICACY", "Y"],
            vec!["CDISCPILOT01", "DM", "01-701-1015", "", "", "COMPLT8", "Y"],
            vec!["CDISCPILOT01", "DM", "01-701-1023", "", "", "SAFETY", "Y"],
            vec!["CDISCPILOT01", "DM", "01-701-1023", "", "", "ITT", "Y"],
        ],
    );
    write_xpt(&dir.join("SUPPDM.xpt"), &suppdm).unwrap();

    let ex = char_dataset(
        "EX",
        &["USUBJID", "EXTRT", "EXSTDTC", "EXENDTC"],
        &[
            vec!["01-701-1015", "PLACEBO", "2014-01-02", "2014-01-16"],
            vec!["01-701-1015", "PLACEBO", "2014-01-17", "2014-07-02"],
            vec!["01-701-1023", "XANOMELINE", "2012-08-05", "2012-08-27"],
        ],
    );
    write_xpt(&dir.join("ex.xpt"), &ex).unwrap();

    let ds = char_dataset(
        "DS",
        &["USUBJID", "DSCAT", "DSDECOD", "DSSTDTC"],
        &[
            vec!["01-701-1015", "PROTOCOL MILESTONE", "RANDOMIZED", "2014-01-02"],
            vec!["01-701-1015", "DISPOSITION EVENT", "COMPLETED", "2014-07-02"],
            vec!["01-701-1023", "DISPOSITION EVENT", "ADVERSE EVENT", "2012-09-02"],
        ],
    );
    write_xpt(&dir.join("ds.xpt"), &ds).unwrap();
}

fn run_args(argv: &[&str]) -> RunArgs {
    let cli = Cli::try_parse_from(argv).unwrap();
    match cli.command {
        Command::Run(args) => args,
        Command::Rules(_) => panic!("expected the run command"),
    }
}

#[test]
fn run_writes_adsl_csv() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir(&data).unwrap();
    write_study(&data);
    let out = temp.path().join("output");

    let args = run_args(&[
        "adsl",
        "run",
        data.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    let result = run(&args).unwrap();
    assert_eq!(result.subjects, 3);
    assert_eq!(result.columns, 24);
    assert_eq!(result.rules, "standard");
    assert!(result.outputs.xpt.is_none());

    let csv = std::fs::read_to_string(out.join("adsl.csv")).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r"
    STUDYID,USUBJID,SUBJID,AGE,AGEU,AGEGRP1,SEX,RACE,TRTSDT,TRTEDT,TRT01P,TRT01PN,TRT01A,TRT01AN,FASFL,SAFFL,ITTFL,EFFFL,COMPFL8,COMPFL16,COMPFL24,EOSSTT,EOSDT,DCSREAS
    CDISCPILOT01,01-701-1015,1015,63,YEARS,<65,F,WHITE,2014-01-02,2014-07-02,Placebo,3,Placebo,3,Y,Y,Y,Y,Y,N,N,COMPLETED,2014-07-02,
    CDISCPILOT01,01-701-1023,1023,64,YEARS,<65,M,WHITE,2012-08-05,2012-08-27,Xanomeline High Dose,1,Xanomeline High Dose,1,Y,Y,Y,N,N,N,N,DISCONTINUED,2012-09-02,ADVERSE EVENT
    CDISCPILOT01,01-701-1028,1028,71,YEARS,65-74,M,BLACK OR AFRICAN AMERICAN,,,Screen Failure,99,Screen Failure,99,N,N,N,N,N,N,N,ONGOING,,
    ");
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = TempDir::new().unwrap();
    write_study(temp.path());
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    for out in [&first, &second] {
        let args = run_args(&[
            "adsl",
            "run",
            temp.path().to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
            "--format",
            "both",
        ]);
        run(&args).unwrap();
    }
    for name in ["adsl.csv", "adsl.xpt"] {
        assert_eq!(
            std::fs::read(first.join(name)).unwrap(),
            std::fs::read(second.join(name)).unwrap(),
            "{name} differs between runs"
        );
    }
}

#[test]
fn dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    write_study(temp.path());
    let out = temp.path().join("output");
    let args = run_args(&[
        "adsl",
        "run",
        temp.path().to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--dry-run",
    ]);
    let result = run(&args).unwrap();
    assert!(result.dry_run);
    assert_eq!(result.subjects, 3);
    assert_eq!(result.outputs.iter().count(), 0);
    assert!(!out.exists());
}

#[test]
fn missing_domain_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_study(temp.path());
    std::fs::remove_file(temp.path().join("ex.xpt")).unwrap();
    let out = temp.path().join("output");
    let args = run_args(&[
        "adsl",
        "run",
        temp.path().to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ]);
    let err = run(&args).unwrap_err();
    assert!(format!("{err:#}").contains("EX"));
    assert!(!out.exists());
}

#[test]
fn population_flag_rules_project_fewer_columns() {
    let temp = TempDir::new().unwrap();
    write_study(temp.path());
    let out = temp.path().join("output");
    let args = run_args(&[
        "adsl",
        "run",
        temp.path().to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
        "--rules",
        "population-flags",
    ]);
    let result = run(&args).unwrap();
    assert_eq!(result.columns, 15);

    let summary = summary_table(&result.domains).to_string();
    assert!(summary.contains("EFFICACY"));
    assert_eq!(result.domains[0].added_columns.len(), 4);
}

#[test]
fn rules_file_conflicts_with_builtin_choice() {
    let parsed = Cli::try_parse_from([
        "adsl",
        "rules",
        "--rules",
        "pilot",
        "--rules-file",
        "rules.toml",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn rules_file_is_loaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.toml");
    let text = toml_rules();
    std::fs::write(&path, text).unwrap();

    let cli = Cli::try_parse_from(["adsl", "rules", "--rules-file", path.to_str().unwrap()])
        .unwrap();
    let Command::Rules(args) = cli.command else {
        panic!("expected the rules command");
    };
    let rules = resolve_rules(&args.rule_args).unwrap();
    assert_eq!(rules.name, "site-custom");
    assert_eq!(rules.columns, vec!["USUBJID", "AGEGRP1", "EOSSTT"]);
    assert_eq!(rule_tables(&rules).len(), 3);
}

fn toml_rules() -> &'static str {
    r#"
name = "site-custom"
columns = ["USUBJID", "AGEGRP1", "EOSSTT"]

[status]
category = "DISPOSITION EVENT"
discontinued = "DISCONTINUED"
default_status = "ONGOING"
selection = "most-recent"

[status.terms]
COMPLETED = "COMPLETED"

[treatment_codes]

[age_groups]
lower = 18.0
cutpoints = [40.0]
labels = ["18-40", ">40"]
"#
}
