use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use adam_core::run_adsl;
use adam_model::{RuleSet, RuleSetVersion};
use adam_output::{OutputPaths, write_outputs};

use crate::cli::{RuleArgs, RulesArgs, RunArgs};
use crate::summary::apply_table_style;
use crate::types::RunResult;

/// The rule file when one is given, else the selected built-in rule set.
pub fn resolve_rules(args: &RuleArgs) -> Result<RuleSet> {
    match &args.rules_file {
        Some(path) => {
            RuleSet::load(path).with_context(|| format!("load rule set {}", path.display()))
        }
        None => Ok(RuleSet::builtin(RuleSetVersion::from(args.rules))),
    }
}

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let rules = resolve_rules(&args.rule_args)?;
    let span = info_span!("run", rules = %rules.name, dry_run = args.dry_run);
    let _guard = span.enter();
    let start = Instant::now();

    let run = run_adsl(&args.data_dir, &rules)
        .with_context(|| format!("derive ADSL from {}", args.data_dir.display()))?;

    let outputs = if args.dry_run {
        info!("dry run, no files written");
        OutputPaths::default()
    } else {
        write_outputs(&run.dataset, &args.output_dir, args.format.into())?
    };
    info!(
        subjects = run.dataset.len(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );

    Ok(RunResult {
        rules: rules.name.clone(),
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
        subjects: run.dataset.len(),
        columns: run.dataset.columns.len(),
        domains: run.domains,
        outputs,
        dry_run: args.dry_run,
    })
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let rules = resolve_rules(&args.rule_args)?;
    println!("Rule set: {}", rules.name);
    println!(
        "Disposition: category {:?}, {} selection",
        rules.status.category, rules.status.selection
    );
    for table in rule_tables(&rules) {
        println!("{table}");
    }
    Ok(())
}

/// One table per lookup: status terms, treatment codes, flags, age groups, columns.
pub fn rule_tables(rules: &RuleSet) -> Vec<Table> {
    let mut tables = Vec::new();

    let mut status = Table::new();
    status.set_header(vec!["Disposition term", "EOSSTT"]);
    apply_table_style(&mut status);
    for (term, value) in &rules.status.terms {
        status.add_row(vec![term.as_str(), value.as_str()]);
    }
    if let Some(fallback) = rules.status.fallback_status() {
        status.add_row(vec!["(no record)", fallback]);
    }
    tables.push(status);

    if !rules.treatment_codes.is_empty() {
        let mut codes = Table::new();
        codes.set_header(vec!["Arm", "Code"]);
        apply_table_style(&mut codes);
        for (arm, code) in &rules.treatment_codes {
            codes.add_row(vec![arm.clone(), code.to_string()]);
        }
        tables.push(codes);
    }

    if !rules.flags.is_empty() {
        let mut flags = Table::new();
        flags.set_header(vec!["Qualifier", "Flag", "Default"]);
        apply_table_style(&mut flags);
        for flag in &rules.flags {
            flags.add_row(vec![
                flag.source.as_str(),
                flag.target.as_str(),
                rules.flag_default.as_str(),
            ]);
        }
        tables.push(flags);
    }

    let mut ages = Table::new();
    ages.set_header(vec!["AGEGRP1", "Lower (exclusive)", "Upper (inclusive)"]);
    apply_table_style(&mut ages);
    let groups = &rules.age_groups;
    for (idx, label) in groups.labels.iter().enumerate() {
        let lower = if idx == 0 {
            format!("{} (inclusive)", groups.lower)
        } else {
            groups
                .cutpoints
                .get(idx - 1)
                .map_or_else(|| "-".to_string(), ToString::to_string)
        };
        let upper = groups
            .cutpoints
            .get(idx)
            .map_or_else(|| "-".to_string(), ToString::to_string);
        ages.add_row(vec![label.clone(), lower, upper]);
    }
    tables.push(ages);

    let mut columns = Table::new();
    columns.set_header(vec!["#", "Column"]);
    apply_table_style(&mut columns);
    for (idx, column) in rules.columns.iter().enumerate() {
        columns.add_row(vec![(idx + 1).to_string(), column.clone()]);
    }
    tables.push(columns);

    tables
}
