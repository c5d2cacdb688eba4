//! Delimited text output.

use anyhow::{Context, Result};

use adam_model::AdslDataset;

use crate::common::format_cell;

pub const CSV_FILE_NAME: &str = "adsl.csv";

/// Header row plus one row per record, `\n` line endings.
pub fn render_csv(dataset: &AdslDataset) -> Result<Vec<u8>> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(&dataset.columns)
        .context("write CSV header")?;
    for record in &dataset.records {
        let cells: Vec<String> = dataset
            .row(record)
            .into_iter()
            .map(format_cell)
            .collect();
        writer.write_record(&cells).context("write CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush CSV output: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use adam_model::{AdslRecord, RuleSet};

    use super::*;

    #[test]
    fn empty_dataset_has_header_only() {
        let rules = RuleSet::baseline();
        let dataset = AdslDataset::new(rules.columns.clone(), Vec::new(), Vec::new()).unwrap();
        let text = String::from_utf8(render_csv(&dataset).unwrap()).unwrap();
        assert_eq!(
            text,
            "STUDYID,USUBJID,SUBJID,AGEU,AGE,AGEGRP1,SEX,RACE,TRTSDT,TRTEDT,TRT01P,TRT01A,FASFL\n"
        );
    }

    #[test]
    fn quotes_values_with_delimiters() {
        let dataset = AdslDataset::new(
            vec!["USUBJID".to_string(), "DCSREAS".to_string()],
            Vec::new(),
            vec![AdslRecord {
                usubjid: "S1".to_string(),
                dcsreas: Some("WITHDRAWAL, SUBJECT".to_string()),
                ..AdslRecord::default()
            }],
        )
        .unwrap();
        let text = String::from_utf8(render_csv(&dataset).unwrap()).unwrap();
        assert_eq!(text, "USUBJID,DCSREAS\nS1,\"WITHDRAWAL, SUBJECT\"\n");
    }
}
