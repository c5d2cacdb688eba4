//! XPT (SAS Transport) export of ADSL.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use adam_model::{AdslDataset, AdslValue, ColumnKind};
use adam_xpt::{XptColumn, XptDataset, XptValue, XptWriter};

pub const XPT_FILE_NAME: &str = "adsl.xpt";
pub const ADSL_DATASET_NAME: &str = "ADSL";
pub const ADSL_DATASET_LABEL: &str = "Subject-Level Analysis Dataset";

/// Longest character variable a V5 file can hold.
const MAX_CHAR_LENGTH: usize = 200;

/// Days between the SAS epoch (1960-01-01) and `date`.
fn sas_date(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1960, 1, 1).unwrap_or_default();
    date.signed_duration_since(epoch).num_days() as f64
}

/// Build the transport dataset: text columns sized to their longest value,
/// dates as SAS date numbers with a `DATE9.` format.
pub fn build_xpt_dataset(dataset: &AdslDataset) -> Result<XptDataset> {
    let rows: Vec<Vec<AdslValue<'_>>> = dataset
        .records
        .iter()
        .map(|record| dataset.row(record))
        .collect();

    let mut columns = Vec::with_capacity(dataset.columns.len());
    for (idx, name) in dataset.columns.iter().enumerate() {
        let kind = dataset
            .column_kind(name)
            .with_context(|| format!("no ADSL variable named {name}"))?;
        let mut column = match kind {
            ColumnKind::Text => {
                let width = rows
                    .iter()
                    .map(|row| match row[idx] {
                        AdslValue::Text(text) => text.len(),
                        _ => 0,
                    })
                    .max()
                    .unwrap_or(0)
                    .clamp(1, MAX_CHAR_LENGTH);
                XptColumn::character(name.as_str(), u16::try_from(width)?)
            }
            ColumnKind::Number => XptColumn::numeric(name.as_str()),
            ColumnKind::Date => XptColumn::numeric(name.as_str()).with_format("DATE", 9, 0),
        };
        if let Some(label) = dataset.column_label(name) {
            column = column.with_label(label);
        }
        columns.push(column);
    }

    let kinds: Vec<Option<ColumnKind>> = dataset
        .columns
        .iter()
        .map(|name| dataset.column_kind(name))
        .collect();
    let mut xpt =
        XptDataset::with_columns(ADSL_DATASET_NAME, columns).with_label(ADSL_DATASET_LABEL);
    for row in rows {
        xpt.add_row(
            row.into_iter()
                .zip(&kinds)
                .map(|(value, kind)| to_xpt_value(value, *kind))
                .collect(),
        );
    }
    Ok(xpt)
}

fn to_xpt_value(value: AdslValue<'_>, kind: Option<ColumnKind>) -> XptValue {
    match value {
        AdslValue::Text(text) => XptValue::character(text),
        AdslValue::Number(number) => XptValue::numeric(number),
        AdslValue::Integer(number) => XptValue::numeric(number as f64),
        AdslValue::Date(date) => XptValue::numeric(sas_date(date)),
        AdslValue::Null if kind == Some(ColumnKind::Text) => XptValue::character(""),
        AdslValue::Null => XptValue::numeric_missing(),
    }
}

/// Encode the dataset as transport file bytes.
pub fn render_xpt(dataset: &AdslDataset) -> Result<Vec<u8>> {
    let xpt = build_xpt_dataset(dataset)?;
    let mut bytes = Vec::new();
    XptWriter::new(&mut bytes)
        .write_dataset(&xpt)
        .with_context(|| format!("encode {ADSL_DATASET_NAME} transport file"))?;
    Ok(bytes)
}
