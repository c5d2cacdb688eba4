//! Conversion of XPT datasets into Polars DataFrames.

use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::Result;
use crate::reader::read_xpt;
use crate::types::{XptDataset, XptType, XptValue};

/// Character columns become `String` (blank stays blank), numeric columns
/// become nullable `Float64` with every missing code mapped to null.
pub fn dataset_to_dataframe(dataset: &XptDataset) -> Result<DataFrame> {
    let columns = dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let name = column.name.as_str().into();
            let series = match column.data_type {
                XptType::Char => {
                    let values: Vec<String> = dataset
                        .rows
                        .iter()
                        .map(|row| match row.get(idx) {
                            Some(XptValue::Char(text)) => text.clone(),
                            _ => String::new(),
                        })
                        .collect();
                    Series::new(name, values)
                }
                XptType::Num => {
                    let values: Vec<Option<f64>> = dataset
                        .rows
                        .iter()
                        .map(|row| row.get(idx).and_then(XptValue::as_f64))
                        .collect();
                    Series::new(name, values)
                }
            };
            Column::from(series)
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

pub fn read_xpt_to_dataframe(path: &Path) -> Result<DataFrame> {
    dataset_to_dataframe(&read_xpt(path)?)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{AnyValue, DataType};

    use super::*;
    use crate::XptColumn;

    #[test]
    fn test_dataset_to_dataframe() {
        let mut dataset = XptDataset::with_columns(
            "DM",
            vec![XptColumn::character("USUBJID", 11), XptColumn::numeric("AGE")],
        );
        dataset.add_row(vec![
            XptValue::character("01-701-1015"),
            XptValue::numeric(63.0),
        ]);
        dataset.add_row(vec![
            XptValue::character("01-701-1023"),
            XptValue::numeric_missing(),
        ]);

        let df = dataset_to_dataframe(&dataset).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("USUBJID").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("AGE").unwrap().dtype(), &DataType::Float64);
        assert_eq!(
            df.column("AGE").unwrap().get(0).unwrap(),
            AnyValue::Float64(63.0)
        );
        assert_eq!(df.column("AGE").unwrap().get(1).unwrap(), AnyValue::Null);
    }
}
