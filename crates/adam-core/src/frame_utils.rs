//! Row-wise access to source DataFrames.

use adam_common::{any_to_f64, any_to_opt_string};
use adam_model::AdamError;
use anyhow::Result;
use polars::prelude::{AnyValue, DataFrame, DataType};

/// Fail with [`AdamError::MissingColumn`] for the first absent column.
pub fn require_columns(df: &DataFrame, table: &str, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(AdamError::missing_column(table, *column).into());
        }
    }
    Ok(())
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Text values of a column; null cells stay `None`.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?;
    Ok((0..df.height())
        .map(|idx| any_to_opt_string(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

/// Like [`string_values`], but an absent column reads as all nulls.
pub fn optional_string_values(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    string_values(df, name).unwrap_or_else(|_| vec![None; df.height()])
}

pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    Ok((0..df.height())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

pub fn is_numeric_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok_and(|column| {
        matches!(
            column.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    })
}

/// True for null or all-blank text.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
