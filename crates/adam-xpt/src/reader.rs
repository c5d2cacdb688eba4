//! XPT file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{ibm_to_ieee, is_missing};
use crate::header::{
    NAMESTR_LEN, NAMESTR_LEN_VAX, RECORD_LEN, align_to_record, parse_dataset_label,
    parse_dataset_name, parse_dataset_type, parse_namestr_len, parse_namestr_records,
    parse_variable_count, validate_dscrptr_header, validate_library_header,
    validate_member_header, validate_namestr_header, validate_obs_header,
};
use crate::types::{
    MissingValue, NumericValue, XptColumn, XptDataset, XptReaderOptions, XptType, XptValue,
};

/// Reads the first member of a V5 transport file.
pub struct XptReader<R: Read> {
    reader: BufReader<R>,
    options: XptReaderOptions,
}

impl<R: Read> XptReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, XptReaderOptions::default())
    }

    pub fn with_options(reader: R, options: XptReaderOptions) -> Self {
        Self {
            reader: BufReader::new(reader),
            options,
        }
    }

    /// Read the whole input and parse the first dataset.
    pub fn read_dataset(mut self) -> Result<XptDataset> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        parse_xpt_data(&data, &self.options)
    }
}

impl XptReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, XptReaderOptions::default())
    }

    pub fn open_with_options(path: &Path, options: XptReaderOptions) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                XptError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                XptError::Io(e)
            }
        })?;
        Ok(Self::with_options(file, options))
    }
}

/// Read an XPT file from a path.
pub fn read_xpt(path: &Path) -> Result<XptDataset> {
    XptReader::open(path)?.read_dataset()
}

pub fn read_xpt_with_options(path: &Path, options: XptReaderOptions) -> Result<XptDataset> {
    XptReader::open_with_options(path, options)?.read_dataset()
}

fn parse_xpt_data(data: &[u8], options: &XptReaderOptions) -> Result<XptDataset> {
    if data.len() < RECORD_LEN * 9 {
        return Err(XptError::invalid_format("file too small"));
    }
    if !data.len().is_multiple_of(RECORD_LEN) {
        return Err(XptError::invalid_format(
            "file length is not a multiple of 80",
        ));
    }

    let mut offset = 0usize;

    validate_library_header(read_record(data, offset)?)?;
    // real and modified headers carry nothing the datasets need
    offset += RECORD_LEN * 3;

    let member_header = read_record(data, offset)?;
    validate_member_header(member_header)?;
    let namestr_len = parse_namestr_len(member_header)?;
    if namestr_len != NAMESTR_LEN && namestr_len != NAMESTR_LEN_VAX {
        return Err(XptError::invalid_format(format!(
            "unsupported NAMESTR length {namestr_len}"
        )));
    }
    offset += RECORD_LEN;

    validate_dscrptr_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let dataset_name = parse_dataset_name(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let member_second = read_record(data, offset)?;
    let dataset_label = parse_dataset_label(member_second);
    let dataset_type = parse_dataset_type(member_second);
    offset += RECORD_LEN;

    let namestr_header = read_record(data, offset)?;
    validate_namestr_header(namestr_header)?;
    let var_count = parse_variable_count(namestr_header)?;
    offset += RECORD_LEN;

    let namestr_total = var_count
        .checked_mul(namestr_len)
        .ok_or(XptError::ObservationOverflow)?;
    let namestr_data = read_block(data, offset, namestr_total)?;
    let columns = parse_namestr_records(namestr_data, var_count, namestr_len)?;
    offset = align_to_record(offset + namestr_total);

    validate_obs_header(read_record(data, offset)?)?;
    offset += RECORD_LEN;

    let obs_len = observation_length(&columns)?;
    let rows = parse_observations(data, offset, obs_len, &columns, options)?;

    Ok(XptDataset {
        name: dataset_name,
        label: dataset_label,
        dataset_type,
        columns,
        rows,
    })
}

fn read_record(data: &[u8], offset: usize) -> Result<&[u8]> {
    read_block(data, offset, RECORD_LEN)
}

fn read_block(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset + len)
        .ok_or(XptError::RecordOutOfBounds { offset })
}

fn observation_length(columns: &[XptColumn]) -> Result<usize> {
    columns.iter().try_fold(0usize, |total, column| {
        total
            .checked_add(usize::from(column.length))
            .ok_or(XptError::ObservationOverflow)
    })
}

fn parse_observations(
    data: &[u8],
    offset: usize,
    obs_len: usize,
    columns: &[XptColumn],
    options: &XptReaderOptions,
) -> Result<Vec<Vec<XptValue>>> {
    if obs_len == 0 {
        return Ok(Vec::new());
    }

    let body = data
        .get(offset..)
        .ok_or(XptError::RecordOutOfBounds { offset })?;
    let mut rows_total = body.len() / obs_len;

    // the final record is blank-padded
    let remainder = &body[rows_total * obs_len..];
    if remainder.iter().any(|&b| b != b' ') {
        return Err(XptError::TrailingBytes);
    }
    while rows_total > 0 {
        let start = (rows_total - 1) * obs_len;
        if body[start..start + obs_len].iter().all(|&b| b == b' ') {
            rows_total -= 1;
        } else {
            break;
        }
    }

    Ok(body[..rows_total * obs_len]
        .chunks_exact(obs_len)
        .map(|row| parse_row(row, columns, options))
        .collect())
}

fn parse_row(row_bytes: &[u8], columns: &[XptColumn], options: &XptReaderOptions) -> Vec<XptValue> {
    let mut pos = 0usize;
    columns
        .iter()
        .map(|column| {
            let len = usize::from(column.length);
            let slice = &row_bytes[pos..pos + len];
            pos += len;
            match column.data_type {
                XptType::Char => XptValue::Char(decode_char(slice, options.trim_strings)),
                XptType::Num => XptValue::Num(decode_numeric(slice)),
            }
        })
        .collect()
}

fn decode_char(bytes: &[u8], trim: bool) -> String {
    let text = String::from_utf8_lossy(bytes);
    if trim {
        text.trim_end().to_string()
    } else {
        text.into_owned()
    }
}

/// Numerics shorter than 8 bytes are truncated IBM doubles.
fn decode_numeric(bytes: &[u8]) -> NumericValue {
    if bytes.is_empty() {
        return NumericValue::Missing(MissingValue::Standard);
    }
    if let Some(missing) = is_missing(bytes) {
        return NumericValue::Missing(missing);
    }

    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[..len].copy_from_slice(&bytes[..len]);
    NumericValue::Value(ibm_to_ieee(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_char() {
        assert_eq!(decode_char(b"01-701-1015   ", true), "01-701-1015");
        assert_eq!(decode_char(b"hello   ", false), "hello   ");
        assert_eq!(decode_char(b"", true), "");
    }

    #[test]
    fn test_decode_numeric_missing() {
        let result = decode_numeric(&[0x2e, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(result.missing_type(), Some(MissingValue::Standard));

        let result = decode_numeric(&[0x41, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(result.missing_type(), Some(MissingValue::Special('A')));
    }

    #[test]
    fn test_decode_numeric_value() {
        let one = [0x41, 0x10, 0, 0, 0, 0, 0, 0];
        let value = decode_numeric(&one).value().unwrap();
        assert!((value - 1.0).abs() < 1e-10);

        let truncated = decode_numeric(&[0x41, 0x10, 0]).value().unwrap();
        assert!((truncated - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_observation_length() {
        let columns = vec![XptColumn::numeric("AGE"), XptColumn::character("SEX", 1)];
        assert_eq!(observation_length(&columns).unwrap(), 9);
    }

    #[test]
    fn test_rejects_short_input() {
        let err = parse_xpt_data(&[b' '; 160], &XptReaderOptions::default()).unwrap_err();
        assert!(matches!(err, XptError::InvalidFormat { .. }));
    }
}
