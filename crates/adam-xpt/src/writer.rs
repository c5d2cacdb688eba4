//! XPT file writer.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, XptError};
use crate::float::{encode_missing, ieee_to_ibm};
use crate::header::{
    LibraryInfo, RECORD_LEN, build_dscrptr_header, build_library_header, build_member_data,
    build_member_header, build_member_second, build_namestr, build_namestr_header,
    build_obs_header, build_real_header, build_second_header,
};
use crate::types::{NumericValue, XptColumn, XptDataset, XptType, XptValue, XptWriterOptions};

/// Longest character variable a V5 file can hold.
const MAX_CHAR_LENGTH: u16 = 200;

/// Writes a single dataset as a V5 transport file.
pub struct XptWriter<W: Write> {
    writer: BufWriter<W>,
    options: XptWriterOptions,
}

impl<W: Write> XptWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XptWriterOptions::default())
    }

    pub fn with_options(writer: W, options: XptWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Validate and write the dataset. Nothing is written if validation fails.
    pub fn write_dataset(mut self, dataset: &XptDataset) -> Result<()> {
        validate_dataset(dataset)?;

        let info = LibraryInfo::from(&self.options);

        self.writer.write_all(&build_library_header())?;
        self.writer.write_all(&build_real_header(&info))?;
        self.writer.write_all(&build_second_header(&info.modified))?;

        self.writer
            .write_all(&build_member_header(self.options.namestr_length))?;
        self.writer.write_all(&build_dscrptr_header())?;
        self.writer
            .write_all(&build_member_data(dataset, &self.options))?;
        self.writer
            .write_all(&build_member_second(dataset, &self.options))?;

        self.writer
            .write_all(&build_namestr_header(dataset.columns.len()))?;
        self.write_namestr_records(&dataset.columns)?;

        self.writer.write_all(&build_obs_header())?;
        self.write_observations(dataset)?;

        self.writer.flush()?;
        Ok(())
    }

    fn write_namestr_records(&mut self, columns: &[XptColumn]) -> Result<()> {
        let mut record_writer = RecordWriter::new(&mut self.writer);
        let mut position = 0u32;

        for (idx, column) in columns.iter().enumerate() {
            let varnum = u16::try_from(idx + 1).map_err(|_| XptError::ObservationOverflow)?;
            record_writer.write_bytes(&build_namestr(column, varnum, position))?;
            position = position.saturating_add(u32::from(column.length));
        }

        record_writer.finish()
    }

    fn write_observations(&mut self, dataset: &XptDataset) -> Result<()> {
        let obs_len = dataset.observation_length();
        let mut record_writer = RecordWriter::new(&mut self.writer);
        let mut obs = vec![b' '; obs_len];

        for row in &dataset.rows {
            let mut pos = 0usize;
            for (value, column) in row.iter().zip(&dataset.columns) {
                let len = usize::from(column.length);
                encode_value(value, &mut obs[pos..pos + len]);
                pos += len;
            }
            record_writer.write_bytes(&obs)?;
        }

        record_writer.finish()
    }
}

impl XptWriter<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }

    pub fn create_with_options(path: &Path, options: XptWriterOptions) -> Result<Self> {
        Ok(Self::with_options(File::create(path)?, options))
    }
}

/// Write a dataset to an XPT file.
pub fn write_xpt(path: &Path, dataset: &XptDataset) -> Result<()> {
    validate_dataset(dataset)?;
    XptWriter::create(path)?.write_dataset(dataset)
}

pub fn write_xpt_with_options(
    path: &Path,
    dataset: &XptDataset,
    options: &XptWriterOptions,
) -> Result<()> {
    validate_dataset(dataset)?;
    XptWriter::create_with_options(path, options.clone())?.write_dataset(dataset)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 8
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn validate_dataset(dataset: &XptDataset) -> Result<()> {
    if !is_valid_name(&dataset.name) {
        return Err(XptError::InvalidDatasetName {
            name: dataset.name.clone(),
        });
    }

    let mut seen = BTreeSet::new();
    for column in &dataset.columns {
        if !is_valid_name(&column.name) {
            return Err(XptError::InvalidVariableName {
                name: column.name.clone(),
            });
        }
        if !seen.insert(column.name.to_ascii_uppercase()) {
            return Err(XptError::DuplicateVariable {
                name: column.name.clone(),
            });
        }
        let length_ok = match column.data_type {
            XptType::Num => column.length == 8,
            XptType::Char => (1..=MAX_CHAR_LENGTH).contains(&column.length),
        };
        if !length_ok {
            return Err(XptError::invalid_format(format!(
                "column {} has unsupported length {}",
                column.name, column.length
            )));
        }
    }

    for row in &dataset.rows {
        if row.len() != dataset.columns.len() {
            return Err(XptError::RowLengthMismatch {
                expected: dataset.columns.len(),
                actual: row.len(),
            });
        }
        for (value, column) in row.iter().zip(&dataset.columns) {
            let matches = matches!(
                (value, column.data_type),
                (XptValue::Char(_), XptType::Char) | (XptValue::Num(_), XptType::Num)
            );
            if !matches {
                return Err(XptError::TypeMismatch {
                    name: column.name.clone(),
                    expected: if column.is_numeric() { "numeric" } else { "character" },
                });
            }
        }
    }

    Ok(())
}

/// Encode into a slot of the column's width.
fn encode_value(value: &XptValue, slot: &mut [u8]) {
    match value {
        XptValue::Char(text) => encode_char(text, slot),
        XptValue::Num(number) => slot.copy_from_slice(&encode_numeric(number)),
    }
}

fn encode_char(value: &str, slot: &mut [u8]) {
    slot.fill(b' ');
    for (dst, ch) in slot.iter_mut().zip(value.chars()) {
        *dst = if ch.is_ascii() { ch as u8 } else { b'?' };
    }
}

fn encode_numeric(value: &NumericValue) -> [u8; 8] {
    match value {
        NumericValue::Missing(missing) => encode_missing(*missing),
        NumericValue::Value(v) => ieee_to_ibm(*v),
    }
}

/// Packs bytes into 80-byte records, blank-padding the last one.
struct RecordWriter<'a, W: Write> {
    writer: &'a mut W,
    record: [u8; RECORD_LEN],
    pos: usize,
}

impl<'a, W: Write> RecordWriter<'a, W> {
    fn new(writer: &'a mut W) -> Self {
        Self {
            writer,
            record: [b' '; RECORD_LEN],
            pos: 0,
        }
    }

    fn write_bytes(&mut self, mut bytes: &[u8]) -> Result<()> {
        while !bytes.is_empty() {
            let take = (RECORD_LEN - self.pos).min(bytes.len());
            self.record[self.pos..self.pos + take].copy_from_slice(&bytes[..take]);
            self.pos += take;
            bytes = &bytes[take..];

            if self.pos == RECORD_LEN {
                self.writer.write_all(&self.record)?;
                self.record = [b' '; RECORD_LEN];
                self.pos = 0;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pos > 0 {
            self.record[self.pos..].fill(b' ');
            self.writer.write_all(&self.record)?;
            self.pos = 0;
        }
        Ok(())
    }
}
