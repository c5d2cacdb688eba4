//! Member header records.
//!
//! 1. Member header (carries the NAMESTR length)
//! 2. DSCRPTR header
//! 3. Member data: dataset name, SAS version, created datetime
//! 4. Member second: modified datetime, label, type
//! 5. NAMESTR header (carries the variable count)
//! 6. NAMESTR records, padded to a record boundary
//! 7. OBS header, followed by observation data

use crate::error::{Result, XptError};
use crate::types::{XptDataset, XptWriterOptions};

use super::library::RECORD_LEN;
use super::{build_fixed_header, read_string, write_string};

pub const MEMBER_HEADER_PREFIX: &str = "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";
pub const DSCRPTR_HEADER_PREFIX: &str = "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";
pub const NAMESTR_HEADER_PREFIX: &str = "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";
pub const OBS_HEADER_PREFIX: &str = "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

fn validate_prefix(record: &[u8], prefix: &str, expected: &'static str) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format(format!("{expected} too short")));
    }
    if !record.starts_with(prefix.as_bytes()) {
        return Err(XptError::missing_header(expected));
    }
    Ok(())
}

pub fn validate_member_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, MEMBER_HEADER_PREFIX, "MEMBER HEADER")
}

pub fn validate_dscrptr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, DSCRPTR_HEADER_PREFIX, "DSCRPTR HEADER")
}

pub fn validate_namestr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, NAMESTR_HEADER_PREFIX, "NAMESTR HEADER")
}

pub fn validate_obs_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, OBS_HEADER_PREFIX, "OBS HEADER")
}

fn parse_count(record: &[u8], offset: usize, field: &str) -> Result<usize> {
    if record.len() < offset + 4 {
        return Err(XptError::invalid_format(format!("{field} out of range")));
    }
    read_string(record, offset, 4)
        .trim()
        .parse::<usize>()
        .map_err(|_| XptError::NumericParse {
            field: field.to_string(),
        })
}

/// NAMESTR length at offset 74-77: 140, or 136 on VAX/VMS.
pub fn parse_namestr_len(record: &[u8]) -> Result<usize> {
    parse_count(record, 74, "NAMESTR length")
}

/// Variable count at offset 54-57 of the NAMESTR header.
pub fn parse_variable_count(record: &[u8]) -> Result<usize> {
    parse_count(record, 54, "variable count")
}

/// Dataset name at offset 8-15 of member data.
pub fn parse_dataset_name(record: &[u8]) -> Result<String> {
    if record.len() < 16 {
        return Err(XptError::invalid_format("member data too short"));
    }
    let name = read_string(record, 8, 8);
    if name.is_empty() {
        return Err(XptError::invalid_format("empty dataset name"));
    }
    Ok(name)
}

/// Dataset label at offset 32-71 of member second.
pub fn parse_dataset_label(record: &[u8]) -> Option<String> {
    let label = read_string(record, 32, 40);
    if label.is_empty() { None } else { Some(label) }
}

/// Dataset type at offset 72-79 of member second.
pub fn parse_dataset_type(record: &[u8]) -> Option<String> {
    let dtype = read_string(record, 72, 8);
    if dtype.is_empty() { None } else { Some(dtype) }
}

#[must_use]
pub fn build_member_header(namestr_len: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(MEMBER_HEADER_PREFIX);
    write_string(&mut record, 64, "0160", 4);
    write_string(&mut record, 74, &format!("{namestr_len:04}"), 4);
    record
}

#[must_use]
pub fn build_dscrptr_header() -> [u8; RECORD_LEN] {
    build_fixed_header(DSCRPTR_HEADER_PREFIX)
}

#[must_use]
pub fn build_member_data(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, &dataset.name, 8);
    write_string(&mut record, 16, "SASDATA", 8);
    write_string(&mut record, 24, &options.sas_version, 8);
    write_string(&mut record, 32, &options.os_name, 8);
    write_string(&mut record, 64, &options.format_created(), 16);
    record
}

#[must_use]
pub fn build_member_second(dataset: &XptDataset, options: &XptWriterOptions) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, &options.format_modified(), 16);
    write_string(&mut record, 32, dataset.effective_label(), 40);
    write_string(
        &mut record,
        72,
        dataset.dataset_type.as_deref().unwrap_or(""),
        8,
    );
    record
}

#[must_use]
pub fn build_namestr_header(var_count: usize) -> [u8; RECORD_LEN] {
    let mut record = build_fixed_header(NAMESTR_HEADER_PREFIX);
    record[48..54].fill(b'0');
    write_string(&mut record, 54, &format!("{var_count:04}"), 4);
    record
}

#[must_use]
pub fn build_obs_header() -> [u8; RECORD_LEN] {
    build_fixed_header(OBS_HEADER_PREFIX)
}

/// Round a byte offset up to the next record boundary.
#[must_use]
pub fn align_to_record(size: usize) -> usize {
    size.div_ceil(RECORD_LEN) * RECORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::NAMESTR_LEN;

    #[test]
    fn test_validate_headers() {
        assert!(validate_member_header(&build_member_header(NAMESTR_LEN)).is_ok());
        assert!(validate_dscrptr_header(&build_dscrptr_header()).is_ok());
        assert!(validate_namestr_header(&build_namestr_header(5)).is_ok());
        assert!(validate_obs_header(&build_obs_header()).is_ok());

        let obs = build_obs_header();
        assert!(validate_member_header(&obs).is_err());
    }

    #[test]
    fn test_counts() {
        assert_eq!(parse_namestr_len(&build_member_header(140)).unwrap(), 140);
        assert_eq!(parse_namestr_len(&build_member_header(136)).unwrap(), 136);
        assert_eq!(parse_variable_count(&build_namestr_header(24)).unwrap(), 24);
    }

    #[test]
    fn test_member_records() {
        let dataset = XptDataset::new("ADSL").with_label("Subject-Level Analysis Dataset");
        let options = XptWriterOptions::default();

        let data = build_member_data(&dataset, &options);
        assert_eq!(parse_dataset_name(&data).unwrap(), "ADSL");

        let second = build_member_second(&dataset, &options);
        assert_eq!(
            parse_dataset_label(&second).as_deref(),
            Some("Subject-Level Analysis Dataset")
        );
        assert_eq!(parse_dataset_type(&second), None);
    }

    #[test]
    fn test_align_to_record() {
        assert_eq!(align_to_record(0), 0);
        assert_eq!(align_to_record(80), 80);
        assert_eq!(align_to_record(81), 160);
        assert_eq!(align_to_record(140), 160);
        assert_eq!(align_to_record(280), 320);
    }
}
