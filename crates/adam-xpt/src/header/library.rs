//! Library header records.
//!
//! 1. Fixed header: `HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!...`
//! 2. Real header: SAS version, OS, created datetime
//! 3. Second header: modified datetime

use crate::error::{Result, XptError};
use crate::types::XptWriterOptions;

use super::{build_fixed_header, read_string, write_string};

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

/// Library header prefix.
pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";

/// Library header information from the real and second headers.
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub sas_version: String,
    pub os_name: String,
    /// `ddMMMyy:hh:mm:ss`
    pub created: String,
    pub modified: String,
}

impl From<&XptWriterOptions> for LibraryInfo {
    fn from(opts: &XptWriterOptions) -> Self {
        Self {
            sas_version: opts.sas_version.clone(),
            os_name: opts.os_name.clone(),
            created: opts.format_created(),
            modified: opts.format_modified(),
        }
    }
}

pub fn validate_library_header(record: &[u8]) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XptError::invalid_format("record too short"));
    }
    if !record.starts_with(LIBRARY_HEADER_PREFIX.as_bytes()) {
        return Err(XptError::missing_header("LIBRARY HEADER"));
    }
    Ok(())
}

/// Parse the real header.
///
/// | Offset | Length | Field   |
/// |--------|--------|---------|
/// | 0-23   | 24     | `SAS     SAS     SASLIB  ` |
/// | 24-31  | 8      | SAS version |
/// | 32-39  | 8      | Operating system |
/// | 64-79  | 16     | Created datetime |
pub fn parse_real_header(real: &[u8], second: &[u8]) -> Result<LibraryInfo> {
    if real.len() < RECORD_LEN {
        return Err(XptError::invalid_format("real header too short"));
    }
    Ok(LibraryInfo {
        sas_version: read_string(real, 24, 8),
        os_name: read_string(real, 32, 8),
        created: read_string(real, 64, 16),
        modified: read_string(second, 0, 16),
    })
}

#[must_use]
pub fn build_library_header() -> [u8; RECORD_LEN] {
    build_fixed_header(LIBRARY_HEADER_PREFIX)
}

#[must_use]
pub fn build_real_header(info: &LibraryInfo) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, "SAS", 8);
    write_string(&mut record, 8, "SAS", 8);
    write_string(&mut record, 16, "SASLIB", 8);
    write_string(&mut record, 24, &info.sas_version, 8);
    write_string(&mut record, 32, &info.os_name, 8);
    write_string(&mut record, 64, &info.created, 16);
    record
}

#[must_use]
pub fn build_second_header(modified: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    write_string(&mut record, 0, modified, 16);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_library_header() {
        let header = build_library_header();
        assert!(validate_library_header(&header).is_ok());
        assert_eq!(&header[48..78], [b'0'; 30].as_slice());
        assert_eq!(&header[78..], b"  ");

        let invalid = [b'X'; RECORD_LEN];
        assert!(validate_library_header(&invalid).is_err());
    }

    #[test]
    fn test_real_header_roundtrip() {
        let info = LibraryInfo {
            sas_version: "9.4".to_string(),
            os_name: "X64_10PR".to_string(),
            created: "15MAR24:14:30:45".to_string(),
            modified: "16MAR24:08:00:00".to_string(),
        };
        let real = build_real_header(&info);
        let second = build_second_header(&info.modified);
        let parsed = parse_real_header(&real, &second).unwrap();
        assert_eq!(parsed.sas_version, "9.4");
        assert_eq!(parsed.os_name, "X64_10PR");
        assert_eq!(parsed.created, "15MAR24:14:30:45");
        assert_eq!(parsed.modified, "16MAR24:08:00:00");
    }
}
