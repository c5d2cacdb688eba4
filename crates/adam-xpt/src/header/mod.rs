//! XPT header record parsing and building.
//!
//! A V5 transport file is a sequence of 80-byte records:
//! - Library headers (file-level metadata)
//! - Member headers (dataset-level metadata)
//! - NAMESTR records (variable definitions)
//! - OBS header (marks start of observation data)

pub mod library;
pub mod member;
pub mod namestr;

pub use library::{
    LIBRARY_HEADER_PREFIX, LibraryInfo, RECORD_LEN, build_library_header, build_real_header,
    build_second_header, parse_real_header, validate_library_header,
};
pub use member::{
    DSCRPTR_HEADER_PREFIX, MEMBER_HEADER_PREFIX, NAMESTR_HEADER_PREFIX, OBS_HEADER_PREFIX,
    align_to_record, build_dscrptr_header, build_member_data, build_member_header,
    build_member_second, build_namestr_header, build_obs_header, parse_dataset_label,
    parse_dataset_name, parse_dataset_type, parse_namestr_len, parse_variable_count,
    validate_dscrptr_header, validate_member_header, validate_namestr_header,
    validate_obs_header,
};
pub use namestr::{NAMESTR_LEN, NAMESTR_LEN_VAX, build_namestr, parse_namestr, parse_namestr_records};

/// Build a fixed header record: 48-byte prefix, `0` fill to byte 78, two blanks.
pub(crate) fn build_fixed_header(prefix: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    let prefix_bytes = prefix.as_bytes();
    let copy_len = prefix_bytes.len().min(48);
    record[..copy_len].copy_from_slice(&prefix_bytes[..copy_len]);
    record[48..78].fill(b'0');
    record
}

/// Read a string field, trimming trailing blanks.
pub(crate) fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    data.get(offset..offset + len)
        .map(|slice| String::from_utf8_lossy(slice).trim_end().to_string())
        .unwrap_or_default()
}

/// Write a string field; the buffer is expected to be blank-filled already.
pub(crate) fn write_string(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let bytes = value.as_bytes();
    let copy_len = bytes.len().min(len);
    buf[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
}
