//! NAMESTR records: one per variable.
//!
//! | Offset | Field   | Description                    |
//! |--------|---------|--------------------------------|
//! | 0-1    | ntype   | 1=NUMERIC, 2=CHAR              |
//! | 4-5    | nlng    | Variable length in observation |
//! | 6-7    | nvar0   | Variable number                |
//! | 8-15   | nname   | Variable name                  |
//! | 16-55  | nlabel  | Variable label                 |
//! | 56-63  | nform   | Format name                    |
//! | 64-69  | nfl/nfd/nfj | Format length, decimals, justification |
//! | 72-79  | niform  | Informat name                  |
//! | 80-83  | nifl/nifd | Informat length, decimals    |
//! | 84-87  | npos    | Position in observation        |

use crate::error::{Result, XptError};
use crate::types::{Justification, XptColumn, XptType};

use super::read_string;

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// VAX/VMS NAMESTR length.
pub const NAMESTR_LEN_VAX: usize = 136;

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

pub fn parse_namestr(data: &[u8], namestr_len: usize, index: usize) -> Result<XptColumn> {
    if data.len() < namestr_len.min(88) {
        return Err(XptError::InvalidNamestr {
            index,
            message: format!("data too short: {} bytes", data.len()),
        });
    }

    let ntype = read_i16(data, 0);
    let data_type = XptType::from_ntype(ntype).ok_or_else(|| XptError::InvalidNamestr {
        index,
        message: format!("invalid ntype: {ntype}"),
    })?;

    let length = read_u16(data, 4);
    if length == 0 {
        return Err(XptError::InvalidNamestr {
            index,
            message: "variable length is zero".to_string(),
        });
    }

    let name = read_string(data, 8, 8);
    if name.is_empty() {
        return Err(XptError::InvalidNamestr {
            index,
            message: "empty variable name".to_string(),
        });
    }

    Ok(XptColumn {
        name,
        label: non_empty(read_string(data, 16, 40)),
        data_type,
        length,
        format: non_empty(read_string(data, 56, 8)),
        format_length: read_u16(data, 64),
        format_decimals: read_u16(data, 66),
        justification: Justification::from_nfj(read_i16(data, 68)),
        informat: non_empty(read_string(data, 72, 8)),
        informat_length: read_u16(data, 80),
        informat_decimals: read_u16(data, 82),
    })
}

/// Parse `var_count` consecutive NAMESTR records.
pub fn parse_namestr_records(
    data: &[u8],
    var_count: usize,
    namestr_len: usize,
) -> Result<Vec<XptColumn>> {
    (0..var_count)
        .map(|index| {
            let start = index * namestr_len;
            let record = data
                .get(start..start + namestr_len)
                .ok_or(XptError::RecordOutOfBounds { offset: start })?;
            parse_namestr(record, namestr_len, index)
        })
        .collect()
}

/// Build a NAMESTR for a column at 1-based `varnum` and byte `position`.
#[must_use]
pub fn build_namestr(column: &XptColumn, varnum: u16, position: u32) -> [u8; NAMESTR_LEN] {
    let mut buf = [0u8; NAMESTR_LEN];

    write_i16(&mut buf, 0, column.data_type.to_ntype());
    write_u16(&mut buf, 4, column.length);
    write_u16(&mut buf, 6, varnum);
    write_padded(&mut buf, 8, &column.name, 8);
    write_padded(&mut buf, 16, column.label.as_deref().unwrap_or(""), 40);
    write_padded(&mut buf, 56, column.format.as_deref().unwrap_or(""), 8);
    write_u16(&mut buf, 64, column.format_length);
    write_u16(&mut buf, 66, column.format_decimals);
    write_i16(&mut buf, 68, column.justification.to_nfj());
    write_padded(&mut buf, 72, column.informat.as_deref().unwrap_or(""), 8);
    write_u16(&mut buf, 80, column.informat_length);
    write_u16(&mut buf, 82, column.informat_decimals);
    buf[84..88].copy_from_slice(&position.to_be_bytes());

    buf
}

fn read_i16(data: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([data[offset], data[offset + 1]])
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn write_i16(buf: &mut [u8], offset: usize, value: i16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

/// Blank-padded character field.
fn write_padded(buf: &mut [u8], offset: usize, value: &str, len: usize) {
    let field = &mut buf[offset..offset + len];
    field.fill(b' ');
    let bytes = value.as_bytes();
    let copy_len = bytes.len().min(len);
    field[..copy_len].copy_from_slice(&bytes[..copy_len]);
}
