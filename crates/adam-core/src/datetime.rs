//! Date/time parsing for `--DTC` variables.
//!
//! Only complete dates take part in the derivation: `YYYY-MM-DD`, optionally
//! followed by `T` or a blank and a time of `hh:mm`, `hh:mm:ss` or
//! `hh:mm:ss.fff`. Partial dates (`2014`, `2014-03`) and anything else parse
//! to `None`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

fn is_date_shape(bytes: &[u8]) -> bool {
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(idx, b)| match idx {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a complete ISO 8601 date or date-time.
///
/// # Examples
///
/// ```
/// use adam_core::datetime::parse_dtc;
///
/// assert!(parse_dtc("2014-01-02").is_some());
/// assert!(parse_dtc("2014-01-02T10:30").is_some());
/// assert!(parse_dtc("2014-01").is_none());
/// ```
pub fn parse_dtc(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() < 10 || !is_date_shape(&bytes[..10]) {
        return None;
    }
    let date = NaiveDate::parse_from_str(&trimmed[..10], "%Y-%m-%d").ok()?;

    let rest = &trimmed[10..];
    if rest.is_empty() {
        return Some(date.and_time(NaiveTime::MIN));
    }
    let time_text = rest.strip_prefix('T').or_else(|| rest.strip_prefix(' '))?;
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time_text, format).ok())
        .map(|time| date.and_time(time))
}

/// Calendar date of [`parse_dtc`].
pub fn parse_dtc_date(value: &str) -> Option<NaiveDate> {
    parse_dtc(value).map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn parses_complete_dates() {
        assert_eq!(parse_dtc("2014-01-02"), Some(datetime("2014-01-02 00:00:00")));
        assert_eq!(parse_dtc(" 2014-01-02 "), Some(datetime("2014-01-02 00:00:00")));
    }

    #[test]
    fn parses_times() {
        assert_eq!(
            parse_dtc("2014-01-02T10:30"),
            Some(datetime("2014-01-02 10:30:00"))
        );
        assert_eq!(
            parse_dtc("2014-01-02T10:30:15"),
            Some(datetime("2014-01-02 10:30:15"))
        );
        assert_eq!(
            parse_dtc("2014-01-02 10:30:15.250"),
            Some(datetime("2014-01-02 10:30:15.250"))
        );
    }

    #[test]
    fn rejects_partial_and_invalid_values() {
        for text in [
            "",
            "2014",
            "2014-01",
            "2014-1-2",
            "20140102",
            "2014-02-30",
            "2014-01-02T",
            "2014-01-02T25:00",
            "2014-01-02X10:30",
            "UNKNOWN",
        ] {
            assert_eq!(parse_dtc(text), None, "{text}");
        }
    }

    #[test]
    fn date_drops_time() {
        assert_eq!(
            parse_dtc_date("2013-12-31T23:59:59"),
            NaiveDate::from_ymd_opt(2013, 12, 31)
        );
    }

    mod props {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn complete_dates_parse_to_themselves(
                year in 1900i32..2100,
                month in 1u32..=12,
                day in 1u32..=28,
                hour in 0u32..24,
                minute in 0u32..60,
            ) {
                let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
                let text = date.format("%Y-%m-%d").to_string();
                prop_assert_eq!(parse_dtc_date(&text), Some(date));

                let with_time = format!("{text}T{hour:02}:{minute:02}");
                let parsed = parse_dtc(&with_time).unwrap();
                prop_assert_eq!(parsed.date(), date);
                prop_assert!(parsed >= date.and_time(NaiveTime::MIN));
            }
        }
    }
}
