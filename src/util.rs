use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};

/// Parse an 8-digit DICOM DA value (`YYYYMMDD`).
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y%m%d").map_err(|_| Error::Parse {
        value: value.to_string(),
        expected: "a YYYYMMDD date",
    })
}

/// Parse a DICOM TM value (`HHMMSS`, optionally carrying a fractional part).
fn parse_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    // Sub-second precision is discarded.
    let whole = match trimmed.split_once('.') {
        Some((whole, _fraction)) => whole,
        None => trimmed,
    };
    NaiveTime::parse_from_str(whole, "%H%M%S").map_err(|_| Error::Parse {
        value: value.to_string(),
        expected: "a HHMMSS time",
    })
}

/// Combine DICOM date and optional time values into one timestamp. A missing
/// time component means midnight, matching how date-only tags are reported.
pub fn parse_datetime(date: &str, time: Option<&str>) -> Result<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = match time {
        Some(time) => parse_time(time)?,
        None => NaiveTime::MIN,
    };
    Ok(date.and_time(time))
}

/// Parse the archive's `LastUpdate` stamp (`YYYYMMDDTHHMMSS`).
pub fn parse_timestamp(stamp: &str) -> Result<NaiveDateTime> {
    match stamp.split_once('T') {
        Some((date, time)) => parse_datetime(date, Some(time)),
        None => Err(Error::Parse {
            value: stamp.to_string(),
            expected: "a YYYYMMDDTHHMMSS timestamp",
        }),
    }
}

/// Split a DICOM multi-valued string on its backslash separator.
pub fn split_multi_value(value: &str) -> Vec<String> {
    value.split('\\').map(str::to_string).collect()
}

/// Parse an integer-valued tag (DICOM IS), tolerating the padding the
/// standard allows around the digits.
pub fn parse_int(value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| Error::Parse {
        value: value.to_string(),
        expected: "an integer",
    })
}

/// Parse a decimal-valued tag (DICOM DS).
pub fn parse_float(value: &str) -> Result<f64> {
    value.trim().parse().map_err(|_| Error::Parse {
        value: value.to_string(),
        expected: "a decimal number",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_values_parse() {
        let date = parse_date("20220101").expect("date");
        assert_eq!(date, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
    }

    #[test]
    fn datetime_without_time_is_midnight() {
        let stamp = parse_datetime("20220101", None).expect("datetime");
        assert_eq!(stamp, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap().and_time(NaiveTime::MIN));
    }

    #[test]
    fn fractional_seconds_are_discarded() {
        let stamp = parse_datetime("20220101", Some("101530.123456")).expect("datetime");
        assert_eq!(
            stamp,
            NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(10, 15, 30)
                .unwrap()
        );
    }

    #[test]
    fn last_update_stamp_parses() {
        let stamp = parse_timestamp("20220101T101530").expect("timestamp");
        assert_eq!(
            stamp,
            NaiveDate::from_ymd_opt(2022, 1, 1)
                .unwrap()
                .and_hms_opt(10, 15, 30)
                .unwrap()
        );
        assert!(parse_timestamp("20220101 101530").is_err());
    }

    #[test]
    fn malformed_values_report_parse_errors() {
        assert!(matches!(parse_date("2022"), Err(Error::Parse { .. })));
        assert!(matches!(parse_datetime("20220101", Some("noon")), Err(Error::Parse { .. })));
        assert!(matches!(parse_int("twelve"), Err(Error::Parse { .. })));
    }

    #[test]
    fn multi_values_split_on_backslash() {
        assert_eq!(split_multi_value("A\\B\\C"), vec!["A", "B", "C"]);
        assert_eq!(split_multi_value("single"), vec!["single"]);
    }
}
