//! Time Utilities
//!
//! Parsing and formatting of contact timestamps. The ledger stores
//! timestamps as `YYYY-MM-DD HH:MM:SS` (UTC), the same text SQLite's
//! `datetime('now')` produces.

use chrono::{NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Storage format of `contacts.date_time`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when the operator corrects a timestamp
const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a stored or operator-entered timestamp
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let clean = text.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(clean, fmt).ok())
        .ok_or_else(|| Error::Validation(format!("unrecognized timestamp '{}'", text)))
}

/// Normalize an operator-entered timestamp to the storage format
pub fn normalize_timestamp(text: &str) -> Result<String> {
    Ok(parse_timestamp(text)?.format(TIMESTAMP_FORMAT).to_string())
}

/// ADIF QSO_DATE (YYYYMMDD) for a stored timestamp
pub fn adif_date(timestamp: &str) -> Result<String> {
    Ok(parse_timestamp(timestamp)?.format("%Y%m%d").to_string())
}

/// ADIF TIME_ON (HHMM) for a stored timestamp
pub fn adif_time(timestamp: &str) -> Result<String> {
    Ok(parse_timestamp(timestamp)?.format("%H%M").to_string())
}

/// On-screen UTC clock, e.g. `10/19 14:03:27`
pub fn utc_clock() -> String {
    Utc::now().format("%m/%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("2026-01-08 23:24:45").unwrap(),
            "2026-01-08 23:24:45"
        );
        assert_eq!(
            normalize_timestamp("2026-01-08T23:24").unwrap(),
            "2026-01-08 23:24:00"
        );
        assert!(normalize_timestamp("yesterday").is_err());
        assert!(normalize_timestamp("2026-13-01 00:00:00").is_err());
    }

    #[test]
    fn test_adif_date_and_time() {
        assert_eq!(adif_date("2026-01-08 23:24:45").unwrap(), "20260108");
        assert_eq!(adif_time("2026-01-08 23:24:45").unwrap(), "2324");
        assert_eq!(adif_time("2026-01-08 00:05:59").unwrap(), "0005");
    }

    #[test]
    fn test_utc_clock_shape() {
        let clock = utc_clock();
        assert_eq!(clock.len(), 14);
        assert_eq!(&clock[2..3], "/");
    }
}
