use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{EngineError, EngineResult};

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses an order date, discarding any time of day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DD HH:MM[:SS]` (space
/// or `T` separated) and the `M/D/YYYY H:MM` export format.
pub fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if looks_like_iso_date(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }

    DATETIME_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(trimmed, format)
            .ok()
            .map(|timestamp| timestamp.date())
    })
}

/// Strict `YYYY-MM-DD` parsing for the reference date of a scoring run.
pub fn parse_reference_date(value: &str, command: &str) -> EngineResult<NaiveDate> {
    if !looks_like_iso_date(value) {
        return Err(EngineError::invalid_argument_for_command(
            "`as_of` must use YYYY-MM-DD format with a real calendar date.",
            Some(command),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        EngineError::invalid_argument_for_command(
            "`as_of` must use YYYY-MM-DD format with valid calendar values.",
            Some(command),
        )
    })
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}
