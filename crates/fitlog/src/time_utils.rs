//! Shared helpers for timestamp storage and parsing.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS[.fff]` UTC text: it sorts
//! lexically and SQLite's `date()` understands it. Sub-second precision is
//! kept, so two readings in the same second stay distinct.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{FitlogError, Result};

/// `%.f` writes nothing for whole seconds
const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Format a UTC timestamp the way the store keeps it
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(STORE_FORMAT).to_string()
}

/// Parse a stored or user-supplied timestamp.
///
/// Accepts RFC 3339 and naive `YYYY-MM-DD HH:MM:SS` (space or `T`,
/// optional fractional seconds), naive values taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()?;

    Some(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Which end of a window a bare date bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// Parse a window bound given on the command line.
///
/// A bare `YYYY-MM-DD` covers the whole day: midnight for a start bound,
/// the last instant of the day for an end bound.
pub fn parse_bound(value: &str, bound: Bound) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::from_hms_opt(0, 0, 0),
            Bound::End => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999),
        }
        .ok_or_else(|| FitlogError::InvalidDateFormat(value.to_string()))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(date.and_time(time), Utc));
    }

    parse_timestamp(value).ok_or_else(|| FitlogError::InvalidDateFormat(value.to_string()))
}
