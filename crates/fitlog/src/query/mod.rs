//! Read-side queries over stored activities
//!
//! Every query takes an open [`Store`](crate::storage::Store) and recomputes
//! its answer from the tables; nothing is cached.

mod detail;
mod summary;
mod totals;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::time_utils::{format_timestamp, parse_bound, Bound};

pub use detail::{query_activity, query_activity_samples, SamplePoint};
pub use summary::{
    parse_columns, query_summary, query_summary_by_names, SummaryColumn, SummaryRow,
    SUMMARY_ALLOW_LIST,
};
pub use totals::{query_totals, GroupBy, PeriodTotals};

/// Lower bound used when a window has no start
pub const EARLIEST: &str = "0001-01-01 00:00:00";
/// Upper bound used when a window has no end
pub const LATEST: &str = "9999-12-31 23:59:59";

/// Inclusive time window on activity start times
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Unbounded on both sides
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Build a window from command-line text. A bare date as the end bound
    /// covers that whole day.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        Ok(Self {
            start: start.map(|s| parse_bound(s, Bound::Start)).transpose()?,
            end: end.map(|s| parse_bound(s, Bound::End)).transpose()?,
        })
    }

    /// Bounds as stored text, for binding into `BETWEEN ?1 AND ?2`
    pub(crate) fn sql_bounds(&self) -> (String, String) {
        (
            self.start
                .map(format_timestamp)
                .unwrap_or_else(|| EARLIEST.to_string()),
            self.end.map(format_timestamp).unwrap_or_else(|| LATEST.to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FitlogError;

    #[test]
    fn test_unbounded_window() {
        let (start, end) = TimeWindow::all().sql_bounds();
        assert_eq!(start, EARLIEST);
        assert_eq!(end, LATEST);
    }

    #[test]
    fn test_parse_window() {
        let window = TimeWindow::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        let (start, end) = window.sql_bounds();
        assert_eq!(start, "2024-03-01 00:00:00");
        assert_eq!(end, "2024-03-31 23:59:59.999999999");

        let window = TimeWindow::parse(None, Some("2024-03-31 12:00:00")).unwrap();
        assert!(window.start.is_none());
        assert_eq!(window.sql_bounds().1, "2024-03-31 12:00:00");
    }

    #[test]
    fn test_parse_window_rejects_garbage() {
        let err = TimeWindow::parse(Some("last week"), None).unwrap_err();
        assert!(matches!(err, FitlogError::InvalidDateFormat(_)));
    }
}
