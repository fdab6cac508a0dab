//! Totals grouped by calendar period

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::params;
use serde::Serialize;

use super::TimeWindow;
use crate::error::{FitlogError, Result};
use crate::storage::Store;

/// Calendar bucket for totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Weeks starting Monday
    #[default]
    Week,
    Month,
    Year,
    /// One row covering the whole window
    All,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Week => "week",
            GroupBy::Month => "month",
            GroupBy::Year => "year",
            GroupBy::All => "all",
        }
    }

    /// SQLite date modifiers mapping a start time to its period start
    fn period_modifiers(&self) -> Option<&'static str> {
        match self {
            GroupBy::Week => Some("'-6 days', 'weekday 1'"),
            GroupBy::Month => Some("'start of month'"),
            GroupBy::Year => Some("'start of year'"),
            GroupBy::All => None,
        }
    }
}

impl FromStr for GroupBy {
    type Err = FitlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            "year" => Ok(GroupBy::Year),
            "all" => Ok(GroupBy::All),
            other => Err(FitlogError::invalid_query(format!(
                "unknown group_by '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregates for one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotals {
    /// First day of the period; `None` for `GroupBy::All`
    pub period_start: Option<NaiveDate>,
    pub count: i64,
    /// Meters
    pub total_distance: f64,
    /// Timer seconds
    pub total_time: f64,
}

/// Activity count, distance and timer time per period, oldest first
pub fn query_totals(store: &Store, group_by: GroupBy, window: &TimeWindow) -> Result<Vec<PeriodTotals>> {
    let (start, end) = window.sql_bounds();
    let conn = store.connection();

    let Some(modifiers) = group_by.period_modifiers() else {
        let row = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_distance), 0.0), COALESCE(SUM(total_timer_time), 0.0)
                 FROM activities
                 WHERE start_time BETWEEN ?1 AND ?2",
                params![start, end],
                |row| {
                    Ok(PeriodTotals {
                        period_start: None,
                        count: row.get(0)?,
                        total_distance: row.get(1)?,
                        total_time: row.get(2)?,
                    })
                },
            )
            .map_err(|e| FitlogError::Database(format!("Failed to query totals: {}", e)))?;
        return Ok(vec![row]);
    };

    let sql = format!(
        "SELECT date(start_time, {}) AS period_start,
                COUNT(*), SUM(total_distance), SUM(total_timer_time)
         FROM activities
         WHERE start_time BETWEEN ?1 AND ?2
         GROUP BY period_start
         ORDER BY period_start",
        modifiers
    );

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| FitlogError::Database(format!("Failed to prepare totals query: {}", e)))?;

    let rows = stmt
        .query_map(params![start, end], |row| {
            let period: String = row.get(0)?;
            let period_start = NaiveDate::parse_from_str(&period, "%Y-%m-%d").map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
            })?;
            Ok(PeriodTotals {
                period_start: Some(period_start),
                count: row.get(1)?,
                total_distance: row.get(2)?,
                total_time: row.get(3)?,
            })
        })
        .map_err(|e| FitlogError::Database(format!("Failed to query totals: {}", e)))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FitlogError::Database(format!("Failed to read totals: {}", e)))
}
