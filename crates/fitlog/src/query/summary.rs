//! Per-activity rows projected onto caller-chosen columns

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::params;
use rusqlite::types::ValueRef;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::TimeWindow;
use crate::error::{FitlogError, Result};
use crate::storage::Store;
use crate::time_utils::parse_timestamp;

/// Every activity column a summary may ask for
pub const SUMMARY_ALLOW_LIST: &[&str] = &[
    "start_time",
    "end_time",
    "total_elapsed_time",
    "total_timer_time",
    "start_position_lat",
    "start_position_long",
    "total_ascent",
    "total_descent",
    "total_distance",
    "total_strides",
    "total_calories",
    "enhanced_avg_speed",
    "avg_speed",
    "enhanced_max_speed",
    "max_speed",
    "avg_heart_rate",
    "max_heart_rate",
    "avg_running_cadence",
    "max_running_cadence",
    "avg_fractional_cadence",
    "max_fractional_cadence",
    "total_training_effect",
    "total_anaerobic_training_effect",
];

/// A column name checked against [`SUMMARY_ALLOW_LIST`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryColumn(&'static str);

impl SummaryColumn {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl FromStr for SummaryColumn {
    type Err = FitlogError;

    fn from_str(s: &str) -> Result<Self> {
        SUMMARY_ALLOW_LIST
            .iter()
            .find(|c| **c == s)
            .copied()
            .map(SummaryColumn)
            .ok_or_else(|| FitlogError::invalid_query(format!("unknown column '{}'", s)))
    }
}

/// Check names against the allow-list, keeping first occurrences in order.
///
/// `start_time` is always the leading column, so asking for it adds nothing.
pub fn parse_columns<S: AsRef<str>>(names: &[S]) -> Result<Vec<SummaryColumn>> {
    let mut columns: Vec<SummaryColumn> = Vec::with_capacity(names.len());
    for name in names {
        let column: SummaryColumn = name.as_ref().parse()?;
        if column.as_str() != "start_time" && !columns.contains(&column) {
            columns.push(column);
        }
    }
    Ok(columns)
}

/// One activity: its start time then the requested columns, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub start_time: DateTime<Utc>,
    pub values: Vec<(SummaryColumn, serde_json::Value)>,
}

impl SummaryRow {
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.values
            .iter()
            .find(|(c, _)| c.as_str() == column)
            .map(|(_, v)| v)
    }
}

impl Serialize for SummaryRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("start_time", &self.start_time)?;
        for (column, value) in &self.values {
            map.serialize_entry(column.as_str(), value)?;
        }
        map.end()
    }
}

/// Rows for every activity in the window, ordered by start time
pub fn query_summary(
    store: &Store,
    columns: &[SummaryColumn],
    window: &TimeWindow,
) -> Result<Vec<SummaryRow>> {
    let (start, end) = window.sql_bounds();
    let select: Vec<&str> = std::iter::once("start_time")
        .chain(columns.iter().map(SummaryColumn::as_str))
        .collect();
    let sql = format!(
        "SELECT {} FROM activities WHERE start_time BETWEEN ?1 AND ?2 ORDER BY start_time",
        select.join(", ")
    );

    let mut stmt = store
        .connection()
        .prepare(&sql)
        .map_err(|e| FitlogError::Database(format!("Failed to prepare summary query: {}", e)))?;

    let rows = stmt
        .query_map(params![start, end], |row| {
            let text: String = row.get(0)?;
            let start_time = parse_timestamp(&text).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(FitlogError::InvalidDateFormat(text.clone())),
                )
            })?;

            let mut values = Vec::with_capacity(columns.len());
            for (i, column) in columns.iter().enumerate() {
                values.push((*column, json_value(row.get_ref(i + 1)?)));
            }
            Ok(SummaryRow { start_time, values })
        })
        .map_err(|e| FitlogError::Database(format!("Failed to query summary: {}", e)))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FitlogError::Database(format!("Failed to read summary: {}", e)))
}

/// Validate column names, then query. Nothing touches the store if any
/// name is unknown.
pub fn query_summary_by_names<S: AsRef<str>>(
    store: &Store,
    names: &[S],
    window: &TimeWindow,
) -> Result<Vec<SummaryRow>> {
    let columns = parse_columns(names)?;
    query_summary(store, &columns, window)
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned().into(),
        ValueRef::Blob(_) => serde_json::Value::Null,
    }
}
