//! Single-activity lookups by start time

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use crate::db::models::{Activity, ActivityDetail, LapSummary};
use crate::db::schema::{ACTIVITY_EXTRA_COLUMNS, SUMMARY_COLUMNS};
use crate::error::{FitlogError, Result};
use crate::storage::Store;
use crate::time_utils::{format_timestamp, parse_timestamp};

/// One sample trimmed to what charts need
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplePoint {
    pub timestamp: DateTime<Utc>,
    /// `enhanced_speed`, m/s
    pub speed: f64,
    pub heart_rate: i64,
    pub cadence: i64,
    /// `enhanced_altitude`, m
    pub altitude: Option<f64>,
}

/// The activity starting at `start_time` with its laps, if stored
pub fn query_activity(store: &Store, start_time: DateTime<Utc>) -> Result<Option<ActivityDetail>> {
    let conn = store.connection();
    let columns: Vec<&str> = SUMMARY_COLUMNS.iter().chain(ACTIVITY_EXTRA_COLUMNS).copied().collect();
    let sql = format!(
        "SELECT activity_id, {} FROM activities WHERE start_time = ?1",
        columns.join(", ")
    );

    let found = conn
        .query_row(&sql, params![format_timestamp(start_time)], |row| {
            let summary = summary_from_row(row, 1)?;
            let extra = 1 + SUMMARY_COLUMNS.len();
            Ok((
                row.get::<_, i64>(0)?,
                Activity {
                    summary,
                    total_training_effect: row.get(extra)?,
                    total_anaerobic_training_effect: row.get(extra + 1)?,
                },
            ))
        })
        .optional()
        .map_err(|e| FitlogError::Database(format!("Failed to query activity: {}", e)))?;

    let Some((activity_id, activity)) = found else {
        return Ok(None);
    };

    let sql = format!(
        "SELECT {} FROM laps WHERE activity_id = ?1 ORDER BY start_time",
        SUMMARY_COLUMNS.join(", ")
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| FitlogError::Database(format!("Failed to prepare laps query: {}", e)))?;
    let laps = stmt
        .query_map(params![activity_id], |row| summary_from_row(row, 0))
        .map_err(|e| FitlogError::Database(format!("Failed to query laps: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FitlogError::Database(format!("Failed to read laps: {}", e)))?;

    Ok(Some(ActivityDetail {
        activity_id,
        activity,
        laps,
    }))
}

/// Samples of the activity starting at `start_time`, oldest first.
/// Empty when no such activity is stored.
pub fn query_activity_samples(store: &Store, start_time: DateTime<Utc>) -> Result<Vec<SamplePoint>> {
    let mut stmt = store
        .connection()
        .prepare(
            "SELECT s.timestamp, s.enhanced_speed, s.heart_rate, s.cadence, s.enhanced_altitude
             FROM samples s
             JOIN activities a ON a.activity_id = s.activity_id
             WHERE a.start_time = ?1
             ORDER BY s.timestamp",
        )
        .map_err(|e| FitlogError::Database(format!("Failed to prepare samples query: {}", e)))?;

    let rows = stmt
        .query_map(params![format_timestamp(start_time)], |row| {
            Ok(SamplePoint {
                timestamp: timestamp_at(row, 0)?,
                speed: row.get(1)?,
                heart_rate: row.get(2)?,
                cadence: row.get(3)?,
                altitude: row.get(4)?,
            })
        })
        .map_err(|e| FitlogError::Database(format!("Failed to query samples: {}", e)))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FitlogError::Database(format!("Failed to read samples: {}", e)))
}

/// Read `SUMMARY_COLUMNS` starting at column `offset`
fn summary_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<LapSummary> {
    Ok(LapSummary {
        start_time: timestamp_at(row, offset)?,
        end_time: timestamp_at(row, offset + 1)?,
        total_elapsed_time: row.get(offset + 2)?,
        total_timer_time: row.get(offset + 3)?,
        start_position_lat: row.get(offset + 4)?,
        start_position_long: row.get(offset + 5)?,
        total_ascent: row.get(offset + 6)?,
        total_descent: row.get(offset + 7)?,
        total_distance: row.get(offset + 8)?,
        total_strides: row.get(offset + 9)?,
        total_calories: row.get(offset + 10)?,
        enhanced_avg_speed: row.get(offset + 11)?,
        avg_speed: row.get(offset + 12)?,
        enhanced_max_speed: row.get(offset + 13)?,
        max_speed: row.get(offset + 14)?,
        avg_heart_rate: row.get(offset + 15)?,
        max_heart_rate: row.get(offset + 16)?,
        avg_running_cadence: row.get(offset + 17)?,
        max_running_cadence: row.get(offset + 18)?,
        avg_fractional_cadence: row.get(offset + 19)?,
        max_fractional_cadence: row.get(offset + 20)?,
    })
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(FitlogError::InvalidDateFormat(text)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::fixtures::{lap_message, sample_message, session_message};
    use crate::db::models::{FromMessage, Sample};

    #[test]
    fn test_activity_round_trips_through_store() {
        let mut store = Store::open_in_memory().unwrap();
        let activity = Activity::from_message(&session_message((1, 7, 0))).unwrap();
        let laps = vec![
            LapSummary::from_message(&lap_message((1, 7, 5))).unwrap(),
            LapSummary::from_message(&lap_message((1, 7, 0)).with("total_ascent", 12)).unwrap(),
        ];
        store.insert_activity(&activity, &laps, &[]).unwrap();

        let detail = query_activity(&store, activity.start_time()).unwrap().unwrap();

        assert_eq!(detail.activity, activity);
        assert_eq!(detail.laps.len(), 2);
        assert_eq!(detail.laps[0], laps[1]);
        assert_eq!(detail.laps[0].total_ascent, Some(12));
    }

    #[test]
    fn test_activity_without_laps() {
        let mut store = Store::open_in_memory().unwrap();
        let activity = Activity::from_message(&session_message((1, 7, 0))).unwrap();
        store.insert_activity(&activity, &[], &[]).unwrap();

        let detail = query_activity(&store, activity.start_time()).unwrap().unwrap();
        assert!(detail.laps.is_empty());
    }

    #[test]
    fn test_unknown_activity() {
        let store = Store::open_in_memory().unwrap();
        let start = parse_timestamp("2024-03-01 07:00:00").unwrap();

        assert!(query_activity(&store, start).unwrap().is_none());
        assert!(query_activity_samples(&store, start).unwrap().is_empty());
    }

    #[test]
    fn test_samples_ordered_with_altitude() {
        let mut store = Store::open_in_memory().unwrap();
        let activity = Activity::from_message(&session_message((1, 7, 0))).unwrap();
        let samples = vec![
            Sample::from_message(&sample_message(1, 7, 9)).unwrap(),
            Sample::from_message(&sample_message(1, 7, 3).with("enhanced_altitude", 41.5)).unwrap(),
        ];
        store.insert_activity(&activity, &[], &samples).unwrap();

        let points = query_activity_samples(&store, activity.start_time()).unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].timestamp < points[1].timestamp);
        assert_eq!(points[0].altitude, Some(41.5));
        assert_eq!(points[1].altitude, None);
        assert_eq!(points[0].heart_rate, 148);
    }
}
