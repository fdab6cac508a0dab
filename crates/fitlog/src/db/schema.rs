//! Database schema

use rusqlite::Connection;

use crate::error::{FitlogError, Result};

/// Columns shared by `activities` and `laps`, in insert order.
///
/// `end_time` holds the message's `timestamp` field.
pub const SUMMARY_COLUMNS: &[&str] = &[
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
];

/// Columns only activities carry
pub const ACTIVITY_EXTRA_COLUMNS: &[&str] =
    &["total_training_effect", "total_anaerobic_training_effect"];

pub const SAMPLE_COLUMNS: &[&str] = &[
    "timestamp",
    "distance",
    "enhanced_speed",
    "speed",
    "heart_rate",
    "cadence",
    "fractional_cadence",
    "enhanced_altitude",
    "altitude",
    "position_long",
    "position_lat",
];

/// Create any missing tables
pub fn create_tables(conn: &Connection) -> Result<()> {
    let statements = [
        // Activities (one row per recording)
        "CREATE TABLE IF NOT EXISTS activities (
            activity_id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_time TEXT UNIQUE NOT NULL,
            end_time TEXT NOT NULL,
            total_elapsed_time REAL NOT NULL,
            total_timer_time REAL NOT NULL,
            start_position_lat INTEGER,
            start_position_long INTEGER,
            total_ascent INTEGER,
            total_descent INTEGER,
            total_distance REAL NOT NULL,
            total_strides INTEGER NOT NULL,
            total_calories INTEGER NOT NULL,
            enhanced_avg_speed REAL NOT NULL,
            avg_speed REAL NOT NULL,
            enhanced_max_speed REAL NOT NULL,
            max_speed REAL NOT NULL,
            avg_heart_rate REAL NOT NULL,
            max_heart_rate INTEGER NOT NULL,
            avg_running_cadence INTEGER NOT NULL,
            max_running_cadence INTEGER NOT NULL,
            avg_fractional_cadence REAL NOT NULL,
            max_fractional_cadence REAL NOT NULL,
            total_training_effect REAL NOT NULL,
            total_anaerobic_training_effect REAL NOT NULL
        )",
        // Laps (splits within an activity)
        "CREATE TABLE IF NOT EXISTS laps (
            lap_id INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id INTEGER NOT NULL REFERENCES activities(activity_id),
            start_time TEXT UNIQUE NOT NULL,
            end_time TEXT NOT NULL,
            total_elapsed_time REAL NOT NULL,
            total_timer_time REAL NOT NULL,
            start_position_lat INTEGER,
            start_position_long INTEGER,
            total_ascent INTEGER,
            total_descent INTEGER,
            total_distance REAL NOT NULL,
            total_strides INTEGER NOT NULL,
            total_calories INTEGER NOT NULL,
            enhanced_avg_speed REAL NOT NULL,
            avg_speed REAL NOT NULL,
            enhanced_max_speed REAL NOT NULL,
            max_speed REAL NOT NULL,
            avg_heart_rate REAL NOT NULL,
            max_heart_rate INTEGER NOT NULL,
            avg_running_cadence INTEGER NOT NULL,
            max_running_cadence INTEGER NOT NULL,
            avg_fractional_cadence REAL NOT NULL,
            max_fractional_cadence REAL NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_laps_activity ON laps(activity_id, start_time)",
        // Samples (time-series readings)
        "CREATE TABLE IF NOT EXISTS samples (
            sample_id INTEGER PRIMARY KEY AUTOINCREMENT,
            activity_id INTEGER NOT NULL REFERENCES activities(activity_id),
            timestamp TEXT UNIQUE NOT NULL,
            distance REAL NOT NULL,
            enhanced_speed REAL NOT NULL,
            speed REAL NOT NULL,
            heart_rate INTEGER NOT NULL,
            cadence INTEGER NOT NULL,
            fractional_cadence REAL NOT NULL,
            enhanced_altitude REAL,
            altitude REAL,
            position_long INTEGER,
            position_lat INTEGER
        )",
        "CREATE INDEX IF NOT EXISTS idx_samples_activity ON samples(activity_id, timestamp)",
    ];

    for sql in statements {
        conn.execute(sql, []).map_err(|e| {
            FitlogError::Database(format!(
                "{}: {}",
                sql.chars().take(50).collect::<String>(),
                e
            ))
        })?;
    }

    Ok(())
}

/// Drop all three tables, children first
pub fn drop_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS samples;
         DROP TABLE IF EXISTS laps;
         DROP TABLE IF EXISTS activities;",
    )
    .map_err(|e| FitlogError::Database(format!("Failed to drop tables: {}", e)))
}
