//! SQLite-backed activity store
//!
//! One `Store` owns one connection. Callers open it at the start of an
//! ingestion batch or a query and drop it when done.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use crate::db::models::{Activity, LapSummary, Sample, TableCounts};
use crate::db::schema::{self, ACTIVITY_EXTRA_COLUMNS, SAMPLE_COLUMNS, SUMMARY_COLUMNS};
use crate::error::{FitlogError, Result};
use crate::time_utils::format_timestamp;

/// Result of writing one activity hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted {
        activity_id: i64,
        laps: usize,
        samples: usize,
    },
    /// An activity with the same start time is already stored
    AlreadyExists,
    /// A lap or sample collided with a row owned by another activity;
    /// nothing from this hierarchy was written
    Conflict(String),
}

/// SQLite database holding activities, laps and samples
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the database
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| FitlogError::Database(format!("Failed to open database: {}", e)))?;

        Self::init(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| FitlogError::Database(format!("Failed to open in-memory database: {}", e)))?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| FitlogError::Database(format!("Failed to enable foreign keys: {}", e)))?;
        schema::create_tables(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop and recreate all three tables
    pub fn reset(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        schema::drop_tables(&tx)?;
        schema::create_tables(&tx)?;
        tx.commit()
            .map_err(|e| FitlogError::Database(format!("Failed to reset tables: {}", e)))
    }

    /// Whether an activity with this start time is stored
    pub fn activity_exists(&self, start_time: DateTime<Utc>) -> Result<bool> {
        activity_id_for(&self.conn, start_time).map(|id| id.is_some())
    }

    /// Whether any activity already owns a lap starting at this time
    pub fn lap_exists(&self, start_time: DateTime<Utc>) -> Result<bool> {
        row_exists(&self.conn, "laps", "start_time", start_time)
    }

    /// Whether any activity already owns a sample at this time
    pub fn sample_exists(&self, timestamp: DateTime<Utc>) -> Result<bool> {
        row_exists(&self.conn, "samples", "timestamp", timestamp)
    }

    /// Write an activity with its laps and samples in one transaction.
    ///
    /// Either the whole hierarchy is written or none of it is. Callers are
    /// expected to have dropped laps and samples whose times are already
    /// taken; `Conflict` covers any that slip through.
    pub fn insert_activity(
        &mut self,
        activity: &Activity,
        laps: &[LapSummary],
        samples: &[Sample],
    ) -> Result<InsertOutcome> {
        let tx = self.conn.transaction()?;

        if activity_id_for(&tx, activity.start_time())?.is_some() {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let activity_id = match write_activity(&tx, activity) {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => return Ok(InsertOutcome::AlreadyExists),
            Err(e) => return Err(FitlogError::Database(format!("Failed to insert activity: {}", e))),
        };

        match write_children(&tx, activity_id, laps, samples) {
            Ok(()) => {
                tx.commit().map_err(|e| {
                    FitlogError::Database(format!("Failed to commit activity: {}", e))
                })?;
                Ok(InsertOutcome::Inserted {
                    activity_id,
                    laps: laps.len(),
                    samples: samples.len(),
                })
            }
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict(e.to_string())),
            Err(e) => Err(FitlogError::Database(format!("Failed to insert activity: {}", e))),
        }
    }

    /// Row counts for each table
    pub fn counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<i64> {
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
                .map_err(|e| FitlogError::Database(format!("Failed to count {}: {}", table, e)))
        };

        Ok(TableCounts {
            activities: count("activities")?,
            laps: count("laps")?,
            samples: count("samples")?,
        })
    }
}

fn activity_id_for(conn: &Connection, start_time: DateTime<Utc>) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT activity_id FROM activities WHERE start_time = ?",
        params![format_timestamp(start_time)],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| FitlogError::Database(format!("Failed to look up activity: {}", e)))
}

fn row_exists(conn: &Connection, table: &str, column: &str, at: DateTime<Utc>) -> Result<bool> {
    conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?)", table, column),
        params![format_timestamp(at)],
        |row| row.get(0),
    )
    .map_err(|e| FitlogError::Database(format!("Failed to look up {}: {}", table, e)))
}

fn write_activity(conn: &Connection, activity: &Activity) -> rusqlite::Result<i64> {
    let activity_columns: Vec<&str> = SUMMARY_COLUMNS
        .iter()
        .chain(ACTIVITY_EXTRA_COLUMNS)
        .copied()
        .collect();
    let mut values = summary_values(&activity.summary);
    values.push(Value::from(activity.total_training_effect));
    values.push(Value::from(activity.total_anaerobic_training_effect));

    conn.execute(
        &insert_sql("activities", &activity_columns),
        params_from_iter(values),
    )?;
    Ok(conn.last_insert_rowid())
}

fn write_children(
    conn: &Connection,
    activity_id: i64,
    laps: &[LapSummary],
    samples: &[Sample],
) -> rusqlite::Result<()> {
    if !laps.is_empty() {
        let lap_columns: Vec<&str> = std::iter::once("activity_id")
            .chain(SUMMARY_COLUMNS.iter().copied())
            .collect();
        let mut stmt = conn.prepare(&insert_sql("laps", &lap_columns))?;
        for lap in laps {
            let mut values = vec![Value::from(activity_id)];
            values.extend(summary_values(lap));
            stmt.execute(params_from_iter(values))?;
        }
    }

    if !samples.is_empty() {
        let sample_columns: Vec<&str> = std::iter::once("activity_id")
            .chain(SAMPLE_COLUMNS.iter().copied())
            .collect();
        let mut stmt = conn.prepare(&insert_sql("samples", &sample_columns))?;
        for sample in samples {
            stmt.execute(params_from_iter(sample_values(activity_id, sample)))?;
        }
    }

    Ok(())
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Values in `SUMMARY_COLUMNS` order
fn summary_values(s: &LapSummary) -> Vec<Value> {
    vec![
        Value::from(format_timestamp(s.start_time)),
        Value::from(format_timestamp(s.end_time)),
        Value::from(s.total_elapsed_time),
        Value::from(s.total_timer_time),
        Value::from(s.start_position_lat),
        Value::from(s.start_position_long),
        Value::from(s.total_ascent),
        Value::from(s.total_descent),
        Value::from(s.total_distance),
        Value::from(s.total_strides),
        Value::from(s.total_calories),
        Value::from(s.enhanced_avg_speed),
        Value::from(s.avg_speed),
        Value::from(s.enhanced_max_speed),
        Value::from(s.max_speed),
        Value::from(s.avg_heart_rate),
        Value::from(s.max_heart_rate),
        Value::from(s.avg_running_cadence),
        Value::from(s.max_running_cadence),
        Value::from(s.avg_fractional_cadence),
        Value::from(s.max_fractional_cadence),
    ]
}

/// Owning activity id followed by values in `SAMPLE_COLUMNS` order
fn sample_values(activity_id: i64, s: &Sample) -> Vec<Value> {
    vec![
        Value::from(activity_id),
        Value::from(format_timestamp(s.timestamp)),
        Value::from(s.distance),
        Value::from(s.enhanced_speed),
        Value::from(s.speed),
        Value::from(s.heart_rate),
        Value::from(s.cadence),
        Value::from(s.fractional_cadence),
        Value::from(s.enhanced_altitude),
        Value::from(s.altitude),
        Value::from(s.position_long),
        Value::from(s.position_lat),
    ]
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::fixtures::{lap_message, sample_message, session_message};
    use crate::db::models::FromMessage;

    fn activity(day: u32) -> Activity {
        Activity::from_message(&session_message((day, 7, 0))).unwrap()
    }

    fn lap(day: u32, minute: u32) -> LapSummary {
        LapSummary::from_message(&lap_message((day, 7, minute))).unwrap()
    }

    fn sample(day: u32, second: u32) -> Sample {
        Sample::from_message(&sample_message(day, 7, second)).unwrap()
    }

    #[test]
    fn test_insert_hierarchy() {
        let mut store = Store::open_in_memory().unwrap();

        let outcome = store
            .insert_activity(&activity(1), &[lap(1, 0), lap(1, 5)], &[sample(1, 1), sample(1, 2)])
            .unwrap();

        assert!(matches!(
            outcome,
            InsertOutcome::Inserted { laps: 2, samples: 2, .. }
        ));
        let counts = store.counts().unwrap();
        assert_eq!(counts, TableCounts { activities: 1, laps: 2, samples: 2 });
        assert!(store.activity_exists(activity(1).start_time()).unwrap());
    }

    #[test]
    fn test_existing_start_time_is_reported() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_activity(&activity(1), &[], &[]).unwrap();

        let outcome = store.insert_activity(&activity(1), &[lap(1, 0)], &[]).unwrap();
        assert_eq!(outcome, InsertOutcome::AlreadyExists);
        assert_eq!(store.counts().unwrap().laps, 0);
    }

    #[test]
    fn test_sample_conflict_rolls_back_whole_hierarchy() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_activity(&activity(1), &[], &[sample(1, 5)]).unwrap();

        // Different activity, but one sample timestamp collides
        let outcome = store
            .insert_activity(&activity(2), &[lap(2, 0)], &[sample(2, 1), sample(1, 5)])
            .unwrap();

        assert!(matches!(outcome, InsertOutcome::Conflict(_)));
        let counts = store.counts().unwrap();
        assert_eq!(counts, TableCounts { activities: 1, laps: 0, samples: 1 });
    }

    #[test]
    fn test_child_existence_checks() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_activity(&activity(1), &[lap(1, 0)], &[sample(1, 5)]).unwrap();

        assert!(store.lap_exists(lap(1, 0).start_time).unwrap());
        assert!(!store.lap_exists(lap(1, 5).start_time).unwrap());
        assert!(store.sample_exists(sample(1, 5).timestamp).unwrap());
        assert!(!store.sample_exists(sample(1, 6).timestamp).unwrap());
    }

    #[test]
    fn test_sub_second_samples_are_distinct() {
        let mut store = Store::open_in_memory().unwrap();
        let first = sample(1, 1);
        let mut second = first.clone();
        second.timestamp += chrono::Duration::milliseconds(500);

        let outcome = store.insert_activity(&activity(1), &[], &[first, second]).unwrap();

        assert!(matches!(outcome, InsertOutcome::Inserted { samples: 2, .. }));
        assert_eq!(store.counts().unwrap().samples, 2);
    }

    #[test]
    fn test_reset_empties_tables() {
        let mut store = Store::open_in_memory().unwrap();
        store.insert_activity(&activity(1), &[lap(1, 0)], &[sample(1, 1)]).unwrap();

        store.reset().unwrap();

        assert_eq!(store.counts().unwrap(), TableCounts::default());
        assert!(!store.activity_exists(activity(1).start_time()).unwrap());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let store = Store::open_in_memory().unwrap();
        let err = store.connection().execute(
            "INSERT INTO samples (activity_id, timestamp, distance, enhanced_speed, speed,
                                  heart_rate, cadence, fractional_cadence)
             VALUES (999, '2024-03-01 07:00:00', 0, 0, 0, 0, 0, 0)",
            [],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql("laps", &["activity_id", "start_time"]),
            "INSERT INTO laps (activity_id, start_time) VALUES (?1, ?2)"
        );
    }
}
