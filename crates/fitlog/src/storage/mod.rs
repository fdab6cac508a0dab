//! Storage layer for recorded activities
//!
//! A single SQLite database holds the three-tier hierarchy:
//!
//! ```text
//! activities          one row per recording, unique start_time
//! ├── laps            splits, activity_id -> activities
//! └── samples         time-series readings, activity_id -> activities
//! ```
//!
//! Other tools can read the same file directly:
//!
//! ```sql
//! SELECT start_time, total_distance FROM activities WHERE start_time >= '2024-01-01';
//! ```

mod store;

pub use store::{InsertOutcome, Store};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_open_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fitdata.db");

        let store = Store::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.counts().unwrap().activities, 0);
    }

    #[test]
    fn test_store_reopen_keeps_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fitdata.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .connection()
                .execute_batch(
                    "INSERT INTO activities (start_time, end_time, total_elapsed_time, total_timer_time,
                        total_distance, total_strides, total_calories, enhanced_avg_speed, avg_speed,
                        enhanced_max_speed, max_speed, avg_heart_rate, max_heart_rate,
                        avg_running_cadence, max_running_cadence, avg_fractional_cadence,
                        max_fractional_cadence, total_training_effect, total_anaerobic_training_effect)
                     VALUES ('2024-03-01 07:00:00', '2024-03-01 07:30:00', 1800, 1800, 5000, 2400,
                        350, 2.8, 2.8, 3.5, 3.5, 150, 170, 84, 90, 0, 0, 3.0, 1.0);",
                )
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.counts().unwrap().activities, 1);
    }
}
