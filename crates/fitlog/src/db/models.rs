//! Record models matching schema tables
//!
//! Each model is built from a decoded message through the shared validator.
//! An activity is a lap-shaped summary plus its training effect scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{validate, FieldSchema, Message, Validated, ValidationError};

/// Lap fields that must be present
pub const LAP_REQUIRED: &[&str] = &[
    "timestamp",
    "start_time",
    "total_elapsed_time",
    "total_timer_time",
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

/// Lap fields a recording may omit (no GPS fix, no barometer)
pub const LAP_OPTIONAL: &[&str] = &[
    "start_position_lat",
    "start_position_long",
    "total_ascent",
    "total_descent",
];

/// Extra fields a session message needs on top of the lap set
pub const ACTIVITY_EXTRA_REQUIRED: &[&str] =
    &["total_training_effect", "total_anaerobic_training_effect"];

pub const SAMPLE_REQUIRED: &[&str] = &[
    "timestamp",
    "distance",
    "enhanced_speed",
    "speed",
    "heart_rate",
    "cadence",
    "fractional_cadence",
];

pub const SAMPLE_OPTIONAL: &[&str] = &["enhanced_altitude", "altitude", "position_long", "position_lat"];

/// Build a record from a decoded message
pub trait FromMessage: Sized {
    fn schema() -> FieldSchema;

    fn from_validated(fields: &Validated<'_>) -> Result<Self, ValidationError>;

    fn from_message(message: &Message) -> Result<Self, ValidationError> {
        let schema = Self::schema();
        let validated = validate(message, &schema)?;
        Self::from_validated(&validated)
    }
}

/// Summary statistics shared by laps and whole activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapSummary {
    pub start_time: DateTime<Utc>,
    /// The message's `timestamp` field: when the lap closed
    pub end_time: DateTime<Utc>,
    pub total_elapsed_time: f64,
    pub total_timer_time: f64,
    /// Semicircles
    pub start_position_lat: Option<i64>,
    pub start_position_long: Option<i64>,
    pub total_ascent: Option<i64>,
    pub total_descent: Option<i64>,
    /// Meters
    pub total_distance: f64,
    pub total_strides: i64,
    pub total_calories: i64,
    /// Meters per second
    pub enhanced_avg_speed: f64,
    pub avg_speed: f64,
    pub enhanced_max_speed: f64,
    pub max_speed: f64,
    pub avg_heart_rate: f64,
    pub max_heart_rate: i64,
    /// Strides per minute (one foot)
    pub avg_running_cadence: i64,
    pub max_running_cadence: i64,
    pub avg_fractional_cadence: f64,
    pub max_fractional_cadence: f64,
}

impl FromMessage for LapSummary {
    fn schema() -> FieldSchema {
        FieldSchema::new(LAP_REQUIRED, LAP_OPTIONAL)
    }

    fn from_validated(f: &Validated<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            start_time: f.timestamp("start_time")?,
            end_time: f.timestamp("timestamp")?,
            total_elapsed_time: f.float("total_elapsed_time")?,
            total_timer_time: f.float("total_timer_time")?,
            start_position_lat: f.opt_integer("start_position_lat"),
            start_position_long: f.opt_integer("start_position_long"),
            total_ascent: f.opt_integer("total_ascent"),
            total_descent: f.opt_integer("total_descent"),
            total_distance: f.float("total_distance")?,
            total_strides: f.integer("total_strides")?,
            total_calories: f.integer("total_calories")?,
            enhanced_avg_speed: f.float("enhanced_avg_speed")?,
            avg_speed: f.float("avg_speed")?,
            enhanced_max_speed: f.float("enhanced_max_speed")?,
            max_speed: f.float("max_speed")?,
            avg_heart_rate: f.float("avg_heart_rate")?,
            max_heart_rate: f.integer("max_heart_rate")?,
            avg_running_cadence: f.integer("avg_running_cadence")?,
            max_running_cadence: f.integer("max_running_cadence")?,
            avg_fractional_cadence: f.float("avg_fractional_cadence")?,
            max_fractional_cadence: f.float("max_fractional_cadence")?,
        })
    }
}

/// A whole recorded session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(flatten)]
    pub summary: LapSummary,
    pub total_training_effect: f64,
    pub total_anaerobic_training_effect: f64,
}

impl Activity {
    pub fn start_time(&self) -> DateTime<Utc> {
        self.summary.start_time
    }
}

impl FromMessage for Activity {
    fn schema() -> FieldSchema {
        LapSummary::schema().with_required(ACTIVITY_EXTRA_REQUIRED)
    }

    fn from_validated(f: &Validated<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            summary: LapSummary::from_validated(f)?,
            total_training_effect: f.float("total_training_effect")?,
            total_anaerobic_training_effect: f.float("total_anaerobic_training_effect")?,
        })
    }
}

/// One point-in-time reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub distance: f64,
    pub enhanced_speed: f64,
    pub speed: f64,
    pub heart_rate: i64,
    pub cadence: i64,
    pub fractional_cadence: f64,
    pub enhanced_altitude: Option<f64>,
    pub altitude: Option<f64>,
    pub position_long: Option<i64>,
    pub position_lat: Option<i64>,
}

impl FromMessage for Sample {
    fn schema() -> FieldSchema {
        FieldSchema::new(SAMPLE_REQUIRED, SAMPLE_OPTIONAL)
    }

    fn from_validated(f: &Validated<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            timestamp: f.timestamp("timestamp")?,
            distance: f.float("distance")?,
            enhanced_speed: f.float("enhanced_speed")?,
            speed: f.float("speed")?,
            heart_rate: f.integer("heart_rate")?,
            cadence: f.integer("cadence")?,
            fractional_cadence: f.float("fractional_cadence")?,
            enhanced_altitude: f.opt_float("enhanced_altitude"),
            altitude: f.opt_float("altitude"),
            position_long: f.opt_integer("position_long"),
            position_lat: f.opt_integer("position_lat"),
        })
    }
}

/// An activity as stored, with its laps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityDetail {
    pub activity_id: i64,
    #[serde(flatten)]
    pub activity: Activity,
    pub laps: Vec<LapSummary>,
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub activities: i64,
    pub laps: i64,
    pub samples: i64,
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_lap_from_message() {
        let lap = LapSummary::from_message(&lap_message((1, 7, 0))).unwrap();
        assert_eq!(lap.total_distance, 1000.0);
        assert_eq!(lap.total_ascent, None);
        assert_eq!((lap.end_time - lap.start_time).num_seconds(), 300);
    }

    #[test]
    fn test_activity_requires_training_effects() {
        let err = Activity::from_message(&lap_message((1, 7, 0))).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            &[
                "total_training_effect".to_string(),
                "total_anaerobic_training_effect".to_string()
            ]
        );
    }

    #[test]
    fn test_activity_embeds_lap_summary() {
        let activity = Activity::from_message(&session_message((1, 7, 0))).unwrap();
        assert_eq!(activity.summary.total_strides, 460);
        assert_eq!(activity.total_training_effect, 3.1);
    }

    #[test]
    fn test_activity_schema_extends_lap_schema() {
        let schema = Activity::schema();
        assert_eq!(schema.required().len(), LAP_REQUIRED.len() + 2);
        assert_eq!(schema.optional(), LAP_OPTIONAL);
    }

    #[test]
    fn test_sample_optional_position() {
        let sample = Sample::from_message(
            &sample_message(1, 7, 10)
                .with("position_lat", 612_345_678)
                .with("enhanced_altitude", 12.4),
        )
        .unwrap();
        assert_eq!(sample.position_lat, Some(612_345_678));
        assert_eq!(sample.position_long, None);
        assert_eq!(sample.enhanced_altitude, Some(12.4));
    }

    #[test]
    fn test_sample_missing_fields_all_reported() {
        let mut message = sample_message(1, 7, 10);
        message.remove("heart_rate");
        message.remove("speed");

        let err = Sample::from_message(&message).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            &["speed".to_string(), "heart_rate".to_string()]
        );
    }
}
