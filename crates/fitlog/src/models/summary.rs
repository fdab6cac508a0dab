//! Human-readable summary of a lap or activity
//!
//! Derived on demand, never stored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Activity, LapSummary};
use crate::error::{FitlogError, Result};

/// Display-ready view of a lap or activity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Timer time rounded to whole seconds
    pub duration_secs: i64,
    /// Kilometers, two decimal places
    pub distance_km: f64,
    /// Seconds per kilometer
    pub pace_secs_per_km: i64,
    pub calories: i64,
    pub avg_heart_rate: f64,
    pub max_heart_rate: i64,
    /// Steps per minute (both feet)
    pub cadence_spm: i64,
    pub training_effect: Option<TrainingEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingEffect {
    pub aerobic: f64,
    pub anaerobic: f64,
}

impl LapSummary {
    /// Summarise this lap.
    ///
    /// Fails with `UndefinedPace` when the average speed is zero.
    pub fn summarise(&self) -> Result<SummaryView> {
        if self.enhanced_avg_speed == 0.0 || !self.enhanced_avg_speed.is_finite() {
            return Err(FitlogError::UndefinedPace);
        }

        Ok(SummaryView {
            start_time: self.start_time,
            end_time: self.end_time,
            duration_secs: self.total_timer_time.round() as i64,
            distance_km: (self.total_distance / 10.0).round() / 100.0,
            pace_secs_per_km: (1000.0 / self.enhanced_avg_speed).round() as i64,
            calories: self.total_calories,
            avg_heart_rate: self.avg_heart_rate,
            max_heart_rate: self.max_heart_rate,
            cadence_spm: self.avg_running_cadence * 2,
            training_effect: None,
        })
    }
}

impl Activity {
    pub fn summarise(&self) -> Result<SummaryView> {
        let mut view = self.summary.summarise()?;
        view.training_effect = Some(TrainingEffect {
            aerobic: self.total_training_effect,
            anaerobic: self.total_anaerobic_training_effect,
        });
        Ok(view)
    }
}

/// Format seconds as H:MM:SS, or M:SS under an hour
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "start time: {}", self.start_time.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "end time: {}", self.end_time.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "duration: {}", format_duration(self.duration_secs))?;
        writeln!(f, "distance: {:.2}km", self.distance_km)?;
        writeln!(f, "pace: {}/km", format_duration(self.pace_secs_per_km))?;
        writeln!(f, "calories: {}kCal", self.calories)?;
        writeln!(f, "average hr: {}bpm", self.avg_heart_rate)?;
        writeln!(f, "max hr: {}bpm", self.max_heart_rate)?;
        writeln!(f, "cadence: {}spm", self.cadence_spm)?;
        if let Some(effect) = self.training_effect {
            writeln!(f, "aerobic training effect: {}/5", effect.aerobic)?;
            writeln!(f, "anaerobic training effect: {}/5", effect.anaerobic)?;
        }
        Ok(())
    }
}
