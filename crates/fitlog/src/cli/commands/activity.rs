//! Single-activity commands for fitlog

use serde::Serialize;

use crate::cli::{open_existing, print_json, OutputFormat};
use crate::db::models::ActivityDetail;
use crate::error::{FitlogError, Result};
use crate::models::format_duration;
use crate::query::{query_activity, query_activity_samples, SamplePoint};
use crate::time_utils::{parse_bound, Bound};

#[derive(Serialize)]
struct ActivityOutput<'a> {
    #[serde(flatten)]
    detail: &'a ActivityDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<&'a [SamplePoint]>,
}

/// Show one activity, its laps and optionally its samples
pub fn show(db: Option<String>, start_time: &str, samples: bool, format: OutputFormat) -> Result<()> {
    let start = parse_bound(start_time, Bound::Start)?;

    let Some((_, store)) = open_existing(db.as_deref())? else {
        return Ok(());
    };

    let detail = query_activity(&store, start)?
        .ok_or_else(|| FitlogError::NotFound(format!("activity starting at {}", start_time)))?;
    let points = if samples {
        Some(query_activity_samples(&store, start)?)
    } else {
        None
    };

    if format == OutputFormat::Json {
        return print_json(&ActivityOutput {
            detail: &detail,
            samples: points.as_deref(),
        });
    }

    match detail.activity.summarise() {
        Ok(view) => print!("{}", view),
        Err(FitlogError::UndefinedPace) => {
            println!(
                "start time: {}",
                detail.activity.start_time().format("%Y-%m-%d %H:%M:%S")
            );
            println!("distance: {:.2}km", detail.activity.summary.total_distance / 1000.0);
            println!("pace: undefined (average speed is zero)");
        }
        Err(e) => return Err(e),
    }

    println!();
    if detail.laps.is_empty() {
        println!("No laps recorded.");
    } else {
        println!(
            "{:<4} {:<10} {:>10} {:>10} {:>9} {:>6}",
            "Lap", "Start", "Duration", "Distance", "Pace", "HR"
        );
        println!("{}", "-".repeat(54));
        for (i, lap) in detail.laps.iter().enumerate() {
            let pace = lap
                .summarise()
                .map(|v| format!("{}/km", format_duration(v.pace_secs_per_km)))
                .unwrap_or_else(|_| "-".to_string());
            println!(
                "{:<4} {:<10} {:>10} {:>10} {:>9} {:>6.0}",
                i + 1,
                lap.start_time.format("%H:%M:%S"),
                format_duration(lap.total_timer_time.round() as i64),
                format!("{:.2} km", lap.total_distance / 1000.0),
                pace,
                lap.avg_heart_rate
            );
        }
    }

    if let Some(points) = points {
        println!();
        println!(
            "{:<20} {:>8} {:>6} {:>8} {:>9}",
            "Timestamp", "Speed", "HR", "Cadence", "Altitude"
        );
        println!("{}", "-".repeat(55));
        for point in &points {
            let altitude = point
                .altitude
                .map(|a| format!("{:.1}", a))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:<20} {:>8.2} {:>6} {:>8} {:>9}",
                point.timestamp.format("%Y-%m-%d %H:%M:%S"),
                point.speed,
                point.heart_rate,
                point.cadence,
                altitude
            );
        }
        println!("\nShowing {} samples", points.len());
    }

    Ok(())
}
