//! Integration tests for the query layer over ingested fixtures

use fitlog::decode::AutoDecoder;
use fitlog::ingest::{ingest, IngestMode};
use fitlog::query::{
    query_activity, query_activity_samples, query_summary_by_names, query_totals, GroupBy,
    TimeWindow,
};
use fitlog::time_utils::parse_timestamp;
use fitlog::{FitlogError, Store};
use serde_json::json;
use tempfile::TempDir;

const EASY_RUN: &str = include_str!("fixtures/easy_run.json");
const TEMPO_RUN: &str = include_str!("fixtures/tempo_run.json");
const TREADMILL: &str = include_str!("fixtures/treadmill_no_laps.json");

/// Store holding the easy run (5000 m, Mon 4 Mar), the tempo run
/// (3000 m, Sat 9 Mar) and the treadmill run (4000 m, 2 Apr, no laps)
fn populated_store() -> Store {
    let temp = TempDir::new().unwrap();
    for (name, contents) in [
        ("easy.json", EASY_RUN),
        ("tempo.json", TEMPO_RUN),
        ("treadmill.json", TREADMILL),
    ] {
        std::fs::write(temp.path().join(name), contents).unwrap();
    }

    let mut store = Store::open_in_memory().unwrap();
    ingest(&mut store, temp.path(), IngestMode::Update, &AutoDecoder).unwrap();
    store
}

fn march() -> TimeWindow {
    TimeWindow::parse(Some("2024-03-01"), Some("2024-03-31")).unwrap()
}

#[test]
fn test_all_totals_for_march() {
    let store = populated_store();

    let rows = query_totals(&store, GroupBy::All, &march()).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[0].total_distance, 8000.0);
    assert_eq!(rows[0].total_time, 2640.0);
}

#[test]
fn test_weekly_and_monthly_totals() {
    let store = populated_store();

    let weeks = query_totals(&store, GroupBy::Week, &TimeWindow::all()).unwrap();
    assert_eq!(weeks.len(), 2);
    assert_eq!(weeks[0].period_start.unwrap().to_string(), "2024-03-04");
    assert_eq!(weeks[0].count, 2);
    assert_eq!(weeks[1].period_start.unwrap().to_string(), "2024-04-01");

    let months = query_totals(&store, GroupBy::Month, &TimeWindow::all()).unwrap();
    let summary: Vec<(String, i64)> = months
        .iter()
        .map(|r| (r.period_start.unwrap().to_string(), r.count))
        .collect();
    assert_eq!(
        summary,
        vec![("2024-03-01".to_string(), 2), ("2024-04-01".to_string(), 1)]
    );
}

#[test]
fn test_end_bound_includes_whole_day() {
    let store = populated_store();
    let window = TimeWindow::parse(None, Some("2024-03-09")).unwrap();

    let rows = query_totals(&store, GroupBy::All, &window).unwrap();
    assert_eq!(rows[0].count, 2);
}

#[test]
fn test_summary_projection() {
    let store = populated_store();

    let rows = query_summary_by_names(
        &store,
        &["total_distance", "total_training_effect"],
        &TimeWindow::all(),
    )
    .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("total_distance"), Some(&json!(5000.0)));
    assert_eq!(rows[1].get("total_training_effect"), Some(&json!(3.8)));

    let value = serde_json::to_value(&rows[2]).unwrap();
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
}

#[test]
fn test_summary_rejects_unknown_column() {
    let store = populated_store();

    let err = query_summary_by_names(&store, &["total_distance", "password"], &TimeWindow::all())
        .unwrap_err();

    assert!(matches!(err, FitlogError::InvalidQuery(_)));
}

#[test]
fn test_activity_detail_with_laps() {
    let store = populated_store();
    let start = parse_timestamp("2024-03-04 07:00:00").unwrap();

    let detail = query_activity(&store, start).unwrap().unwrap();

    assert_eq!(detail.activity.summary.total_distance, 5000.0);
    assert_eq!(detail.activity.summary.total_ascent, Some(42));
    assert_eq!(detail.laps.len(), 2);
    assert_eq!(detail.laps[1].total_ascent, None);

    let view = detail.activity.summarise().unwrap();
    assert_eq!(view.distance_km, 5.0);
    assert_eq!(view.pace_secs_per_km, 360);
    assert_eq!(view.cadence_spm, 168);
}

#[test]
fn test_activity_without_laps_is_still_visible() {
    let store = populated_store();
    let start = parse_timestamp("2024-04-02 06:30:00").unwrap();

    let detail = query_activity(&store, start).unwrap().unwrap();

    assert!(detail.laps.is_empty());
    // Treadmill runs record no speed, so pace cannot be derived
    assert!(matches!(
        detail.activity.summarise(),
        Err(FitlogError::UndefinedPace)
    ));
}

#[test]
fn test_activity_samples() {
    let store = populated_store();
    let start = parse_timestamp("2024-03-04 07:00:00").unwrap();

    let points = query_activity_samples(&store, start).unwrap();

    assert_eq!(points.len(), 3);
    assert_eq!(points[0].heart_rate, 101);
    assert_eq!(points[0].altitude, Some(31.4));
    assert_eq!(points[1].altitude, None);
    assert_eq!(points[2].speed, 2.8);
}

#[test]
fn test_unknown_activity() {
    let store = populated_store();
    let start = parse_timestamp("2020-01-01 00:00:00").unwrap();

    assert!(query_activity(&store, start).unwrap().is_none());
    assert!(query_activity_samples(&store, start).unwrap().is_empty());
}
