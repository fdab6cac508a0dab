//! Aggregate query commands for fitlog

use crate::cli::{open_existing, print_json, truncate, OutputFormat};
use crate::error::Result;
use crate::models::format_duration;
use crate::query::{parse_columns, query_summary, query_totals, GroupBy, SummaryRow, TimeWindow};

/// Show totals per week, month, year or overall
pub fn totals(
    db: Option<String>,
    group_by: &str,
    from: Option<String>,
    to: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    // Reject bad arguments before opening anything
    let group_by: GroupBy = group_by.parse()?;
    let window = TimeWindow::parse(from.as_deref(), to.as_deref())?;

    let Some((_, store)) = open_existing(db.as_deref())? else {
        return Ok(());
    };
    let rows = query_totals(&store, group_by, &window)?;

    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    println!(
        "{:<12} {:>8} {:>12} {:>12}",
        "Period", "Count", "Distance", "Time"
    );
    println!("{}", "-".repeat(47));

    for row in &rows {
        let period = row
            .period_start
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "all".to_string());
        println!(
            "{:<12} {:>8} {:>12} {:>12}",
            period,
            row.count,
            format!("{:.2} km", row.total_distance / 1000.0),
            format_duration(row.total_time.round() as i64)
        );
    }

    if group_by != GroupBy::All {
        println!("\nShowing {} {} periods", rows.len(), group_by);
    }

    Ok(())
}

/// Show chosen columns for every activity in a window
pub fn summary(
    db: Option<String>,
    from: Option<String>,
    to: Option<String>,
    columns: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let columns = parse_columns(&columns)?;
    let window = TimeWindow::parse(from.as_deref(), to.as_deref())?;

    let Some((_, store)) = open_existing(db.as_deref())? else {
        return Ok(());
    };
    let rows = query_summary(&store, &columns, &window)?;

    if format == OutputFormat::Json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No activities found.");
        return Ok(());
    }

    let mut header = format!("{:<20}", "start_time");
    for column in &columns {
        header.push_str(&format!(" {:>16}", truncate(column.as_str(), 16)));
    }
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for row in &rows {
        println!("{}", render_row(row));
    }

    println!("\nShowing {} activities", rows.len());

    Ok(())
}

fn render_row(row: &SummaryRow) -> String {
    let mut line = format!("{:<20}", row.start_time.format("%Y-%m-%d %H:%M:%S"));
    for (_, value) in &row.values {
        let cell = match value {
            serde_json::Value::Null => "-".to_string(),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => format!("{:.2}", f),
                _ => n.to_string(),
            },
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        line.push_str(&format!(" {:>16}", cell));
    }
    line
}
