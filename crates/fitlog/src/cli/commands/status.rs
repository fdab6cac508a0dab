//! Database status for fitlog

use serde::Serialize;

use crate::cli::{open_existing, print_json, OutputFormat};
use crate::db::models::TableCounts;
use crate::error::Result;

#[derive(Serialize)]
struct StatusOutput {
    database: String,
    #[serde(flatten)]
    counts: TableCounts,
}

/// Show where the database is and how much it holds
pub fn status(db: Option<String>, format: OutputFormat) -> Result<()> {
    let Some((path, store)) = open_existing(db.as_deref())? else {
        return Ok(());
    };
    let counts = store.counts()?;

    if format == OutputFormat::Json {
        return print_json(&StatusOutput {
            database: path.display().to_string(),
            counts,
        });
    }

    println!("Database: {}", path.display());
    println!();
    println!("Data stored:");
    println!("  Activities:    {:>8}", counts.activities);
    println!("  Laps:          {:>8}", counts.laps);
    println!("  Samples:       {:>8}", counts.samples);

    Ok(())
}
