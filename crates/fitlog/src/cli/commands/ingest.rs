//! Ingest command for fitlog

use std::path::Path;

use crate::cli::{print_json, OutputFormat};
use crate::config::resolve_db_path;
use crate::decode::AutoDecoder;
use crate::error::Result;
use crate::ingest::{ingest, IngestMode};
use crate::storage::Store;

/// Ingest recordings from `src` into the database
pub fn run(db: Option<String>, src: &str, reset: bool, format: OutputFormat) -> Result<()> {
    let db_path = resolve_db_path(db.as_deref())?;
    let mode = if reset { IngestMode::Reset } else { IngestMode::Update };

    if format == OutputFormat::Table {
        println!("Using database: {}", db_path.display());
        if reset {
            println!("Resetting database before ingest");
        }
    }

    let mut store = Store::open(&db_path)?;
    let stats = ingest(&mut store, Path::new(src), mode, &AutoDecoder)?;

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            if !stats.skipped.is_empty() {
                println!();
                println!("Skipped files:");
                for skipped in &stats.skipped {
                    let name = skipped
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| skipped.path.display().to_string());
                    println!("  {:<28} {}", name, skipped.reason);
                }
            }
            println!("\nIngest complete: {}", stats);
        }
    }

    Ok(())
}
