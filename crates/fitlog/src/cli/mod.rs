pub mod commands;

use std::path::PathBuf;

use serde::Serialize;

use crate::config::resolve_db_path;
use crate::error::Result;
use crate::storage::Store;

/// How command results are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Open the database for a read-only command.
///
/// Returns `None` (after telling the user) when no database exists yet,
/// rather than creating an empty one.
pub(crate) fn open_existing(db: Option<&str>) -> Result<Option<(PathBuf, Store)>> {
    let path = resolve_db_path(db)?;
    if !path.exists() {
        println!("No database found at: {}", path.display());
        println!("Run 'fitlog ingest' to create one.");
        return Ok(None);
    }

    let store = Store::open(&path)?;
    Ok(Some((path, store)))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Truncate a string to a display width, marking the cut
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("avg_heart_rate", 20), "avg_heart_rate");
        assert_eq!(truncate("total_anaerobic_training_effect", 12), "total_ana...");
    }
}
