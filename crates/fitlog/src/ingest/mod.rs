//! Batch ingestion of recording files
//!
//! Each file is decoded into one session, its laps and its samples, then
//! written in a single transaction keyed by the session's start time. A bad
//! or already-stored file is skipped and the batch carries on; only store
//! failures end it.
//!
//! Lap and sample times are unique across the whole store. A lap or sample
//! that repeats an earlier time in its file, or one already stored, is
//! dropped on its own and counted as rejected.

mod source;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Activity, FromMessage, LapSummary, Sample};
use crate::decode::{DecodedFile, Decoder, LAP, RECORD, SESSION};
use crate::error::{FitlogError, Result};
use crate::models::{Message, ValidationError};
use crate::storage::{InsertOutcome, Store};
use crate::time_utils::format_timestamp;

pub use source::{list_recordings, resolve_activity_dir, ACTIVITY_SUBDIR};

/// How to treat what is already stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IngestMode {
    /// Add new recordings, skip ones already stored
    #[default]
    Update,
    /// Drop all tables first, then ingest everything
    Reset,
}

/// A file that contributed nothing, and why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Counters for one ingestion batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestStats {
    pub activities_added: usize,
    pub laps_added: usize,
    pub samples_added: usize,
    pub duplicates_skipped: usize,
    pub conflicts_skipped: usize,
    pub files_failed: usize,
    pub laps_rejected: usize,
    pub samples_rejected: usize,
    pub skipped: Vec<SkippedFile>,
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Activities: {}, Laps: {}, Samples: {}, Duplicates: {}, Failed: {}",
            self.activities_added,
            self.laps_added,
            self.samples_added,
            self.duplicates_skipped,
            self.files_failed
        )?;
        if self.conflicts_skipped > 0 {
            write!(f, ", Conflicts: {}", self.conflicts_skipped)?;
        }
        if self.laps_rejected > 0 || self.samples_rejected > 0 {
            write!(
                f,
                ", Rejected laps: {}, Rejected samples: {}",
                self.laps_rejected, self.samples_rejected
            )?;
        }
        Ok(())
    }
}

/// A validated hierarchy ready to be written
#[derive(Debug, Clone)]
pub struct PreparedActivity {
    pub activity: Activity,
    pub laps: Vec<LapSummary>,
    pub samples: Vec<Sample>,
    pub laps_rejected: usize,
    pub samples_rejected: usize,
}

/// What happened to one file
#[derive(Debug)]
enum FileOutcome {
    Added { laps: usize, samples: usize, laps_rejected: usize, samples_rejected: usize },
    Duplicate(DateTime<Utc>),
    Conflict(String),
}

/// Ingest every recording under `source`.
///
/// The source directory is checked before anything is touched, so a bad
/// path never drops tables in `Reset` mode.
pub fn ingest(
    store: &mut Store,
    source: &Path,
    mode: IngestMode,
    decoder: &dyn Decoder,
) -> Result<IngestStats> {
    let dir = resolve_activity_dir(source)?;
    let files = list_recordings(&dir)?;

    if mode == IngestMode::Reset {
        tracing::info!("Dropping and recreating tables");
        store.reset()?;
    }

    tracing::info!(dir = %dir.display(), files = files.len(), ?mode, "Starting ingest");

    let mut stats = IngestStats::default();
    for path in files {
        match ingest_file(store, &path, decoder) {
            Ok(FileOutcome::Added { laps, samples, laps_rejected, samples_rejected }) => {
                tracing::info!(file = %path.display(), laps, samples, "Added activity");
                stats.activities_added += 1;
                stats.laps_added += laps;
                stats.samples_added += samples;
                stats.laps_rejected += laps_rejected;
                stats.samples_rejected += samples_rejected;
            }
            Ok(FileOutcome::Duplicate(start_time)) => {
                let reason = FitlogError::Duplicate(format_timestamp(start_time)).to_string();
                tracing::warn!(file = %path.display(), "Skipping file: {}", reason);
                stats.duplicates_skipped += 1;
                stats.skipped.push(SkippedFile { path, reason });
            }
            Ok(FileOutcome::Conflict(detail)) => {
                let reason = FitlogError::Conflict(detail).to_string();
                tracing::warn!(file = %path.display(), "Skipping file: {}", reason);
                stats.conflicts_skipped += 1;
                stats.skipped.push(SkippedFile { path, reason });
            }
            Err(e) if e.is_per_file() => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping file");
                stats.files_failed += 1;
                stats.skipped.push(SkippedFile { path, reason: e.to_string() });
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(%stats, "Ingest complete");
    Ok(stats)
}

fn ingest_file(store: &mut Store, path: &Path, decoder: &dyn Decoder) -> Result<FileOutcome> {
    let decoded = decoder.decode(path)?;

    let activity = activity_from(&decoded)?;
    if store.activity_exists(activity.start_time())? {
        return Ok(FileOutcome::Duplicate(activity.start_time()));
    }

    let mut prepared = prepare_children(activity, &decoded, path);
    let (laps, taken) =
        drop_stored(prepared.laps, |l| l.start_time, |t| store.lap_exists(t), "lap", path)?;
    prepared.laps = laps;
    prepared.laps_rejected += taken;
    let (samples, taken) =
        drop_stored(prepared.samples, |s| s.timestamp, |t| store.sample_exists(t), "sample", path)?;
    prepared.samples = samples;
    prepared.samples_rejected += taken;

    match store.insert_activity(&prepared.activity, &prepared.laps, &prepared.samples)? {
        InsertOutcome::Inserted { laps, samples, .. } => Ok(FileOutcome::Added {
            laps,
            samples,
            laps_rejected: prepared.laps_rejected,
            samples_rejected: prepared.samples_rejected,
        }),
        InsertOutcome::AlreadyExists => Ok(FileOutcome::Duplicate(prepared.activity.start_time())),
        InsertOutcome::Conflict(detail) => Ok(FileOutcome::Conflict(detail)),
    }
}

/// Validate a decoded file into a hierarchy ready for the store
pub fn prepare_file(decoded: &DecodedFile, path: &Path) -> Result<PreparedActivity> {
    let activity = activity_from(decoded)?;
    Ok(prepare_children(activity, decoded, path))
}

/// Only the first session message is used. A file without one fails the
/// same way a session missing every field would.
fn activity_from(decoded: &DecodedFile) -> Result<Activity> {
    let session = decoded.first(SESSION).ok_or_else(|| {
        ValidationError::MissingRequiredFields(
            Activity::schema().required().iter().map(|f| f.to_string()).collect(),
        )
    })?;
    Ok(Activity::from_message(session)?)
}

fn prepare_children(activity: Activity, decoded: &DecodedFile, path: &Path) -> PreparedActivity {
    let (laps, invalid_laps) = collect_valid::<LapSummary>(decoded.messages(LAP), "lap", path);
    let (laps, repeated_laps) = drop_repeated(laps, |l| l.start_time, "lap", path);
    let (samples, invalid_samples) =
        collect_valid::<Sample>(decoded.messages(RECORD), "sample", path);
    let (samples, repeated_samples) = drop_repeated(samples, |s| s.timestamp, "sample", path);

    PreparedActivity {
        activity,
        laps,
        samples,
        laps_rejected: invalid_laps + repeated_laps,
        samples_rejected: invalid_samples + repeated_samples,
    }
}

/// Keep the messages that validate; warn about and count the rest
fn collect_valid<T: FromMessage>(messages: &[Message], kind: &str, path: &Path) -> (Vec<T>, usize) {
    let mut valid = Vec::with_capacity(messages.len());
    let mut rejected = 0;
    for (index, message) in messages.iter().enumerate() {
        match T::from_message(message) {
            Ok(record) => valid.push(record),
            Err(e) => {
                tracing::warn!(file = %path.display(), kind, index, error = %e, "Dropping invalid message");
                rejected += 1;
            }
        }
    }
    (valid, rejected)
}

/// Keep the first record at each time; later ones at the same time are dropped
fn drop_repeated<T>(
    records: Vec<T>,
    time_of: impl Fn(&T) -> DateTime<Utc>,
    kind: &str,
    path: &Path,
) -> (Vec<T>, usize) {
    let mut seen = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        let at = time_of(&record);
        if seen.insert(at) {
            kept.push(record);
        } else {
            tracing::warn!(file = %path.display(), kind, at = %format_timestamp(at), "Dropping repeated message");
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Drop records whose time another activity already owns
fn drop_stored<T>(
    records: Vec<T>,
    time_of: impl Fn(&T) -> DateTime<Utc>,
    is_stored: impl Fn(DateTime<Utc>) -> Result<bool>,
    kind: &str,
    path: &Path,
) -> Result<(Vec<T>, usize)> {
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        let at = time_of(&record);
        if is_stored(at)? {
            tracing::warn!(file = %path.display(), kind, at = %format_timestamp(at), "Dropping message already stored under another activity");
            dropped += 1;
        } else {
            kept.push(record);
        }
    }
    Ok((kept, dropped))
}
