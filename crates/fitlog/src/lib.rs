//! Idempotent import of activity recordings into SQLite, with period
//! totals and per-activity queries on top.

pub mod cli;
pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod ingest;
pub mod models;
pub mod query;
pub mod storage;
pub mod time_utils;

pub use error::{FitlogError, Result};
pub use ingest::{ingest, IngestMode, IngestStats};
pub use storage::Store;
