//! Relational schema and record models
//!
//! Three tables: `activities`, `laps` and `samples`. Laps and samples point
//! at their owning activity; start times and sample timestamps are unique.

pub mod models;
pub mod schema;

pub use models::*;
