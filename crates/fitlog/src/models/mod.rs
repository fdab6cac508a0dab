//! Decoded message models
//!
//! - [`Message`]: the decoder's key/value view of one recording message
//! - [`validate`]: the shared required/optional field check
//! - [`SummaryView`]: derived presentation of a lap or activity

pub mod message;
pub mod summary;
pub mod validate;

pub use message::{FieldValue, Message};
pub use summary::{format_duration, SummaryView, TrainingEffect};
pub use validate::{validate, FieldSchema, Validated, ValidationError};
