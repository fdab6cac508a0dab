//! JSON message dumps
//!
//! A dump is an object mapping message kind to a list of messages:
//!
//! ```json
//! {
//!   "session": [{"start_time": "2024-03-01 07:00:00", "total_distance": 5000.0}],
//!   "lap": [],
//!   "record": [{"timestamp": "2024-03-01T07:00:01Z", "heart_rate": 121}]
//! }
//! ```
//!
//! Strings that parse as timestamps become timestamps, `null` is absent.

use std::path::Path;

use serde_json::Value;

use super::{DecodedFile, Decoder};
use crate::error::{FitlogError, Result};
use crate::models::{FieldValue, Message};
use crate::time_utils::parse_timestamp;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Decode a dump already in memory
    pub fn decode_str(&self, text: &str, origin: &str) -> Result<DecodedFile> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| FitlogError::decode(origin, format!("invalid JSON: {}", e)))?;

        let Value::Object(kinds) = root else {
            return Err(FitlogError::decode(origin, "expected an object of message lists"));
        };

        let mut file = DecodedFile::new();
        for (kind, list) in kinds {
            let Value::Array(items) = list else {
                return Err(FitlogError::decode(
                    origin,
                    format!("'{}' is not a list of messages", kind),
                ));
            };

            for (index, item) in items.into_iter().enumerate() {
                let Value::Object(fields) = item else {
                    return Err(FitlogError::decode(
                        origin,
                        format!("{} message {} is not an object", kind, index),
                    ));
                };
                let message: Message = fields
                    .into_iter()
                    .filter_map(|(name, value)| field_value(value).map(|v| (name, v)))
                    .collect();
                file.push(kind.clone(), message);
            }
        }

        Ok(file)
    }
}

impl Decoder for JsonDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FitlogError::decode(&origin, e.to_string()))?;
        self.decode_str(&text, &origin)
    }
}

/// Nested arrays and objects have no field equivalent and are dropped
fn field_value(value: Value) -> Option<FieldValue> {
    match value {
        Value::Null => Some(FieldValue::Null),
        Value::Bool(b) => Some(FieldValue::Integer(b as i64)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(FieldValue::Integer(i))
            } else {
                n.as_f64().map(FieldValue::Float)
            }
        }
        Value::String(s) => Some(match parse_timestamp(&s) {
            Some(ts) => FieldValue::Timestamp(ts),
            None => FieldValue::Text(s),
        }),
        Value::Array(_) | Value::Object(_) => None,
    }
}
