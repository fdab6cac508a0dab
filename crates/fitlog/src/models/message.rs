//! Decoded recording messages
//!
//! A message is the decoder's view of one record in a recording: a flat map
//! from field name to a typed value. The core never sees raw bytes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A single decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicitly null; treated the same as an absent field
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Short type name used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Integer view; integral floats are accepted since JSON dumps cannot
    /// tell `150` from `150.0`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

/// One decoded message: field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, FieldValue>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Look up a field. Absent and explicit null both yield `None`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        match self.fields.get(name) {
            Some(FieldValue::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl FromIterator<(String, FieldValue)> for Message {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_reads_as_absent() {
        let message = Message::new()
            .with("heart_rate", 150)
            .with("altitude", FieldValue::Null);

        assert!(message.contains("heart_rate"));
        assert!(!message.contains("altitude"));
        assert!(message.get("cadence").is_none());
        assert_eq!(message.len(), 2);
    }

    #[test]
    fn test_zero_is_a_value() {
        let message = Message::new().with("total_ascent", 0);
        assert_eq!(message.get("total_ascent").and_then(FieldValue::as_i64), Some(0));
    }

    #[test]
    fn test_integer_views() {
        assert_eq!(FieldValue::Float(150.0).as_i64(), Some(150));
        assert_eq!(FieldValue::Float(150.5).as_i64(), None);
        assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::Text("3".into()).as_f64(), None);
    }
}
