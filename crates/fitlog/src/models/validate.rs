//! Required/optional field checking shared by every record model

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::message::{FieldValue, Message};

/// Reasons a decoded message cannot become a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("message is missing required fields: {}", .0.join(", "))]
    MissingRequiredFields(Vec<String>),

    #[error("field '{field}' is {found}, expected {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ValidationError {
    /// Names of the missing fields, empty for type errors
    pub fn missing_fields(&self) -> &[String] {
        match self {
            ValidationError::MissingRequiredFields(fields) => fields,
            ValidationError::InvalidFieldType { .. } => &[],
        }
    }
}

/// Which fields a record needs and which it may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    required: Vec<&'static str>,
    optional: Vec<&'static str>,
}

impl FieldSchema {
    pub fn new(required: &[&'static str], optional: &[&'static str]) -> Self {
        Self {
            required: required.to_vec(),
            optional: optional.to_vec(),
        }
    }

    /// Extend the required set, keeping the optional set
    pub fn with_required(mut self, extra: &[&'static str]) -> Self {
        self.required.extend_from_slice(extra);
        self
    }

    pub fn required(&self) -> &[&'static str] {
        &self.required
    }

    pub fn optional(&self) -> &[&'static str] {
        &self.optional
    }

    fn is_optional(&self, field: &str) -> bool {
        self.optional.iter().any(|f| *f == field)
    }
}

/// Check every required field is present.
///
/// All missing fields are reported together, in schema order.
pub fn validate<'a>(
    message: &'a Message,
    schema: &'a FieldSchema,
) -> Result<Validated<'a>, ValidationError> {
    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|field| !message.contains(field))
        .map(|field| field.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(ValidationError::MissingRequiredFields(missing));
    }

    Ok(Validated { message, schema })
}

/// A message whose required fields are known to be present
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    message: &'a Message,
    schema: &'a FieldSchema,
}

impl<'a> Validated<'a> {
    pub fn message(&self) -> &'a Message {
        self.message
    }

    pub fn timestamp(&self, field: &str) -> Result<DateTime<Utc>, ValidationError> {
        self.required(field, "timestamp", FieldValue::as_timestamp)
    }

    pub fn float(&self, field: &str) -> Result<f64, ValidationError> {
        self.required(field, "number", FieldValue::as_f64)
    }

    pub fn integer(&self, field: &str) -> Result<i64, ValidationError> {
        self.required(field, "integer", FieldValue::as_i64)
    }

    /// Optional fields are read permissively: a value of the wrong type
    /// reads as absent rather than failing the record.
    pub fn opt_float(&self, field: &str) -> Option<f64> {
        self.optional(field).and_then(FieldValue::as_f64)
    }

    pub fn opt_integer(&self, field: &str) -> Option<i64> {
        self.optional(field).and_then(FieldValue::as_i64)
    }

    fn optional(&self, field: &str) -> Option<&'a FieldValue> {
        debug_assert!(
            self.schema.is_optional(field),
            "'{}' is not an optional field of this schema",
            field
        );
        self.message.get(field)
    }

    fn required<T>(
        &self,
        field: &str,
        expected: &'static str,
        convert: impl Fn(&FieldValue) -> Option<T>,
    ) -> Result<T, ValidationError> {
        let value = self
            .message
            .get(field)
            .ok_or_else(|| ValidationError::MissingRequiredFields(vec![field.to_string()]))?;

        convert(value).ok_or_else(|| ValidationError::InvalidFieldType {
            field: field.to_string(),
            expected,
            found: value.type_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn schema() -> FieldSchema {
        FieldSchema::new(&["timestamp", "heart_rate", "cadence"], &["altitude"])
    }

    #[test]
    fn test_reports_every_missing_field() {
        let message = Message::new().with("cadence", 88);

        let err = validate(&message, &schema()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredFields(vec![
                "timestamp".to_string(),
                "heart_rate".to_string()
            ])
        );
        assert!(err.to_string().contains("timestamp, heart_rate"));
    }

    #[test]
    fn test_explicit_null_counts_as_missing() {
        let message = Message::new()
            .with("timestamp", Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap())
            .with("heart_rate", FieldValue::Null)
            .with("cadence", 88);

        let err = validate(&message, &schema()).unwrap_err();
        assert_eq!(err.missing_fields(), &["heart_rate".to_string()]);
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let message = Message::new()
            .with("timestamp", Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap())
            .with("heart_rate", 141)
            .with("cadence", 0);

        let schema = schema();
        let validated = validate(&message, &schema).unwrap();
        assert_eq!(validated.integer("cadence").unwrap(), 0);
        assert_eq!(validated.opt_float("altitude"), None);
    }

    #[test]
    fn test_wrong_type_on_required_field() {
        let message = Message::new()
            .with("timestamp", "not a time")
            .with("heart_rate", 141)
            .with("cadence", 88);

        let schema = schema();
        let validated = validate(&message, &schema).unwrap();
        let err = validated.timestamp("timestamp").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFieldType { expected: "timestamp", found: "text", .. }
        ));
    }

    #[test]
    fn test_wrong_type_on_optional_field_reads_as_absent() {
        let message = Message::new()
            .with("timestamp", Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap())
            .with("heart_rate", 141)
            .with("cadence", 88)
            .with("altitude", "high");

        let schema = schema();
        let validated = validate(&message, &schema).unwrap();
        assert_eq!(validated.opt_float("altitude"), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "not an optional field")]
    fn test_optional_lookup_outside_schema() {
        let message = Message::new()
            .with("timestamp", Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap())
            .with("heart_rate", 141)
            .with("cadence", 88);

        let schema = schema();
        let validated = validate(&message, &schema).unwrap();
        validated.opt_integer("position_lat");
    }

    #[test]
    fn test_with_required_extends_schema() {
        let extended = schema().with_required(&["total_training_effect"]);
        assert_eq!(extended.required().len(), 4);
        assert_eq!(extended.optional(), &["altitude"]);
    }
}
