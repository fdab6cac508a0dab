//! Binary FIT recordings via `fitparser`

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use fitparser::profile::MesgNum;
use fitparser::Value;

use super::{DecodedFile, Decoder, LAP, RECORD, SESSION};
use crate::error::{FitlogError, Result};
use crate::models::{FieldValue, Message};

#[derive(Debug, Default, Clone, Copy)]
pub struct FitDecoder;

impl Decoder for FitDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile> {
        let origin = path.display().to_string();
        let mut file = File::open(path).map_err(|e| FitlogError::decode(&origin, e.to_string()))?;
        let records = fitparser::from_reader(&mut file)
            .map_err(|e| FitlogError::decode(&origin, e.to_string()))?;

        let mut decoded = DecodedFile::new();
        for record in records {
            let kind = match record.kind() {
                MesgNum::Session => SESSION,
                MesgNum::Lap => LAP,
                MesgNum::Record => RECORD,
                _ => continue,
            };

            let message: Message = record
                .fields()
                .iter()
                .filter_map(|field| {
                    field_value(field.value()).map(|v| (field.name().to_string(), v))
                })
                .collect();
            decoded.push(kind, message);
        }

        Ok(decoded)
    }
}

fn field_value(value: &Value) -> Option<FieldValue> {
    let v = match value {
        Value::Timestamp(ts) => FieldValue::Timestamp(ts.with_timezone(&Utc)),
        Value::Byte(v) | Value::Enum(v) | Value::UInt8(v) | Value::UInt8z(v) => {
            FieldValue::Integer(*v as i64)
        }
        Value::SInt8(v) => FieldValue::Integer(*v as i64),
        Value::SInt16(v) => FieldValue::Integer(*v as i64),
        Value::UInt16(v) | Value::UInt16z(v) => FieldValue::Integer(*v as i64),
        Value::SInt32(v) => FieldValue::Integer(*v as i64),
        Value::UInt32(v) | Value::UInt32z(v) => FieldValue::Integer(*v as i64),
        Value::SInt64(v) => FieldValue::Integer(*v),
        Value::UInt64(v) | Value::UInt64z(v) => FieldValue::Integer(i64::try_from(*v).ok()?),
        Value::Float32(v) => FieldValue::Float(*v as f64),
        Value::Float64(v) => FieldValue::Float(*v),
        Value::String(s) => FieldValue::Text(s.clone()),
        _ => return None,
    };
    Some(v)
}
