use crate::core::data_type::DataType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single decoded cell value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Boolean(bool),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, used to build point coordinates.
    /// Strings are parsed so DECIMAL columns (decoded as text) still work.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::String(v) => v.trim().parse::<f64>().ok(),
            Value::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            Value::Json(v) => v.as_f64(),
            Value::Bytes(_) | Value::Date(_) | Value::Timestamp(_) | Value::Null => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Int(v) => Some(v.to_string()),
            Value::Uint(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::String(v) => Some(v.clone()),
            Value::Boolean(v) => Some(v.to_string()),
            Value::Json(v) => Some(v.to_string()),
            Value::Date(v) => Some(v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => Some(v.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()),
            Value::Bytes(_) | Value::Null => None,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::BigInt,
            Value::Uint(_) => DataType::BigIntUnsigned,
            Value::Float(_) => DataType::Double,
            Value::String(_) => DataType::VarChar,
            Value::Boolean(_) => DataType::Boolean,
            Value::Bytes(_) => DataType::Blob,
            Value::Date(_) => DataType::Date,
            Value::Timestamp(_) => DataType::Timestamp,
            Value::Json(_) => DataType::Json,
            Value::Null => DataType::Null,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldValue {
    pub name: String,
    pub value: Option<Value>,
    pub data_type: DataType,
}

impl FieldValue {
    pub fn new(name: &str, value: Value) -> Self {
        let data_type = value.data_type();
        FieldValue {
            name: name.to_string(),
            value: Some(value),
            data_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_f64_parses_decimal_strings() {
        assert_eq!(Value::String(" 13.402 ".into()).as_f64(), Some(13.402));
        assert_eq!(Value::Int(-7).as_f64(), Some(-7.0));
        assert_eq!(Value::Null.as_f64(), None);
        assert_eq!(Value::String("not a number".into()).as_f64(), None);
    }

    #[test]
    fn as_string_formats_date_without_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::Date(date).as_string().as_deref(), Some("2024-03-09"));
    }
}
