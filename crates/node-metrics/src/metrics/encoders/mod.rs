use std::collections::HashMap;

pub mod influx;
pub mod json;

/// Represents a field value that can be encoded in metrics
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    UnsignedInteger(u64),
    Float(f64),
    Boolean(bool),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::UnsignedInteger(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// Trait for encoding metrics data into different formats
pub trait MetricsEncoder: Send + Sync {
    /// Encode metrics with measurement name, tags, fields, and timestamp
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, FieldValue>,
        timestamp: i64,
    ) -> String;
}

/// Factory function to create encoders based on format string
pub fn create_encoder(format: &str) -> Box<dyn MetricsEncoder + Send + Sync> {
    match format.to_lowercase().as_str() {
        "json" => Box::new(json::JsonEncoder::new()),
        _ => Box::new(influx::InfluxEncoder::new()),
    }
}
