use std::collections::HashMap;

use serde_json::json;

use super::FieldValue;
use super::MetricsEncoder;

/// JSON encoder for metrics
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEncoder for JsonEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, FieldValue>,
        timestamp: i64,
    ) -> String {
        let json_fields: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| {
                let json_value = match v {
                    FieldValue::String(s) => serde_json::Value::String(s.clone()),
                    FieldValue::Integer(i) => serde_json::Value::from(*i),
                    FieldValue::UnsignedInteger(u) => serde_json::Value::from(*u),
                    FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                        .map_or(serde_json::Value::Null, serde_json::Value::Number),
                    FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
                };
                (k.clone(), json_value)
            })
            .collect();

        let metrics = json!({
            "measure": measurement,
            "ts": timestamp,
            "tag": tags,
            "field": json_fields,
        });
        metrics.to_string() + "\n"
    }
}
