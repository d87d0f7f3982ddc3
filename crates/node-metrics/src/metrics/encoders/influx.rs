use std::collections::HashMap;

use influxdb_line_protocol::LineProtocolBuilder;

use super::FieldValue;
use super::MetricsEncoder;

/// InfluxDB line protocol encoder
pub struct InfluxEncoder;

impl InfluxEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InfluxEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsEncoder for InfluxEncoder {
    fn encode_metrics(
        &self,
        measurement: &str,
        tags: &HashMap<String, String>,
        fields: &HashMap<String, FieldValue>,
        timestamp: i64,
    ) -> String {
        let mut builder = LineProtocolBuilder::new().measurement(measurement);

        // Sorted tags and fields keep lines stable between cycles
        let mut tag_entries: Vec<_> = tags.iter().collect();
        tag_entries.sort_by_key(|(k, _)| *k);
        for (key, value) in tag_entries {
            builder = builder.tag(key, value);
        }

        let mut field_entries: Vec<_> = fields.iter().collect();
        field_entries.sort_by_key(|(k, _)| *k);

        let lp_built = if let Some((first_key, first_value)) = field_entries.first() {
            // The first field moves the builder into its AfterField state
            let mut after_first_field = match first_value {
                FieldValue::String(s) => builder.field(first_key, s.as_str()),
                FieldValue::Integer(i) => builder.field(first_key, *i),
                FieldValue::UnsignedInteger(u) => builder.field(first_key, *u),
                FieldValue::Float(f) => builder.field(first_key, *f),
                FieldValue::Boolean(b) => builder.field(first_key, *b),
            };

            for (key, value) in field_entries.iter().skip(1) {
                after_first_field = match value {
                    FieldValue::String(s) => after_first_field.field(key, s.as_str()),
                    FieldValue::Integer(i) => after_first_field.field(key, *i),
                    FieldValue::UnsignedInteger(u) => after_first_field.field(key, *u),
                    FieldValue::Float(f) => after_first_field.field(key, *f),
                    FieldValue::Boolean(b) => after_first_field.field(key, *b),
                };
            }

            after_first_field.timestamp(timestamp).close_line().build()
        } else {
            // Line protocol requires at least one field
            builder
                .field("_empty", true)
                .timestamp(timestamp)
                .close_line()
                .build()
        };

        String::from_utf8(lp_built).unwrap_or_else(|e| {
            tracing::error!(measurement, "Encoded line is not valid UTF-8: {e}");
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn encode_node_metrics() {
        let encoder = InfluxEncoder::new();
        let mut tags = HashMap::new();
        tags.insert("node".to_string(), "ip-10-0-1-23".to_string());
        tags.insert("cluster".to_string(), "prod".to_string());

        let mut fields = HashMap::new();
        fields.insert("node_cpu_limit".to_string(), 4u64.into());
        fields.insert("node_status_condition_ready".to_string(), 1u64.into());

        let result = encoder.encode_metrics("node", &tags, &fields, 1609459200000000000);

        assert_eq!(
            result,
            "node,cluster=prod,node=ip-10-0-1-23 node_cpu_limit=4u,node_status_condition_ready=1u 1609459200000000000\n"
        );
    }

    #[test]
    fn encode_metrics_no_tags() {
        let encoder = InfluxEncoder::new();
        let tags = HashMap::new();
        let mut fields = HashMap::new();
        fields.insert("node_status_capacity_pods".to_string(), 110u64.into());

        let result = encoder.encode_metrics("node", &tags, &fields, 1234567890000000000);

        assert_eq!(result, "node node_status_capacity_pods=110u 1234567890000000000\n");
    }

    #[test]
    fn encode_metrics_empty_fields() {
        let encoder = InfluxEncoder::new();
        let mut tags = HashMap::new();
        tags.insert("node".to_string(), "a".to_string());

        let result = encoder.encode_metrics("node", &tags, &HashMap::new(), 1);

        assert!(result.contains("_empty=true"));
    }

    #[test]
    fn encode_metrics_all_field_types() {
        let encoder = InfluxEncoder::new();
        let mut fields = HashMap::new();
        fields.insert("string_val".to_string(), "hello world".into());
        fields.insert("int_val".to_string(), (-42i64).into());
        fields.insert("uint_val".to_string(), 42u64.into());
        fields.insert("float_val".to_string(), 0.5f64.into());
        fields.insert("bool_val".to_string(), true.into());

        let result = encoder.encode_metrics("mixed_types", &HashMap::new(), &fields, 1);

        assert!(result.contains("string_val=\"hello world\""));
        assert!(result.contains("int_val=-42i"));
        assert!(result.contains("uint_val=42u"));
        assert!(result.contains("float_val=0.5"));
        assert!(result.contains("bool_val=true"));
    }

    #[test]
    fn tag_values_are_escaped() {
        let encoder = InfluxEncoder::new();
        let mut tags = HashMap::new();
        tags.insert("instance_type".to_string(), "a b,c".to_string());
        let mut fields = HashMap::new();
        fields.insert("v".to_string(), 1u64.into());

        let result = encoder.encode_metrics("node", &tags, &fields, 1);

        assert!(result.starts_with("node,instance_type=a\\ b\\,c "));
    }
}
