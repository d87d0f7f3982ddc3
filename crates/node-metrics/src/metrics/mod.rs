//! Periodic emission of node metrics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use api_types::HyperPodConditionType;
use api_types::NodeConditionType;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::nodeinfo::NodeInfo;
use crate::nodeinfo::NodeProvider;

pub mod encoders;
use encoders::create_encoder;
use encoders::FieldValue;

/// Measurement name for all node metrics.
pub const NODE_MEASUREMENT: &str = "node";

const CONDITION_FIELD_PREFIX: &str = "node_status_condition_";
const HYPER_POD_FIELD_PREFIX: &str = "hyper_pod_node_health_status_";

/// Emitter settings.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub interval: Duration,
    pub format: String,
    pub cluster_name: Option<String>,
}

/// The valid metrics of one node for one polling cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMetrics {
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, FieldValue>,
}

impl NodeMetrics {
    fn field(&mut self, name: impl Into<String>, value: Option<u64>) {
        if let Some(value) = value {
            self.fields.insert(name.into(), value.into());
        }
    }

    /// Looks up an emitted field as an unsigned value.
    pub fn get(&self, name: &str) -> Option<u64> {
        match self.fields.get(name)? {
            FieldValue::UnsignedInteger(v) => Some(*v),
            _ => None,
        }
    }
}

/// Derive every metric of `info`, dropping the ones that are not valid.
///
/// Returns `None` if the node was not found.
pub fn collect_node_metrics(info: &NodeInfo, cluster_name: Option<&str>) -> Option<NodeMetrics> {
    if !info.exists() {
        return None;
    }

    let mut metrics = NodeMetrics {
        tags: HashMap::new(),
        fields: HashMap::new(),
    };

    metrics
        .tags
        .insert("node".to_string(), info.node_name().to_string());
    if let Some(cluster_name) = cluster_name {
        metrics
            .tags
            .insert("cluster".to_string(), cluster_name.to_string());
    }
    if let Some(instance_id) = info.instance_id() {
        metrics
            .tags
            .insert("instance_id".to_string(), instance_id.to_string());
    }
    if let Some(instance_type) = info.instance_type() {
        metrics
            .tags
            .insert("instance_type".to_string(), instance_type.to_string());
    }

    metrics.field("node_cpu_limit", info.cpu_capacity());
    metrics.field("node_memory_limit", info.mem_capacity());
    metrics.field("node_status_capacity_pods", info.node_status_capacity_pods());
    metrics.field(
        "node_status_allocatable_pods",
        info.node_status_allocatable_pods(),
    );

    for condition_type in NodeConditionType::ALL {
        metrics.field(
            format!("{CONDITION_FIELD_PREFIX}{}", condition_type.metric_suffix()),
            info.node_status_condition(condition_type),
        );
    }
    metrics.field(
        format!("{CONDITION_FIELD_PREFIX}unknown"),
        info.node_condition_unknown(),
    );

    if let Some(label) = info.hyper_pod_label() {
        for state in HyperPodConditionType::NAMED {
            metrics.field(
                format!("{HYPER_POD_FIELD_PREFIX}{}", state.metric_suffix()),
                info.label_value(state, label.key()),
            );
        }
        metrics.field(
            format!(
                "{HYPER_POD_FIELD_PREFIX}{}",
                HyperPodConditionType::Unknown.metric_suffix()
            ),
            info.label_value_unknown(label.key()),
        );
    }

    Some(metrics)
}

/// Run metrics collection asynchronously
///
/// Every interval, each node known to the provider gets a fresh [`NodeInfo`] and
/// its valid metrics are written to the `metrics` tracing target.
#[tracing::instrument(skip_all, fields(interval = ?config.interval, format = %config.format))]
pub async fn run_metrics<P>(
    provider: Arc<P>,
    config: MetricsConfig,
    cancellation_token: CancellationToken,
) where
    P: NodeProvider + ?Sized,
{
    let encoder = create_encoder(&config.format);
    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("Starting node metrics emitter");

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                tracing::info!("Node metrics emitter shutdown requested");
                break;
            }
            _ = ticker.tick() => {}
        }

        let timestamp = current_time();
        let mut emitted = 0usize;
        for node_name in provider.node_names() {
            let info = NodeInfo::new(node_name, &*provider);
            let Some(metrics) = collect_node_metrics(&info, config.cluster_name.as_deref()) else {
                tracing::debug!(
                    node_name = %info.node_name(),
                    "Node disappeared before its metrics were collected"
                );
                continue;
            };

            let metrics_str =
                encoder.encode_metrics(NODE_MEASUREMENT, &metrics.tags, &metrics.fields, timestamp);
            tracing::info!(
                target: "metrics",
                msg = %metrics_str.trim_end(),
            );
            emitted += 1;
        }
        tracing::debug!(nodes = emitted, "Emitted node metrics");
    }
}

/// Current time in nanoseconds since the Unix epoch.
pub fn current_time() -> i64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use test_log::test;

    use super::*;
    use crate::nodeinfo::HyperPodLabel;
    use crate::nodeinfo::InMemoryNodeProvider;
    use crate::nodeinfo::NodeSnapshot;

    fn provider() -> InMemoryNodeProvider {
        InMemoryNodeProvider::with_nodes([
            NodeSnapshot::new("worker-1")
                .with_capacity("cpu", 4i64)
                .with_capacity("memory", 16721489920i64)
                .with_capacity("pods", 110i64)
                .with_allocatable("pods", 100i64)
                .with_condition("Ready", "True")
                .with_provider_id("aws:///us-west-2a/i-0abc")
                .with_label("node.kubernetes.io/instance-type", "m5.xlarge"),
            NodeSnapshot::new("hyperpod-1")
                .with_capacity("cpu", -1i64)
                .with_capacity("pods", "many")
                .with_label(
                    HyperPodLabel::NodeHealthStatus.key(),
                    "UnschedulablePendingReplacement",
                ),
        ])
    }

    #[test]
    fn collect_regular_node() {
        let info = NodeInfo::new("worker-1", &provider());
        let metrics = collect_node_metrics(&info, Some("prod")).expect("node exists");

        assert_eq!(metrics.tags.get("node").map(String::as_str), Some("worker-1"));
        assert_eq!(metrics.tags.get("cluster").map(String::as_str), Some("prod"));
        assert_eq!(metrics.tags.get("instance_id").map(String::as_str), Some("i-0abc"));
        assert_eq!(
            metrics.tags.get("instance_type").map(String::as_str),
            Some("m5.xlarge")
        );

        assert_eq!(metrics.get("node_cpu_limit"), Some(4));
        assert_eq!(metrics.get("node_memory_limit"), Some(16721489920));
        assert_eq!(metrics.get("node_status_capacity_pods"), Some(110));
        assert_eq!(metrics.get("node_status_allocatable_pods"), Some(100));
        assert_eq!(metrics.get("node_status_condition_ready"), Some(1));
        assert_eq!(metrics.get("node_status_condition_unknown"), Some(0));

        // Conditions the node does not report are skipped
        assert_eq!(metrics.get("node_status_condition_disk_pressure"), None);
        assert!(!metrics.fields.contains_key("node_status_condition_disk_pressure"));
        assert!(!metrics
            .fields
            .keys()
            .any(|k| k.starts_with(HYPER_POD_FIELD_PREFIX)));
        assert_eq!(metrics.fields.len(), 6);
    }

    #[test]
    fn collect_hyper_pod_node() {
        let info = NodeInfo::new("hyperpod-1", &provider());
        let metrics = collect_node_metrics(&info, None).expect("node exists");

        assert!(!metrics.tags.contains_key("cluster"));
        assert_eq!(metrics.get("node_cpu_limit"), None);
        assert_eq!(metrics.get("node_status_capacity_pods"), None);
        assert_eq!(metrics.get("node_status_condition_unknown"), Some(1));

        assert_eq!(
            metrics.get("hyper_pod_node_health_status_unschedulable_pending_replacement"),
            Some(1)
        );
        assert_eq!(metrics.get("hyper_pod_node_health_status_schedulable"), Some(0));
        assert_eq!(
            metrics.get("hyper_pod_node_health_status_schedulable_preferred"),
            Some(0)
        );
        assert_eq!(
            metrics.get("hyper_pod_node_health_status_unschedulable_pending_reboot"),
            Some(0)
        );
        assert_eq!(metrics.get("hyper_pod_node_health_status_unschedulable"), Some(0));
        assert_eq!(metrics.get("hyper_pod_node_health_status_unknown"), Some(0));
    }

    #[test]
    fn collect_missing_node() {
        let info = NodeInfo::new("gone", &provider());
        assert_eq!(collect_node_metrics(&info, Some("prod")), None);
    }

    #[test(tokio::test)]
    async fn run_metrics_stops_on_cancellation() {
        let cancellation_token = CancellationToken::new();
        let handle = tokio::spawn(run_metrics(
            Arc::new(provider()),
            MetricsConfig {
                interval: Duration::from_millis(10),
                format: "influx".to_string(),
                cluster_name: None,
            },
            cancellation_token.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancellation_token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("emitter should stop")
            .expect("emitter should not panic");
    }
}
