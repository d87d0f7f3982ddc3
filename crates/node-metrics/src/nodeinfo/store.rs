//! Per-node metrics store.
//!
//! A [`NodeInfo`] is built once per polling cycle from a single provider lookup
//! and every metric is derived from that snapshot. Each getter returns
//! `Option<u64>`: `None` means the metric is unavailable (node not found, field
//! absent, or value outside its domain) and must not be emitted.

use std::sync::Arc;

use api_types::HyperPodConditionType;
use api_types::NodeConditionType;
use tracing::debug;

use super::capacity::CapacityValue;
use super::hyperpod::HyperPodLabel;
use super::provider::NodeProvider;
use super::snapshot::NodeSnapshot;

pub const RESOURCE_CPU: &str = "cpu";
pub const RESOURCE_MEMORY: &str = "memory";
pub const RESOURCE_PODS: &str = "pods";

const CONDITION_STATUS_TRUE: &str = "True";

#[derive(Debug, Clone)]
pub struct NodeInfo {
    node_name: String,
    node: Option<Arc<NodeSnapshot>>,
    cpu_capacity: Option<u64>,
    mem_capacity: Option<u64>,
}

impl NodeInfo {
    /// Looks `node_name` up once and seeds CPU and memory capacity from it.
    pub fn new<P>(node_name: impl Into<String>, provider: &P) -> Self
    where
        P: NodeProvider + ?Sized,
    {
        let node_name = node_name.into();
        let node = provider.get_node(&node_name);
        let mut info = Self {
            node_name,
            node,
            cpu_capacity: None,
            mem_capacity: None,
        };

        if let Some(cpu) = info.raw_capacity(RESOURCE_CPU) {
            info.set_cpu_capacity(cpu);
        }
        if let Some(memory) = info.raw_capacity(RESOURCE_MEMORY) {
            info.set_mem_capacity(memory);
        }
        info
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Whether the provider returned the node for this cycle.
    pub fn exists(&self) -> bool {
        self.node.is_some()
    }

    pub fn snapshot(&self) -> Option<&NodeSnapshot> {
        self.node.as_deref()
    }

    pub fn set_cpu_capacity(&mut self, value: impl Into<CapacityValue>) {
        self.cpu_capacity = self.coerce(RESOURCE_CPU, value.into());
    }

    /// CPU capacity in whole cores.
    pub fn cpu_capacity(&self) -> Option<u64> {
        self.cpu_capacity
    }

    pub fn set_mem_capacity(&mut self, value: impl Into<CapacityValue>) {
        self.mem_capacity = self.coerce(RESOURCE_MEMORY, value.into());
    }

    /// Memory capacity in bytes.
    pub fn mem_capacity(&self) -> Option<u64> {
        self.mem_capacity
    }

    /// `status.capacity[resource]` as a metric.
    pub fn capacity(&self, resource: &str) -> Option<u64> {
        let node = self.node.as_deref()?;
        node.capacity
            .get(resource)
            .and_then(|value| self.coerce(resource, value.clone()))
    }

    /// `status.allocatable[resource]` as a metric.
    pub fn allocatable(&self, resource: &str) -> Option<u64> {
        let node = self.node.as_deref()?;
        node.allocatable
            .get(resource)
            .and_then(|value| self.coerce(resource, value.clone()))
    }

    pub fn node_status_capacity_pods(&self) -> Option<u64> {
        self.capacity(RESOURCE_PODS)
    }

    pub fn node_status_allocatable_pods(&self) -> Option<u64> {
        self.allocatable(RESOURCE_PODS)
    }

    /// `1` if the condition is `True`, `0` for any other status, `None` if the
    /// node does not report the condition at all.
    pub fn node_status_condition(&self, condition_type: NodeConditionType) -> Option<u64> {
        let condition = self.node.as_deref()?.condition(condition_type.as_str())?;
        Some(u64::from(condition.status == CONDITION_STATUS_TRUE))
    }

    /// `1` if the node reports none of the known condition types, `0` otherwise.
    ///
    /// Unlike [`Self::node_status_condition`], a missing condition is a valid
    /// reading here.
    pub fn node_condition_unknown(&self) -> Option<u64> {
        let node = self.node.as_deref()?;
        let reports_known = node
            .conditions
            .iter()
            .any(|c| NodeConditionType::from_type(&c.type_).is_some());
        Some(u64::from(!reports_known))
    }

    /// `1` if the label value is not a recognized HyperPod state, `0` if it is.
    /// `None` unless `label_key` is a registered HyperPod label and the node
    /// carries it.
    pub fn label_value_unknown(&self, label_key: &str) -> Option<u64> {
        HyperPodLabel::from_key(label_key)?;
        let value = self.node.as_deref()?.labels.get(label_key)?;
        Some(u64::from(HyperPodConditionType::lookup(value).is_none()))
    }

    /// `1` if the label parses to `target`, `0` otherwise. `None` for keys that
    /// are not registered HyperPod labels, or when the node does not exist.
    pub fn label_value(&self, target: HyperPodConditionType, label_key: &str) -> Option<u64> {
        HyperPodLabel::from_key(label_key)?;
        let node = self.node.as_deref()?;
        let state = node
            .labels
            .get(label_key)
            .map_or(HyperPodConditionType::Unknown, |value| {
                HyperPodConditionType::parse(value)
            });
        Some(u64::from(state == target))
    }

    /// The first registered HyperPod label the node carries.
    pub fn hyper_pod_label(&self) -> Option<HyperPodLabel> {
        let node = self.node.as_deref()?;
        HyperPodLabel::ALL
            .into_iter()
            .find(|label| node.labels.contains_key(label.key()))
    }

    pub fn is_hyper_pod_node(&self) -> bool {
        self.hyper_pod_label().is_some()
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.node.as_deref()?.instance_id()
    }

    pub fn instance_type(&self) -> Option<&str> {
        self.node.as_deref()?.instance_type()
    }

    fn raw_capacity(&self, resource: &str) -> Option<CapacityValue> {
        self.node.as_deref()?.capacity.get(resource).cloned()
    }

    fn coerce(&self, field: &str, value: CapacityValue) -> Option<u64> {
        let metric = value.to_metric();
        if metric.is_none() {
            debug!(
                node_name = %self.node_name,
                field,
                value = ?value,
                "Capacity value is not a non-negative integer"
            );
        }
        metric
    }
}
