use std::collections::BTreeMap;

use super::capacity::CapacityValue;

/// Label carrying the cloud instance type.
pub const INSTANCE_TYPE_LABEL: &str = "node.kubernetes.io/instance-type";
/// Pre-1.17 spelling of [`INSTANCE_TYPE_LABEL`].
pub const LEGACY_INSTANCE_TYPE_LABEL: &str = "beta.kubernetes.io/instance-type";

/// One entry of a node's `status.conditions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCondition {
    pub type_: String,
    pub status: String,
}

/// The provider's view of a single node at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSnapshot {
    pub name: String,
    pub capacity: BTreeMap<String, CapacityValue>,
    pub allocatable: BTreeMap<String, CapacityValue>,
    pub conditions: Vec<NodeCondition>,
    pub labels: BTreeMap<String, String>,
    pub provider_id: Option<String>,
}

impl NodeSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, resource: &str, value: impl Into<CapacityValue>) -> Self {
        self.capacity.insert(resource.to_string(), value.into());
        self
    }

    pub fn with_allocatable(mut self, resource: &str, value: impl Into<CapacityValue>) -> Self {
        self.allocatable.insert(resource.to_string(), value.into());
        self
    }

    pub fn with_condition(mut self, type_: &str, status: &str) -> Self {
        self.conditions.push(NodeCondition {
            type_: type_.to_string(),
            status: status.to_string(),
        });
        self
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_provider_id(mut self, provider_id: &str) -> Self {
        self.provider_id = Some(provider_id.to_string());
        self
    }

    /// Finds the condition of the given type. Nodes carry at most one per type.
    pub fn condition(&self, type_: &str) -> Option<&NodeCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    pub fn instance_type(&self) -> Option<&str> {
        self.labels
            .get(INSTANCE_TYPE_LABEL)
            .or_else(|| self.labels.get(LEGACY_INSTANCE_TYPE_LABEL))
            .map(String::as_str)
    }

    /// EC2 instance id parsed from a provider id of the form
    /// `aws:///<availability-zone>/<instance-id>`.
    pub fn instance_id(&self) -> Option<&str> {
        parse_instance_id(self.provider_id.as_deref()?)
    }
}

fn parse_instance_id(provider_id: &str) -> Option<&str> {
    if !provider_id.starts_with("aws://") {
        return None;
    }
    provider_id
        .rsplit_once('/')
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
}
