//! Shared API type definitions
//!
//! This crate contains the vocabulary shared between the node metrics store and
//! its consumers: the native node condition types and the HyperPod health states
//! reported through node labels.

use serde::Deserialize;
use serde::Serialize;

/// Node condition types reported natively by the kubelet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeConditionType {
    Ready,
    DiskPressure,
    MemoryPressure,
    #[serde(rename = "PIDPressure")]
    PidPressure,
    NetworkUnavailable,
}

impl NodeConditionType {
    /// Every condition type, in emission order.
    pub const ALL: [NodeConditionType; 5] = [
        NodeConditionType::Ready,
        NodeConditionType::DiskPressure,
        NodeConditionType::MemoryPressure,
        NodeConditionType::PidPressure,
        NodeConditionType::NetworkUnavailable,
    ];

    /// The `type` string used in `NodeStatus.conditions`.
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeConditionType::Ready => "Ready",
            NodeConditionType::DiskPressure => "DiskPressure",
            NodeConditionType::MemoryPressure => "MemoryPressure",
            NodeConditionType::PidPressure => "PIDPressure",
            NodeConditionType::NetworkUnavailable => "NetworkUnavailable",
        }
    }

    /// Looks up a condition type by its exact `type` string.
    pub fn from_type(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ct| ct.as_str() == value)
    }

    /// Snake-case suffix used in metric names, e.g. `disk_pressure`.
    pub const fn metric_suffix(self) -> &'static str {
        match self {
            NodeConditionType::Ready => "ready",
            NodeConditionType::DiskPressure => "disk_pressure",
            NodeConditionType::MemoryPressure => "memory_pressure",
            NodeConditionType::PidPressure => "pid_pressure",
            NodeConditionType::NetworkUnavailable => "network_unavailable",
        }
    }
}

impl std::fmt::Display for NodeConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health state published by HyperPod nodes through a node label.
///
/// `Unknown` is the catch-all for any label value outside the table below; it is
/// never looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HyperPodConditionType {
    Schedulable,
    SchedulablePreferred,
    UnschedulablePendingReplacement,
    UnschedulablePendingReboot,
    Unschedulable,
    Unknown,
}

const HYPER_POD_CONDITION_TABLE: [(&str, HyperPodConditionType); 5] = [
    ("Schedulable", HyperPodConditionType::Schedulable),
    (
        "SchedulablePreferred",
        HyperPodConditionType::SchedulablePreferred,
    ),
    (
        "UnschedulablePendingReplacement",
        HyperPodConditionType::UnschedulablePendingReplacement,
    ),
    (
        "UnschedulablePendingReboot",
        HyperPodConditionType::UnschedulablePendingReboot,
    ),
    ("Unschedulable", HyperPodConditionType::Unschedulable),
];

impl HyperPodConditionType {
    /// The named states, i.e. everything except `Unknown`.
    pub const NAMED: [HyperPodConditionType; 5] = [
        HyperPodConditionType::Schedulable,
        HyperPodConditionType::SchedulablePreferred,
        HyperPodConditionType::UnschedulablePendingReplacement,
        HyperPodConditionType::UnschedulablePendingReboot,
        HyperPodConditionType::Unschedulable,
    ];

    /// Exact lookup against the label value table.
    pub fn lookup(value: &str) -> Option<Self> {
        HYPER_POD_CONDITION_TABLE
            .iter()
            .find(|(name, _)| *name == value)
            .map(|(_, ct)| *ct)
    }

    /// Total parse: anything outside the table is `Unknown`.
    pub fn parse(value: &str) -> Self {
        Self::lookup(value).unwrap_or(HyperPodConditionType::Unknown)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HyperPodConditionType::Schedulable => "Schedulable",
            HyperPodConditionType::SchedulablePreferred => "SchedulablePreferred",
            HyperPodConditionType::UnschedulablePendingReplacement => {
                "UnschedulablePendingReplacement"
            }
            HyperPodConditionType::UnschedulablePendingReboot => "UnschedulablePendingReboot",
            HyperPodConditionType::Unschedulable => "Unschedulable",
            HyperPodConditionType::Unknown => "Unknown",
        }
    }

    /// Snake-case suffix used in metric names.
    pub const fn metric_suffix(self) -> &'static str {
        match self {
            HyperPodConditionType::Schedulable => "schedulable",
            HyperPodConditionType::SchedulablePreferred => "schedulable_preferred",
            HyperPodConditionType::UnschedulablePendingReplacement => {
                "unschedulable_pending_replacement"
            }
            HyperPodConditionType::UnschedulablePendingReboot => "unschedulable_pending_reboot",
            HyperPodConditionType::Unschedulable => "unschedulable",
            HyperPodConditionType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HyperPodConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
