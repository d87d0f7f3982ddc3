use std::sync::Arc;

use api_types::HyperPodConditionType;
use api_types::NodeConditionType;
use node_metrics::metrics::collect_node_metrics;
use node_metrics::nodeinfo::CapacityValue;
use node_metrics::nodeinfo::HyperPodLabel;
use node_metrics::nodeinfo::InMemoryNodeProvider;
use node_metrics::nodeinfo::NodeInfo;
use node_metrics::nodeinfo::NodeProvider;
use node_metrics::nodeinfo::NodeSnapshot;
use similar_asserts::assert_eq;
use test_log::test;

const HEALTH_LABEL: &str = "sagemaker.amazonaws.com/node-health-status";

fn cluster() -> Arc<InMemoryNodeProvider> {
    Arc::new(InMemoryNodeProvider::with_nodes([
        NodeSnapshot::new("ready-node")
            .with_capacity("cpu", 8i64)
            .with_capacity("memory", 32_000_000_000i64)
            .with_capacity("pods", 58i64)
            .with_allocatable("pods", 50i64)
            .with_condition("Ready", "True"),
        NodeSnapshot::new("silent-node").with_condition("KernelDeadlock", "False"),
        NodeSnapshot::new("hyperpod-ok").with_label(HEALTH_LABEL, "Schedulable"),
        NodeSnapshot::new("hyperpod-odd").with_label(HEALTH_LABEL, "Rebooting"),
    ]))
}

#[test]
fn capacity_roundtrips_every_integer_width() {
    let provider = cluster();
    let mut info = NodeInfo::new("ready-node", &*provider);

    let values: Vec<(CapacityValue, u64)> = vec![
        (i8::MAX.into(), 127),
        (i16::MAX.into(), 32767),
        (i32::MAX.into(), 2147483647),
        (i64::MAX.into(), i64::MAX as u64),
        (42isize.into(), 42),
        (u8::MAX.into(), 255),
        (u16::MAX.into(), 65535),
        (u32::MAX.into(), 4294967295),
        (u64::MAX.into(), u64::MAX),
        (7usize.into(), 7),
    ];

    for (value, expected) in values {
        info.set_cpu_capacity(value.clone());
        assert_eq!(info.cpu_capacity(), Some(expected), "cpu from {value:?}");
        info.set_mem_capacity(value.clone());
        assert_eq!(info.mem_capacity(), Some(expected), "memory from {value:?}");
    }
}

#[test]
fn negative_and_non_numeric_capacity_read_as_zero() {
    let provider = cluster();
    let mut info = NodeInfo::new("ready-node", &*provider);

    let rejected: Vec<CapacityValue> = vec![
        (-1i8).into(),
        (-1i16).into(),
        (-1i32).into(),
        i64::MIN.into(),
        (-3isize).into(),
        "16Gi".into(),
        2.5f64.into(),
    ];

    for value in rejected {
        info.set_cpu_capacity(value.clone());
        assert_eq!(info.cpu_capacity().unwrap_or(0), 0, "cpu from {value:?}");
        assert_eq!(info.cpu_capacity(), None);
        info.set_mem_capacity(value.clone());
        assert_eq!(info.mem_capacity().unwrap_or(0), 0, "memory from {value:?}");
        assert_eq!(info.mem_capacity(), None);
    }
}

#[test]
fn unknown_node_is_invalid_everywhere() {
    let provider = cluster();
    let info = NodeInfo::new("no-such-node", &*provider);

    assert!(!info.exists());
    assert_eq!(info.cpu_capacity(), None);
    assert_eq!(info.mem_capacity(), None);
    assert_eq!(info.node_status_capacity_pods(), None);
    assert_eq!(info.node_status_allocatable_pods(), None);
    for condition_type in NodeConditionType::ALL {
        assert_eq!(info.node_status_condition(condition_type), None);
    }
    assert_eq!(info.node_condition_unknown(), None);
    assert_eq!(info.label_value_unknown(HEALTH_LABEL), None);
    for state in HyperPodConditionType::NAMED {
        assert_eq!(info.label_value(state, HEALTH_LABEL), None);
    }
    assert!(!info.is_hyper_pod_node());
    assert_eq!(collect_node_metrics(&info, None), None);
}

#[test]
fn ready_node_conditions() {
    let provider = cluster();
    let info = NodeInfo::new("ready-node", &*provider);

    assert_eq!(info.cpu_capacity(), Some(8));
    assert_eq!(info.mem_capacity(), Some(32_000_000_000));
    assert_eq!(info.node_status_capacity_pods(), Some(58));
    assert_eq!(info.node_status_allocatable_pods(), Some(50));

    assert_eq!(info.node_status_condition(NodeConditionType::Ready), Some(1));
    assert_eq!(info.node_status_condition(NodeConditionType::DiskPressure), None);
    assert_eq!(info.node_condition_unknown(), Some(0));
}

#[test]
fn node_without_recognized_conditions_is_unknown() {
    let provider = cluster();
    let info = NodeInfo::new("silent-node", &*provider);

    for condition_type in NodeConditionType::ALL {
        assert_eq!(info.node_status_condition(condition_type), None);
    }
    assert_eq!(info.node_condition_unknown(), Some(1));
}

#[test]
fn hyper_pod_label_unknown_indicator() {
    let provider = cluster();

    let ok = NodeInfo::new("hyperpod-ok", &*provider);
    assert!(ok.is_hyper_pod_node());
    assert_eq!(ok.label_value_unknown(HEALTH_LABEL), Some(0));
    assert_eq!(
        ok.label_value(HyperPodConditionType::Schedulable, HEALTH_LABEL),
        Some(1)
    );
    assert_eq!(
        ok.label_value(HyperPodConditionType::Unschedulable, HEALTH_LABEL),
        Some(0)
    );

    let odd = NodeInfo::new("hyperpod-odd", &*provider);
    assert_eq!(odd.label_value_unknown(HEALTH_LABEL), Some(1));
    for state in HyperPodConditionType::NAMED {
        assert_eq!(odd.label_value(state, HEALTH_LABEL), Some(0));
    }
    assert_eq!(
        odd.label_value(HyperPodConditionType::Unknown, HEALTH_LABEL),
        Some(1)
    );
}

#[test]
fn unregistered_label_key_is_always_invalid() {
    let provider = cluster();
    let key = "example.com/health";
    assert_eq!(HyperPodLabel::from_key(key), None);

    for node_name in ["hyperpod-ok", "hyperpod-odd", "ready-node", "no-such-node"] {
        let info = NodeInfo::new(node_name, &*provider);
        for state in HyperPodConditionType::NAMED {
            assert_eq!(info.label_value(state, key), None, "{node_name}");
        }
    }

    provider.insert(NodeSnapshot::new("custom").with_label(key, "Schedulable"));
    let info = NodeInfo::new("custom", &*provider);
    assert_eq!(info.label_value(HyperPodConditionType::Schedulable, key), None);
    assert_eq!(info.label_value_unknown(key), None);
}

#[test]
fn node_without_hyper_pod_label() {
    let provider = cluster();
    let info = NodeInfo::new("ready-node", &*provider);

    assert!(!info.is_hyper_pod_node());
    assert_eq!(info.hyper_pod_label(), None);

    let metrics = collect_node_metrics(&info, Some("prod")).expect("node exists");
    assert!(!metrics
        .fields
        .keys()
        .any(|name| name.starts_with("hyper_pod_")));
}

#[test]
fn store_sees_provider_updates_on_next_cycle() {
    let provider = cluster();
    let before = NodeInfo::new("ready-node", &*provider);

    provider.insert(
        NodeSnapshot::new("ready-node")
            .with_capacity("cpu", 16i64)
            .with_condition("Ready", "False"),
    );
    let after = NodeInfo::new("ready-node", &*provider);

    assert_eq!(before.cpu_capacity(), Some(8));
    assert_eq!(after.cpu_capacity(), Some(16));
    assert_eq!(after.node_status_condition(NodeConditionType::Ready), Some(0));

    provider.remove("ready-node");
    assert!(provider.get_node("ready-node").is_none());
    assert!(!NodeInfo::new("ready-node", &*provider).exists());
}
