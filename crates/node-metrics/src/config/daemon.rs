use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::k8s::NodeWatchConfig;
use crate::metrics::MetricsConfig;

#[derive(Parser, Clone, Debug)]
pub struct DaemonArgs {
    #[arg(
        long,
        env = "METRICS_FILE",
        value_hint = clap::ValueHint::FilePath,
        default_value = "/logs/node-metrics.log",
        help = "Path for printing node metrics, e.g. /logs/node-metrics.log"
    )]
    pub metrics_file: PathBuf,

    #[arg(
        long,
        default_value = "influx",
        value_parser = ["influx", "json"],
        help = "Encoding of metric lines"
    )]
    pub metrics_format: String,

    #[arg(
        long,
        default_value = "60",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Seconds between two collections of node metrics"
    )]
    pub collection_interval_secs: u64,

    #[arg(
        long,
        env = "NODE_NAME",
        help = "Only watch this node, e.g. the node this daemon runs on (empty for all nodes)"
    )]
    pub node_name: Option<String>,

    #[arg(long, help = "Label selector narrowing the watched nodes, e.g. role=worker")]
    pub node_label_selector: Option<String>,

    #[arg(
        long,
        env = "CLUSTER_NAME",
        help = "Cluster name attached to every metric line"
    )]
    pub cluster_name: Option<String>,

    #[arg(
        long,
        env = "KUBECONFIG",
        value_hint = clap::ValueHint::FilePath,
        help = "Path to kubeconfig file (defaults to cluster config or ~/.kube/config)"
    )]
    pub kubeconfig: Option<PathBuf>,
}

impl DaemonArgs {
    pub fn watch_config(&self) -> NodeWatchConfig {
        NodeWatchConfig {
            node_name: self.node_name.clone().filter(|name| !name.is_empty()),
            label_selector: self
                .node_label_selector
                .clone()
                .filter(|selector| !selector.is_empty()),
        }
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            interval: Duration::from_secs(self.collection_interval_secs),
            format: self.metrics_format.clone(),
            cluster_name: self.cluster_name.clone(),
        }
    }
}
