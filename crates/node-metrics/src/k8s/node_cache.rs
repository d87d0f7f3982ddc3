//! Node information cache with watch capabilities
//!
//! This component maintains an in-memory cache of node snapshots, populated by
//! watching Kubernetes node events. Lookups are served from the cache only: a node
//! that has not been observed yet is reported as not found.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use error_stack::Report;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Node;
use kube::runtime::watcher::watcher;
use kube::runtime::watcher::Config;
use kube::runtime::watcher::Event;
use kube::Api;
use kube::Client;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::k8s::KubernetesError;
use crate::nodeinfo::CapacityValue;
use crate::nodeinfo::NodeCondition;
use crate::nodeinfo::NodeProvider;
use crate::nodeinfo::NodeSnapshot;

const WATCH_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Narrows which nodes are watched.
#[derive(Debug, Clone, Default)]
pub struct NodeWatchConfig {
    /// Watch a single node, e.g. the host this process runs on.
    pub node_name: Option<String>,
    pub label_selector: Option<String>,
}

impl NodeWatchConfig {
    fn watcher_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(node_name) = &self.node_name {
            config = config.fields(&format!("metadata.name={node_name}"));
        }
        if let Some(selector) = &self.label_selector {
            config = config.labels(selector);
        }
        config
    }
}

/// Node cache that watches Kubernetes nodes and maintains local state
pub struct NodeInfoCache {
    config: NodeWatchConfig,
    /// Cached node snapshots keyed by node name
    cache: Arc<RwLock<HashMap<String, Arc<NodeSnapshot>>>>,
    client: Client,
}

impl NodeInfoCache {
    pub fn new(client: Client, config: NodeWatchConfig) -> Self {
        Self {
            config,
            cache: Arc::new(RwLock::new(HashMap::new())),
            client,
        }
    }

    /// Start watching nodes and maintaining the cache
    ///
    /// Restarts the watch when the stream ends, and after a delay when it fails.
    #[tracing::instrument(skip(self, cancellation_token), fields(node_name = ?self.config.node_name))]
    pub async fn run(
        &self,
        cancellation_token: CancellationToken,
    ) -> Result<(), Report<KubernetesError>> {
        info!("Starting node info cache");

        loop {
            select! {
                _ = cancellation_token.cancelled() => {
                    info!("Node info cache shutdown requested");
                    break;
                }
                result = self.watch_and_cache_nodes() => {
                    match result {
                        Ok(()) => {
                            warn!("Node watch stream ended unexpectedly, restarting...");
                        }
                        Err(e) => {
                            error!("Node watch failed: {e:?}");
                            select! {
                                _ = cancellation_token.cancelled() => break,
                                _ = tokio::time::sleep(WATCH_RETRY_DELAY) => {}
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of nodes currently cached
    pub fn len(&self) -> usize {
        self.cache.read().expect("poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn watch_and_cache_nodes(&self) -> Result<(), Report<KubernetesError>> {
        let api: Api<Node> = Api::all(self.client.clone());

        let mut stream = watcher(api, self.config.watcher_config()).boxed();

        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => self.handle_node_event(event),
                Err(e) => {
                    return Err(Report::new(KubernetesError::WatchFailed {
                        message: format!("Watch stream error: {e}"),
                    }));
                }
            }
        }

        Ok(())
    }

    /// Apply a watch event to the cache
    fn handle_node_event(&self, event: Event<Node>) {
        let mut cache = self.cache.write().expect("poisoned");
        apply_node_event(&mut cache, event);
    }
}

fn apply_node_event(cache: &mut HashMap<String, Arc<NodeSnapshot>>, event: Event<Node>) {
    match event {
        Event::Applied(node) => {
            let Some(snapshot) = transform_node_to_snapshot(&node) else {
                debug!("Skipping node without a name");
                return;
            };
            debug!(node_name = %snapshot.name, "Cached node");
            cache.insert(snapshot.name.clone(), Arc::new(snapshot));
        }
        Event::Deleted(node) => {
            if let Some(name) = node.metadata.name.as_deref() {
                debug!(node_name = %name, "Removed node from cache");
                cache.remove(name);
            }
        }
        Event::Restarted(nodes) => {
            cache.clear();
            for snapshot in nodes.iter().filter_map(transform_node_to_snapshot) {
                cache.insert(snapshot.name.clone(), Arc::new(snapshot));
            }
            info!(nodes = cache.len(), "Node cache resynchronized");
        }
    }
}

impl NodeProvider for NodeInfoCache {
    fn get_node(&self, node_name: &str) -> Option<Arc<NodeSnapshot>> {
        self.cache.read().expect("poisoned").get(node_name).cloned()
    }

    fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.cache.read().expect("poisoned").keys().cloned().collect();
        names.sort();
        names
    }
}

/// Convert a Kubernetes `Node` into the snapshot the metrics store reads.
///
/// Returns `None` for nodes without a name, since they cannot be cached.
pub fn transform_node_to_snapshot(node: &Node) -> Option<NodeSnapshot> {
    let name = node.metadata.name.clone()?;
    let labels = node.metadata.labels.clone().unwrap_or_default();
    let provider_id = node.spec.as_ref().and_then(|spec| spec.provider_id.clone());

    let mut snapshot = NodeSnapshot {
        name,
        labels,
        provider_id,
        ..Default::default()
    };

    if let Some(status) = &node.status {
        if let Some(capacity) = &status.capacity {
            snapshot.capacity = capacity
                .iter()
                .map(|(resource, quantity)| (resource.clone(), CapacityValue::from(quantity)))
                .collect();
        }
        if let Some(allocatable) = &status.allocatable {
            snapshot.allocatable = allocatable
                .iter()
                .map(|(resource, quantity)| (resource.clone(), CapacityValue::from(quantity)))
                .collect();
        }
        if let Some(conditions) = &status.conditions {
            snapshot.conditions = conditions
                .iter()
                .map(|condition| NodeCondition {
                    type_: condition.type_.clone(),
                    status: condition.status.clone(),
                })
                .collect();
        }
    }

    Some(snapshot)
}
