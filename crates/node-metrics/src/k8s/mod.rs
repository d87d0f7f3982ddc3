//! Kubernetes integration module.
//!
//! This module keeps an in-memory view of the cluster's nodes by watching the
//! Kubernetes API, and converts `Node` objects into [`NodeSnapshot`]s.
//!
//! [`NodeSnapshot`]: crate::nodeinfo::NodeSnapshot

use thiserror::Error;

pub mod kube_client;
pub mod node_cache;
pub mod quantity;

pub use node_cache::NodeInfoCache;
pub use node_cache::NodeWatchConfig;

/// Errors that can occur during Kubernetes operations.
#[derive(Debug, Error)]
pub enum KubernetesError {
    #[error("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[error("Failed to watch nodes: {message}")]
    WatchFailed { message: String },
}
