//! Node metrics extraction.
//!
//! The main components are:
//! - [`NodeProvider`]: supplies node snapshots, see [`crate::k8s::NodeInfoCache`]
//!   for the cluster-backed implementation
//! - [`NodeInfo`]: per-node store deriving capacity, condition and HyperPod
//!   health metrics from one snapshot
//! - [`CapacityValue`]: raw capacity measurements and their coercion

pub mod capacity;
pub mod hyperpod;
pub mod provider;
pub mod snapshot;
pub mod store;

pub use capacity::CapacityValue;
pub use hyperpod::HyperPodLabel;
pub use provider::InMemoryNodeProvider;
pub use provider::NodeProvider;
pub use snapshot::NodeCondition;
pub use snapshot::NodeSnapshot;
pub use store::NodeInfo;
