pub mod config;
pub mod k8s;
pub mod logging;
pub mod metrics;
pub mod nodeinfo;
