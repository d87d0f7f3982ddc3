//! HyperPod node labels.
//!
//! HyperPod nodes report their health through a label rather than through native
//! node conditions. Only the keys registered here are ever interpreted.

/// A registered HyperPod health label key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HyperPodLabel {
    #[display("sagemaker.amazonaws.com/node-health-status")]
    NodeHealthStatus,
    /// Short alias of [`HyperPodLabel::NodeHealthStatus`].
    #[display("n")]
    NodeHealthStatusShort,
}

impl HyperPodLabel {
    pub const ALL: [HyperPodLabel; 2] = [
        HyperPodLabel::NodeHealthStatus,
        HyperPodLabel::NodeHealthStatusShort,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            HyperPodLabel::NodeHealthStatus => "sagemaker.amazonaws.com/node-health-status",
            HyperPodLabel::NodeHealthStatusShort => "n",
        }
    }

    /// Returns the registered label for `key`, if any.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.key() == key)
    }
}
