use downcast_rs::{impl_downcast, DowncastSync};

use crate::core::binding::Binding;
use crate::core::pod::Pod;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("pod {key} not found")]
    PodNotFound { key: String },
    #[error("pod {key} is already bound to node {node}")]
    AlreadyBound { key: String, node: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Access to cluster objects given to plugins by the host framework.
///
/// Two implementations exist: `LiveClusterClient` talks to a running api server and
/// `SimulatedClusterClient` keeps objects in memory. Code which behaves differently for them
/// downcasts the handle to the concrete type.
pub trait ClusterClient: DowncastSync {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError>;

    // Replaces the stored pod with the same namespace and name, returns the stored object.
    fn update_pod(&self, pod: &Pod) -> Result<Pod, ClientError>;

    fn create_binding(&self, binding: &Binding) -> Result<(), ClientError>;
}

impl_downcast!(sync ClusterClient);
