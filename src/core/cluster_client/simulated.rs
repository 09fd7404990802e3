//! Cluster client backed by in-memory storage instead of a running cluster.
//! It plays the role of api server together with etcd for tests and workload replays.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::debug;

use crate::core::binding::Binding;
use crate::core::cluster_client::interface::{ClientError, ClusterClient};
use crate::core::node::Node;
use crate::core::pod::{Pod, PodPhase};

#[derive(Default)]
pub struct StorageData {
    // State about current nodes of a cluster: <Node name, Node>
    pub nodes: BTreeMap<String, Node>,
    // State about current pods of a cluster: <"namespace/name", Pod>
    pub pods: BTreeMap<String, Pod>,
}

#[derive(Default)]
pub struct SimulatedClusterClient {
    storage_data: RwLock<StorageData>,
}

fn pod_key(namespace: &str, name: &str) -> String {
    let namespace = if namespace.is_empty() {
        "default"
    } else {
        namespace
    };
    format!("{}/{}", namespace, name)
}

impl SimulatedClusterClient {
    pub fn new() -> Self {
        Default::default()
    }

    fn data(&self) -> RwLockReadGuard<'_, StorageData> {
        self.storage_data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn data_mut(&self) -> RwLockWriteGuard<'_, StorageData> {
        self.storage_data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_node(&self, node: Node) {
        self.data_mut()
            .nodes
            .insert(node.metadata.name.clone(), node);
    }

    pub fn add_pod(&self, pod: Pod) {
        self.data_mut().pods.insert(pod.metadata.key(), pod);
    }

    pub fn get_node(&self, node_name: &str) -> Option<Node> {
        self.data().nodes.get(node_name).cloned()
    }

    // Nodes ordered by name.
    pub fn list_nodes(&self) -> Vec<Node> {
        self.data().nodes.values().cloned().collect()
    }

    pub fn list_pods(&self) -> Vec<Pod> {
        self.data().pods.values().cloned().collect()
    }

    // Pods which are not assigned to any node yet.
    pub fn pending_pods(&self) -> Vec<Pod> {
        self.data()
            .pods
            .values()
            .filter(|pod| !pod.is_assigned())
            .cloned()
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.data().nodes.len()
    }

    pub fn pod_count(&self) -> usize {
        self.data().pods.len()
    }
}

impl ClusterClient for SimulatedClusterClient {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError> {
        let key = pod_key(namespace, name);
        self.data()
            .pods
            .get(&key)
            .cloned()
            .ok_or(ClientError::PodNotFound { key })
    }

    fn update_pod(&self, pod: &Pod) -> Result<Pod, ClientError> {
        let key = pod.metadata.key();
        let mut data = self.data_mut();
        match data.pods.get_mut(&key) {
            Some(stored) => {
                *stored = pod.clone();
                debug!("Updated pod {:?}: {:?}", key, stored.status);
                Ok(stored.clone())
            }
            None => Err(ClientError::PodNotFound { key }),
        }
    }

    fn create_binding(&self, binding: &Binding) -> Result<(), ClientError> {
        let key = pod_key(&binding.metadata.namespace, &binding.metadata.name);
        let mut data = self.data_mut();
        let pod = data
            .pods
            .get_mut(&key)
            .ok_or_else(|| ClientError::PodNotFound { key: key.clone() })?;
        if pod.is_assigned() {
            return Err(ClientError::AlreadyBound {
                key,
                node: pod.spec.node_name.clone(),
            });
        }
        pod.spec.node_name = binding.target.name.clone();
        pod.status.phase = Some(PodPhase::Running);
        Ok(())
    }
}
