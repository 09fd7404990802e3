//! Binding object which ties a pod to a node, submitted to the api server's `binding` subresource.

use serde::{Deserialize, Serialize};

use crate::core::common::{ObjectMeta, ObjectReference};
use crate::core::pod::Pod;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub target: ObjectReference,
}

impl Binding {
    pub fn new(pod: &Pod, node_name: &str) -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Binding".to_string(),
            metadata: ObjectMeta {
                name: pod.metadata.name.clone(),
                namespace: pod.metadata.namespace.clone(),
                uid: pod.metadata.uid.clone(),
                labels: Default::default(),
            },
            target: ObjectReference {
                api_version: "v1".to_string(),
                kind: "Node".to_string(),
                name: node_name.to_string(),
            },
        }
    }
}
