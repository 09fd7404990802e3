//! Type definition for Pod primitive in k8s cluster.
//! Serialized in the same json shape as kubernetes api objects, because the external scorer reads it.

use serde::{Deserialize, Serialize};

use crate::core::common::{ObjectMeta, ResourceList};

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub limits: ResourceList,
    #[serde(default, skip_serializing_if = "ResourceList::is_empty")]
    pub requests: ResourceList,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Container {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub resources: ResourceRequirements,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    // Name of the node the pod is bound to, empty while pod is pending.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub node_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scheduler_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PodStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PodPhase>,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

impl Pod {
    /// Pending pod with a single container requesting `cpu` and `memory` quantities.
    pub fn new(namespace: &str, name: &str, uid: &str, cpu: &str, memory: &str) -> Self {
        let requests = ResourceList::from([
            ("cpu".to_string(), cpu.to_string()),
            ("memory".to_string(), memory.to_string()),
        ]);
        Self {
            metadata: ObjectMeta {
                name: name.to_string(),
                namespace: namespace.to_string(),
                uid: uid.to_string(),
                labels: Default::default(),
            },
            spec: PodSpec {
                containers: vec![Container {
                    name: name.to_string(),
                    resources: ResourceRequirements {
                        limits: requests.clone(),
                        requests,
                    },
                }],
                ..Default::default()
            },
            status: PodStatus {
                phase: Some(PodPhase::Pending),
            },
        }
    }

    pub fn is_assigned(&self) -> bool {
        !self.spec.node_name.is_empty()
    }
}
