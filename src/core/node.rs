//! Type definitions for node specification and state passed to the external scorer.

use serde::{Deserialize, Serialize};

use crate::core::common::{ObjectMeta, ResourceList};

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unschedulable: bool,
}

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeStatus {
    // Total amount of resources
    #[serde(default)]
    pub capacity: ResourceList,
    // How much resources are available for pods, defaults to capacity when empty.
    #[serde(default)]
    pub allocatable: ResourceList,
}

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Node {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpec,
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    pub fn new(name: &str, cpu: &str, memory: &str) -> Self {
        let capacity = ResourceList::from([
            ("cpu".to_string(), cpu.to_string()),
            ("memory".to_string(), memory.to_string()),
        ]);
        Self {
            metadata: ObjectMeta::named(name),
            spec: Default::default(),
            status: NodeStatus {
                allocatable: capacity.clone(),
                capacity,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}
