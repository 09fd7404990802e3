use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resource name (`cpu`, `memory`, ...) to quantity string (`500m`, `2Gi`, ...).
/// Quantities are kept as strings, the external scorer parses them itself.
pub type ResourceList = BTreeMap<String, String>;

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    // Namespaced key in form of "<namespace>/<name>", empty namespace is treated as "default".
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace_or_default(), self.name)
    }

    pub fn namespace_or_default(&self) -> &str {
        if self.namespace.is_empty() {
            "default"
        } else {
            &self.namespace
        }
    }
}

/// Reference to another object, used as a binding target.
#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    pub kind: String,
    pub name: String,
}
