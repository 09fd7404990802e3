//! Config fields definitions for the rl scheduler plugin and the replay driver.

use std::time::Duration;

use serde::Deserialize;

use crate::core::node::Node;
use crate::core::pod::Pod;

/// Environment variable which overrides the default scorer endpoint.
pub const ENDPOINT_ENV_VAR: &str = "RL_SCHEDULER_ENDPOINT";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/score";

/// Arguments of the rl scheduler plugin given in scheduler profile.
#[derive(Clone, Default, Debug, Deserialize, PartialEq)]
pub struct RlSchedulerArgs {
    // Takes precedence over RL_SCHEDULER_ENDPOINT
    pub endpoint: Option<String>,
    pub request_timeout: Option<f64>, // in seconds
}

impl RlSchedulerArgs {
    /// Parses plugin args, null value means default args.
    pub fn from_value(value: &serde_yaml::Value) -> Result<Self, serde_yaml::Error> {
        if value.is_null() {
            return Ok(Default::default());
        }
        serde_yaml::from_value(value.clone())
    }

    pub fn resolve_endpoint(&self) -> String {
        self.resolve_endpoint_from(std::env::var(ENDPOINT_ENV_VAR).ok())
    }

    // Explicit arg, then non-empty env value, then default.
    fn resolve_endpoint_from(&self, env_endpoint: Option<String>) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.clone();
        }
        match env_endpoint {
            Some(endpoint) if !endpoint.is_empty() => endpoint,
            _ => DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

/// Cluster and workload replayed with the rl scheduler against an in-memory cluster.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ReplayConfig {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default)]
    pub plugin_args: serde_yaml::Value,
    pub cycle_timeout: Option<f64>, // in seconds
}

impl ReplayConfig {
    pub fn cycle_timeout(&self) -> Option<Duration> {
        self.cycle_timeout
            .filter(|secs| *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}
