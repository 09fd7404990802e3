//! Scheduling framework which runs plugins of one profile through a scheduling cycle of a pod.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::core::cluster_client::interface::ClusterClient;
use crate::core::node::Node;
use crate::core::pod::Pod;
use crate::core::scheduler::context::CycleContext;
use crate::core::scheduler::cycle_state::CycleState;
use crate::core::scheduler::interface::{
    BindPlugin, NodeScore, PreScorePlugin, ScorePlugin, Status,
};
use crate::core::scheduler::plugin::{PluginSet, PLUGIN_REGISTRY};
use crate::core::scheduler::rl_score::RL_SCHEDULER_SCORE_PLUGIN_NAME;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("no nodes available to schedule pods")]
    NoNodes,
    #[error("prescore failed: {0}")]
    PreScore(Status),
    #[error("scoring node {node} failed: {status}")]
    Score { node: String, status: Status },
    #[error("normalizing scores failed: {0}")]
    Normalize(Status),
    #[error("bind failed: {0}")]
    Bind(Status),
    #[error("no bind plugin handled the pod")]
    NoBinder,
    #[error("plugin {0:?} is not registered")]
    UnknownPlugin(String),
    #[error("plugin {name:?} does not implement {extension_point} extension point")]
    WrongExtensionPoint {
        name: String,
        extension_point: &'static str,
    },
    #[error("failed to initialize plugin {name:?}: {status}")]
    PluginInit { name: String, status: Status },
}

pub struct KubeSchedulerConfig {
    pub scheduler_name: String,
    pub plugins: Plugins,
}

pub struct Plugins {
    // Each extension point is a list of enabled plugins which are registered globally in plugin registry.
    pub pre_score: Vec<Plugin>,
    pub score: Vec<Plugin>,
    pub bind: Vec<Plugin>,
}

// Plugin specifies a plugin name, its args and weight when applicable.
pub struct Plugin {
    pub name: String,
    // Weight is used only for Score plugins.
    pub weight: Option<i64>,
    pub args: serde_yaml::Value,
}

impl Plugin {
    fn new(name: &str, weight: Option<i64>, args: &serde_yaml::Value) -> Self {
        Self {
            name: name.to_string(),
            weight,
            args: args.clone(),
        }
    }
}

/// Profile with rl scheduler plugin enabled at prescore, score and bind.
pub fn default_kube_scheduler_config(rl_args: serde_yaml::Value) -> KubeSchedulerConfig {
    KubeSchedulerConfig {
        scheduler_name: "rl_scheduler".to_string(),
        plugins: Plugins {
            pre_score: vec![Plugin::new(RL_SCHEDULER_SCORE_PLUGIN_NAME, None, &rl_args)],
            score: vec![Plugin::new(RL_SCHEDULER_SCORE_PLUGIN_NAME, Some(1), &rl_args)],
            bind: vec![Plugin::new(RL_SCHEDULER_SCORE_PLUGIN_NAME, None, &rl_args)],
        },
    }
}

pub struct KubeScheduler {
    scheduler_name: String,
    pre_score: Vec<Arc<dyn PreScorePlugin>>,
    score: Vec<(Arc<dyn ScorePlugin>, i64)>,
    bind: Vec<Arc<dyn BindPlugin>>,
}

impl KubeScheduler {
    /// Instantiates every plugin of the profile once, even if it is enabled at several extension points.
    pub fn new(
        config: KubeSchedulerConfig,
        handle: Arc<dyn ClusterClient>,
    ) -> Result<Self, ScheduleError> {
        let mut instances: HashMap<String, PluginSet> = Default::default();
        let mut instance = |plugin: &Plugin| -> Result<PluginSet, ScheduleError> {
            if let Some(set) = instances.get(&plugin.name) {
                return Ok(set.clone());
            }
            let factory = PLUGIN_REGISTRY
                .get(plugin.name.as_str())
                .ok_or_else(|| ScheduleError::UnknownPlugin(plugin.name.clone()))?;
            let set = factory(&plugin.args, handle.clone()).map_err(|status| {
                ScheduleError::PluginInit {
                    name: plugin.name.clone(),
                    status,
                }
            })?;
            instances.insert(plugin.name.clone(), set.clone());
            Ok(set)
        };

        let wrong_point = |plugin: &Plugin, extension_point| ScheduleError::WrongExtensionPoint {
            name: plugin.name.clone(),
            extension_point,
        };

        let mut pre_score = vec![];
        for plugin in config.plugins.pre_score.iter() {
            pre_score.push(
                instance(plugin)?
                    .pre_score
                    .ok_or_else(|| wrong_point(plugin, "prescore"))?,
            );
        }
        let mut score = vec![];
        for plugin in config.plugins.score.iter() {
            let score_plugin = instance(plugin)?
                .score
                .ok_or_else(|| wrong_point(plugin, "score"))?;
            score.push((score_plugin, plugin.weight.unwrap_or(1)));
        }
        let mut bind = vec![];
        for plugin in config.plugins.bind.iter() {
            bind.push(
                instance(plugin)?
                    .bind
                    .ok_or_else(|| wrong_point(plugin, "bind"))?,
            );
        }

        Ok(Self {
            scheduler_name: config.scheduler_name,
            pre_score,
            score,
            bind,
        })
    }

    pub fn scheduler_name(&self) -> &str {
        &self.scheduler_name
    }

    /// Runs one scheduling cycle for the pod and returns the name of the node it was bound to.
    /// Ties in total score are resolved in favour of the node which comes first in `nodes`.
    pub fn schedule_one(
        &self,
        ctx: &CycleContext,
        pod: &Pod,
        nodes: &[Node],
    ) -> Result<String, ScheduleError> {
        if nodes.is_empty() {
            return Err(ScheduleError::NoNodes);
        }
        let state = CycleState::new();

        for plugin in self.pre_score.iter() {
            plugin
                .pre_score(ctx, &state, pod, nodes)
                .map_err(ScheduleError::PreScore)?;
        }

        let mut total_scores = vec![0i64; nodes.len()];
        for (plugin, weight) in self.score.iter() {
            let mut node_scores = Vec::with_capacity(nodes.len());
            for node in nodes.iter() {
                let score = plugin
                    .score(ctx, &state, pod, node.name())
                    .map_err(|status| ScheduleError::Score {
                        node: node.name().to_string(),
                        status,
                    })?;
                node_scores.push(NodeScore {
                    name: node.name().to_string(),
                    score,
                });
            }
            if let Some(extensions) = plugin.score_extensions() {
                extensions
                    .normalize_score(ctx, &state, pod, &mut node_scores)
                    .map_err(ScheduleError::Normalize)?;
            }
            for (total, node_score) in total_scores.iter_mut().zip(node_scores.iter()) {
                *total = total.saturating_add(node_score.score.saturating_mul(*weight));
            }
        }

        let mut assigned = 0;
        for (idx, score) in total_scores.iter().enumerate() {
            if *score > total_scores[assigned] {
                assigned = idx;
            }
        }
        let node_name = nodes[assigned].name();
        debug!(
            "Pod {:?} scores: {:?}, selected node {:?}",
            pod.metadata.key(),
            total_scores,
            node_name
        );

        for plugin in self.bind.iter() {
            match plugin.bind(ctx, &state, pod, node_name) {
                Ok(()) => return Ok(node_name.to_string()),
                Err(status) if status.is_skip() => continue,
                Err(status) => return Err(ScheduleError::Bind(status)),
            }
        }
        Err(ScheduleError::NoBinder)
    }
}
