use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::config::RlSchedulerArgs;
use crate::core::cluster_client::interface::ClusterClient;
use crate::core::scheduler::interface::{
    BindPlugin, Code, PreScorePlugin, ScorePlugin, Status,
};
use crate::core::scheduler::rl_score::{RlSchedulerScore, RL_SCHEDULER_SCORE_PLUGIN_NAME};

/// Extension points implemented by one plugin instance.
#[derive(Clone, Default)]
pub struct PluginSet {
    pub pre_score: Option<Arc<dyn PreScorePlugin>>,
    pub score: Option<Arc<dyn ScorePlugin>>,
    pub bind: Option<Arc<dyn BindPlugin>>,
}

// Builds a plugin from its args in scheduler profile and the cluster handle given by the host.
pub type PluginFactory =
    fn(args: &serde_yaml::Value, handle: Arc<dyn ClusterClient>) -> Result<PluginSet, Status>;

lazy_static! {
    pub static ref PLUGIN_REGISTRY: HashMap<&'static str, PluginFactory> = {
        HashMap::from([(
            RL_SCHEDULER_SCORE_PLUGIN_NAME,
            new_rl_scheduler_score as PluginFactory,
        )])
    };
}

fn new_rl_scheduler_score(
    args: &serde_yaml::Value,
    handle: Arc<dyn ClusterClient>,
) -> Result<PluginSet, Status> {
    let args = RlSchedulerArgs::from_value(args).map_err(|err| {
        Status::new(Code::Error, format!("invalid plugin args: {}", err))
            .with_plugin(RL_SCHEDULER_SCORE_PLUGIN_NAME)
    })?;
    let plugin = RlSchedulerScore::new(&args, handle)
        .map_err(|err| Status::as_status(&err).with_plugin(RL_SCHEDULER_SCORE_PLUGIN_NAME))?;
    let plugin = Arc::new(plugin);
    Ok(PluginSet {
        pre_score: Some(plugin.clone()),
        score: Some(plugin.clone()),
        bind: Some(plugin),
    })
}
