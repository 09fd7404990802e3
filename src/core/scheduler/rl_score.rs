//! Plugin which delegates node scoring to an external reinforcement learning service.
//!
//! PreScore sends the pod and all candidate nodes to the service once per scheduling cycle and
//! keeps returned scores in cycle state, Score looks them up per node and Bind commits the
//! chosen node either through a live api server or into a simulated cluster.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::RlSchedulerArgs;
use crate::core::binding::Binding;
use crate::core::cluster_client::interface::{ClientError, ClusterClient};
use crate::core::cluster_client::live::LiveClusterClient;
use crate::core::cluster_client::simulated::SimulatedClusterClient;
use crate::core::node::Node;
use crate::core::pod::{Pod, PodPhase};
use crate::core::scheduler::context::CycleContext;
use crate::core::scheduler::cycle_state::{CycleState, StateData};
use crate::core::scheduler::interface::{
    BindPlugin, Plugin, PreScorePlugin, ScoreExtensions, ScorePlugin, Status, MIN_NODE_SCORE,
};
use crate::transport::score_client::{HttpScoreClient, ScoreRequest, ScoreTransport};
use crate::transport::TransportError;

pub const RL_SCHEDULER_SCORE_PLUGIN_NAME: &str = "RLSchedulerScore";
pub const RL_SCORE_STATE_KEY: &str = "PreScore-RLSchedulerScore";

/// Scores returned by the service for the current cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RlScoreState {
    scores: HashMap<String, i64>,
}

impl StateData for RlScoreState {}

impl RlScoreState {
    pub fn new(scores: HashMap<String, i64>) -> Self {
        Self { scores }
    }

    pub fn score(&self, node_name: &str) -> Option<i64> {
        self.scores.get(node_name).copied()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("failed to bind pod {pod} to node {node}")]
    Submit {
        pod: String,
        node: String,
        #[source]
        source: ClientError,
    },
    #[error("failed to get simulated pod {pod}")]
    Fetch {
        pod: String,
        #[source]
        source: ClientError,
    },
    #[error("failed to update simulated pod {pod} with node {node}")]
    Update {
        pod: String,
        node: String,
        #[source]
        source: ClientError,
    },
    #[error("unknown cluster client type, cannot bind pod {pod} to node {node}")]
    UnknownHandle { pod: String, node: String },
}

pub struct RlSchedulerScore {
    handle: Arc<dyn ClusterClient>,
    scorer: Box<dyn ScoreTransport>,
}

impl RlSchedulerScore {
    pub fn new(
        args: &RlSchedulerArgs,
        handle: Arc<dyn ClusterClient>,
    ) -> Result<Self, TransportError> {
        let scorer =
            HttpScoreClient::new(args.resolve_endpoint())?.with_timeout(args.request_timeout());
        info!("RL scheduler scores nodes with {}", scorer.endpoint());
        Ok(Self::with_transport(handle, Box::new(scorer)))
    }

    pub fn with_transport(handle: Arc<dyn ClusterClient>, scorer: Box<dyn ScoreTransport>) -> Self {
        Self { handle, scorer }
    }

    pub fn endpoint(&self) -> &str {
        self.scorer.endpoint()
    }

    fn commit_binding(&self, pod: &Pod, node_name: &str) -> Result<(), BindError> {
        let pod_key = pod.metadata.key();
        let handle = self.handle.as_ref();

        if let Some(live) = handle.downcast_ref::<LiveClusterClient>() {
            let binding = Binding::new(pod, node_name);
            return live
                .create_binding(&binding)
                .map_err(|source| BindError::Submit {
                    pod: pod_key,
                    node: node_name.to_string(),
                    source,
                });
        }

        if let Some(simulated) = handle.downcast_ref::<SimulatedClusterClient>() {
            let mut updated = simulated
                .get_pod(pod.metadata.namespace_or_default(), &pod.metadata.name)
                .map_err(|source| BindError::Fetch {
                    pod: pod_key.clone(),
                    source,
                })?;
            updated.spec.node_name = node_name.to_string();
            updated.status.phase = Some(PodPhase::Running);
            simulated
                .update_pod(&updated)
                .map_err(|source| BindError::Update {
                    pod: pod_key,
                    node: node_name.to_string(),
                    source,
                })?;
            return Ok(());
        }

        Err(BindError::UnknownHandle {
            pod: pod_key,
            node: node_name.to_string(),
        })
    }
}

impl Plugin for RlSchedulerScore {
    fn name(&self) -> &str {
        RL_SCHEDULER_SCORE_PLUGIN_NAME
    }
}

impl PreScorePlugin for RlSchedulerScore {
    fn pre_score(
        &self,
        ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        nodes: &[Node],
    ) -> Result<(), Status> {
        let request = ScoreRequest::new(pod, nodes);
        debug!(
            "Requesting scores for pod {:?} on {} nodes from {}",
            pod.metadata.key(),
            request.nodes.len(),
            self.scorer.endpoint()
        );

        let response = self.scorer.request_scores(ctx, &request).map_err(|err| {
            warn!(
                "Failed to get scores for pod {:?}: {}",
                pod.metadata.key(),
                err
            );
            Status::as_status(&err).with_plugin(RL_SCHEDULER_SCORE_PLUGIN_NAME)
        })?;

        state.write(RL_SCORE_STATE_KEY, RlScoreState::new(response.scores));
        Ok(())
    }
}

impl ScorePlugin for RlSchedulerScore {
    fn score(
        &self,
        _ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> Result<i64, Status> {
        let scores = state
            .read_as::<RlScoreState>(RL_SCORE_STATE_KEY)
            .map_err(|err| {
                Status::as_status(&err).with_plugin(RL_SCHEDULER_SCORE_PLUGIN_NAME)
            })?;

        match scores.score(node_name) {
            Some(score) => Ok(score),
            None => {
                debug!(
                    "No score for node {:?} in response for pod {:?}, using minimum",
                    node_name,
                    pod.metadata.key()
                );
                Ok(MIN_NODE_SCORE)
            }
        }
    }

    // Raw scores of the service are used as is.
    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

impl BindPlugin for RlSchedulerScore {
    fn bind(
        &self,
        _ctx: &CycleContext,
        _state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> Result<(), Status> {
        self.commit_binding(pod, node_name).map_err(|err| {
            warn!("{}", err);
            Status::as_status(&err).with_plugin(RL_SCHEDULER_SCORE_PLUGIN_NAME)
        })?;
        info!("Pod {:?} is bound to node {:?}", pod.metadata.key(), node_name);
        Ok(())
    }
}
