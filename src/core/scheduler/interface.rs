//! Extension points of the scheduling framework which plugins implement.

use crate::core::node::Node;
use crate::core::pod::Pod;
use crate::core::scheduler::context::CycleContext;
use crate::core::scheduler::cycle_state::CycleState;

pub const MIN_NODE_SCORE: i64 = 0;
pub const MAX_NODE_SCORE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    // Internal plugin error, the cycle is aborted.
    Error,
    Unschedulable,
    // Plugin does not handle the request, framework moves on to the next plugin.
    Skip,
}

/// Non-success result of a plugin callback.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code:?}: {}", .reasons.join("; "))]
pub struct Status {
    code: Code,
    reasons: Vec<String>,
    plugin: Option<String>,
}

impl Status {
    pub fn new(code: Code, reason: impl Into<String>) -> Self {
        Self {
            code,
            reasons: vec![reason.into()],
            plugin: None,
        }
    }

    /// Wraps an error into a status with `Code::Error`, keeping the whole source chain in reason.
    pub fn as_status(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut reason = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(Code::Error, reason)
    }

    pub fn skip() -> Self {
        Self {
            code: Code::Skip,
            reasons: vec![],
            plugin: None,
        }
    }

    pub fn with_plugin(mut self, plugin: &str) -> Self {
        self.plugin = Some(plugin.to_string());
        self
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn plugin(&self) -> Option<&str> {
        self.plugin.as_deref()
    }

    pub fn message(&self) -> String {
        self.reasons.join("; ")
    }

    pub fn is_skip(&self) -> bool {
        self.code == Code::Skip
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeScore {
    pub name: String,
    pub score: i64,
}

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
}

// Called once per scheduling cycle with all candidate nodes, before any score call.
pub trait PreScorePlugin: Plugin {
    fn pre_score(
        &self,
        ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        nodes: &[Node],
    ) -> Result<(), Status>;
}

pub trait ScoreExtensions: Send + Sync {
    // Called once after all nodes are scored, may rewrite scores in place.
    fn normalize_score(
        &self,
        ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        scores: &mut [NodeScore],
    ) -> Result<(), Status>;
}

// Called once per candidate node, possibly concurrently for different nodes of one cycle.
pub trait ScorePlugin: Plugin {
    fn score(
        &self,
        ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> Result<i64, Status>;

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

pub trait BindPlugin: Plugin {
    // Returns `Code::Skip` status when the plugin does not bind this pod.
    fn bind(
        &self,
        ctx: &CycleContext,
        state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> Result<(), Status>;
}
