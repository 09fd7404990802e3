//! Wire contract with the external scorer and its http client.

use std::collections::HashMap;
use std::time::Duration;

use http::Method;
use serde::{Deserialize, Serialize};

use crate::core::node::Node;
use crate::core::pod::Pod;
use crate::core::scheduler::context::CycleContext;
use crate::transport::http_client::HttpTransport;
use crate::transport::TransportError;

/// Body of a scoring request: the pod being placed and every candidate node.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScoreRequest {
    pub pod: Pod,
    pub nodes: Vec<Node>,
}

impl ScoreRequest {
    pub fn new(pod: &Pod, nodes: &[Node]) -> Self {
        Self {
            pod: pod.clone(),
            nodes: nodes.to_vec(),
        }
    }
}

/// Scores by node name. Nodes may be missing, a missing or null `scores` field is an empty map.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScoreResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scores: HashMap<String, i64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<HashMap<String, i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, i64>>::deserialize(deserializer)?.unwrap_or_default())
}

pub trait ScoreTransport: Send + Sync {
    fn endpoint(&self) -> &str;

    // Exactly one request to the scorer per call, no retries.
    fn request_scores(
        &self,
        ctx: &CycleContext,
        request: &ScoreRequest,
    ) -> Result<ScoreResponse, TransportError>;
}

pub struct HttpScoreClient {
    transport: HttpTransport,
    endpoint: String,
    // Upper bound for one request in addition to the cycle deadline.
    timeout: Option<Duration>,
}

impl HttpScoreClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self {
            transport: HttpTransport::new()?,
            endpoint: endpoint.into(),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl ScoreTransport for HttpScoreClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_scores(
        &self,
        ctx: &CycleContext,
        request: &ScoreRequest,
    ) -> Result<ScoreResponse, TransportError> {
        let payload = serde_json::to_vec(request).map_err(TransportError::Serialize)?;
        let ctx = match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        };
        let body = self
            .transport
            .send(&ctx, Method::POST, &self.endpoint, Some(payload))?;
        serde_json::from_slice(&body).map_err(TransportError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_without_scores_is_empty() {
        let response: ScoreResponse = serde_json::from_str("{}").unwrap();
        assert!(response.scores.is_empty());
    }

    #[test]
    fn test_null_scores_are_empty() {
        let response: ScoreResponse = serde_json::from_str(r#"{"scores":null}"#).unwrap();
        assert!(response.scores.is_empty());

        let response: ScoreResponse =
            serde_json::from_str(r#"{"scores":{"n1": 7}}"#).unwrap();
        assert_eq!(response.scores["n1"], 7);

        assert!(serde_json::from_str::<ScoreResponse>(r#"{"scores":[1]}"#).is_err());
    }

    #[test]
    fn test_request_wire_shape() {
        let pod = Pod::new("default", "p1", "uid-1", "500m", "1Gi");
        let nodes = vec![Node::new("n1", "4", "8Gi"), Node::new("n2", "2", "4Gi")];
        let value = serde_json::to_value(ScoreRequest::new(&pod, &nodes)).unwrap();

        assert_eq!(value["pod"]["metadata"]["name"], "p1");
        assert_eq!(
            value["pod"]["spec"]["containers"][0]["resources"]["requests"]["cpu"],
            "500m"
        );
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][1]["metadata"]["name"], "n2");
        assert_eq!(value["nodes"][0]["status"]["allocatable"]["memory"], "8Gi");
    }
}
