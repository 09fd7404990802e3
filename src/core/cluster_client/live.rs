//! Cluster client which works with a running kube-api-server over its REST api.

use std::time::Duration;

use http::Method;
use log::debug;

use crate::core::binding::Binding;
use crate::core::cluster_client::interface::{ClientError, ClusterClient};
use crate::core::pod::Pod;
use crate::core::scheduler::context::CycleContext;
use crate::transport::http_client::HttpTransport;
use crate::transport::TransportError;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct LiveClusterClient {
    transport: HttpTransport,
    // Api server address, e.g. http://127.0.0.1:8080
    base_url: String,
    request_timeout: Duration,
}

impl LiveClusterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self {
            transport: HttpTransport::new()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn pod_url(&self, namespace: &str, name: &str) -> String {
        let namespace = if namespace.is_empty() {
            "default"
        } else {
            namespace
        };
        format!(
            "{}/api/v1/namespaces/{}/pods/{}",
            self.base_url, namespace, name
        )
    }

    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<bytes::Bytes, TransportError> {
        let ctx = CycleContext::background().with_timeout(self.request_timeout);
        self.transport.send(&ctx, method, url, body)
    }

    fn not_found_as_missing_pod(err: TransportError, namespace: &str, name: &str) -> ClientError {
        if err.is_not_found() {
            ClientError::PodNotFound {
                key: format!("{}/{}", namespace, name),
            }
        } else {
            ClientError::Transport(err)
        }
    }
}

impl ClusterClient for LiveClusterClient {
    fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError> {
        let body = self
            .send(Method::GET, &self.pod_url(namespace, name), None)
            .map_err(|err| Self::not_found_as_missing_pod(err, namespace, name))?;
        Ok(serde_json::from_slice(&body).map_err(TransportError::Decode)?)
    }

    fn update_pod(&self, pod: &Pod) -> Result<Pod, ClientError> {
        let payload = serde_json::to_vec(pod).map_err(TransportError::Serialize)?;
        let url = self.pod_url(&pod.metadata.namespace, &pod.metadata.name);
        let body = self
            .send(Method::PUT, &url, Some(payload))
            .map_err(|err| {
                Self::not_found_as_missing_pod(err, &pod.metadata.namespace, &pod.metadata.name)
            })?;
        Ok(serde_json::from_slice(&body).map_err(TransportError::Decode)?)
    }

    fn create_binding(&self, binding: &Binding) -> Result<(), ClientError> {
        let payload = serde_json::to_vec(binding).map_err(TransportError::Serialize)?;
        let url = format!(
            "{}/binding",
            self.pod_url(&binding.metadata.namespace, &binding.metadata.name)
        );
        debug!(
            "Posting binding of pod {:?} to node {:?}",
            binding.metadata.name, binding.target.name
        );
        self.send(Method::POST, &url, Some(payload))
            .map_err(|err| {
                Self::not_found_as_missing_pod(
                    err,
                    &binding.metadata.namespace,
                    &binding.metadata.name,
                )
            })?;
        Ok(())
    }
}
