//! Blocking json-over-http transport used to talk to the external scorer and to the api server.

pub mod http_client;
pub mod score_client;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to serialize request body")]
    Serialize(#[source] serde_json::Error),
    #[error("invalid endpoint {endpoint:?}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: http::uri::InvalidUri,
    },
    #[error("failed to build request")]
    Request(#[from] http::Error),
    #[error("request to {uri} failed")]
    Http {
        uri: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },
    #[error("failed to read response body from {uri}")]
    Body {
        uri: String,
        #[source]
        source: hyper::Error,
    },
    #[error("{uri} responded with {status}: {body}")]
    Status {
        uri: String,
        status: http::StatusCode,
        body: String,
    },
    #[error("failed to decode response body")]
    Decode(#[source] serde_json::Error),
    #[error("request to {uri} timed out")]
    Timeout { uri: String },
    #[error("request to {uri} cancelled")]
    Cancelled { uri: String },
    #[error("failed to start http runtime")]
    Runtime(#[source] std::io::Error),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status, .. } if *status == http::StatusCode::NOT_FOUND)
    }
}
