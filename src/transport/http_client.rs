//! Http client which performs one request at a time on behalf of a synchronous caller.
//!
//! Scheduling callbacks are synchronous, so the client owns a small tokio runtime and blocks the
//! calling thread until the response is read, the cycle context is cancelled or its deadline
//! passes. Connections are pooled between calls. Must not be called from within an async context.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use log::debug;

use crate::core::scheduler::context::CycleContext;
use crate::transport::TransportError;

pub struct HttpTransport {
    runtime: tokio::runtime::Runtime,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("rl-scheduler-http")
            .enable_all()
            .build()
            .map_err(TransportError::Runtime)?;
        let client = Client::builder(TokioExecutor::new())
            .pool_timer(TokioTimer::new())
            .build_http();
        Ok(Self { runtime, client })
    }

    /// Sends a request with optional json body and returns the body of a successful (2xx) response.
    pub fn send(
        &self,
        ctx: &CycleContext,
        method: Method,
        uri: &str,
        json_body: Option<Vec<u8>>,
    ) -> Result<Bytes, TransportError> {
        if ctx.is_cancelled() {
            return Err(TransportError::Cancelled {
                uri: uri.to_string(),
            });
        }
        if ctx.is_expired() {
            return Err(TransportError::Timeout {
                uri: uri.to_string(),
            });
        }

        let parsed_uri =
            uri.parse::<Uri>()
                .map_err(|source| TransportError::InvalidEndpoint {
                    endpoint: uri.to_string(),
                    source,
                })?;
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(parsed_uri)
            .header(ACCEPT, "application/json");
        let body = match json_body {
            Some(payload) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Full::new(Bytes::from(payload))
            }
            None => Full::new(Bytes::new()),
        };
        let request = builder.body(body)?;

        debug!("{} {}", method, uri);

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|source| TransportError::Http {
                    uri: uri.to_string(),
                    source,
                })?;
            let status = response.status();
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|source| TransportError::Body {
                    uri: uri.to_string(),
                    source,
                })?
                .to_bytes();
            if !status.is_success() {
                return Err(TransportError::Status {
                    uri: uri.to_string(),
                    status,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Ok::<Bytes, TransportError>(body)
        };

        self.runtime.block_on(async {
            tokio::select! {
                result = exchange => result,
                _ = ctx.cancelled() => Err(TransportError::Cancelled { uri: uri.to_string() }),
                _ = ctx.expired() => Err(TransportError::Timeout { uri: uri.to_string() }),
            }
        })
    }
}
