#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;

use kubernetriks_rl_scheduler::core::node::Node;
use kubernetriks_rl_scheduler::core::pod::Pod;
use kubernetriks_rl_scheduler::core::scheduler::context::CycleContext;
use kubernetriks_rl_scheduler::transport::score_client::{
    ScoreRequest, ScoreResponse, ScoreTransport,
};
use kubernetriks_rl_scheduler::transport::TransportError;

pub fn create_pod(name: &str) -> Pod {
    Pod::new("default", name, &format!("{}-uid", name), "500m", "1Gi")
}

pub fn create_nodes(names: &[&str]) -> Vec<Node> {
    names
        .iter()
        .map(|name| Node::new(name, "4", "8Gi"))
        .collect()
}

pub fn scores(entries: &[(&str, i64)]) -> HashMap<String, i64> {
    entries
        .iter()
        .map(|(name, score)| (name.to_string(), *score))
        .collect()
}

pub enum FakeReply {
    Scores(HashMap<String, i64>),
    Timeout,
}

/// Scorer which answers without network and remembers every request it got.
pub struct FakeScorer {
    reply: FakeReply,
    pub requests: Arc<Mutex<Vec<ScoreRequest>>>,
}

impl FakeScorer {
    pub fn new(reply: FakeReply) -> Self {
        Self {
            reply,
            requests: Default::default(),
        }
    }
}

impl ScoreTransport for FakeScorer {
    fn endpoint(&self) -> &str {
        "fake://scorer"
    }

    fn request_scores(
        &self,
        _ctx: &CycleContext,
        request: &ScoreRequest,
    ) -> Result<ScoreResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            FakeReply::Scores(scores) => Ok(ScoreResponse {
                scores: scores.clone(),
            }),
            FakeReply::Timeout => Err(TransportError::Timeout {
                uri: self.endpoint().to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

/// Http server on a random local port, runs on its own thread until the test process exits.
pub struct TestServer {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub fn start(handler: impl Fn(&RecordedRequest) -> Reply + Send + Sync + 'static) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Default::default();
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = requests.clone();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                loop {
                    let (stream, _) = listener.accept().await.unwrap();
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let handler = handler.clone();
                            let recorded = recorded.clone();
                            async move { handle(req, handler, recorded).await }
                        });
                        let _ = hyper::server::conn::http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await;
                    });
                }
            });
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle(
    req: Request<Incoming>,
    handler: Arc<Handler>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = req.into_body().collect().await?.to_bytes().to_vec();
    let request = RecordedRequest {
        method,
        path,
        content_type,
        body,
    };

    let reply = (*handler)(&request);
    recorded.lock().unwrap().push(request);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    Ok(Response::builder()
        .status(reply.status)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(reply.body)))
        .unwrap())
}

/// Address where nothing listens.
pub fn unused_local_url(path: &str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}
