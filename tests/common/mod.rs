#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use capgate::http_server::build_router;
use capgate::{AppState, CorsConfig, GatewayError, InvocationCommand, Optimizer, ProcessOutcome};

pub const OPTIMIZER_PATH: &str = "./capacitor_optimizer";

/// Optimizer stand-in that records commands and replays one outcome.
pub struct FakeOptimizer {
    outcome: ProcessOutcome,
    pub calls: Mutex<Vec<InvocationCommand>>,
}

impl FakeOptimizer {
    pub fn new(exit_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: ProcessOutcome {
                exit_code: Some(exit_code),
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                timed_out: false,
                stdout_truncated: false,
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn timing_out() -> Arc<Self> {
        Arc::new(Self {
            outcome: ProcessOutcome {
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                timed_out: true,
                stdout_truncated: false,
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn last_call(&self) -> InvocationCommand {
        self.calls.lock().unwrap().last().cloned().expect("optimizer was not called")
    }
}

#[async_trait]
impl Optimizer for FakeOptimizer {
    async fn invoke(
        &self,
        command: &InvocationCommand,
        _timeout: Duration,
    ) -> Result<ProcessOutcome, GatewayError> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(self.outcome.clone())
    }
}

/// Optimizer stand-in whose invocation panics.
pub struct PanickingOptimizer;

#[async_trait]
impl Optimizer for PanickingOptimizer {
    async fn invoke(
        &self,
        _command: &InvocationCommand,
        _timeout: Duration,
    ) -> Result<ProcessOutcome, GatewayError> {
        panic!("optimizer bridge exploded");
    }
}

/// Full router (same middleware as production) around the given optimizer.
pub fn build_test_app(optimizer: Arc<dyn Optimizer>) -> Router {
    build_test_app_with(optimizer, PathBuf::from(OPTIMIZER_PATH), Duration::from_secs(30))
}

pub fn build_test_app_with(
    optimizer: Arc<dyn Optimizer>,
    optimizer_path: PathBuf,
    timeout: Duration,
) -> Router {
    let state = AppState::new(optimizer, optimizer_path, timeout);
    build_router(state, &CorsConfig::default()).unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
