//! Shared fixtures for the integration tests: a spy tool runner, a canned
//! release source and helpers for driving the router in-process.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

use vrc_ytdlp_webtool::extractors::{ToolOutput, ToolRunner, YoutubeExtractor};
use vrc_ytdlp_webtool::server::{create_router, AppState};
use vrc_ytdlp_webtool::version::ReleaseSource;
use vrc_ytdlp_webtool::{ConcurrencyGate, RelayError, VersionMonitor};

/// Records every invocation and answers with a fixed output
pub struct SpyRunner {
    output: ToolOutput,
    delay: Duration,
    version: String,
    pub calls: Mutex<Vec<Vec<String>>>,
    running: AtomicUsize,
    pub peak: AtomicUsize,
    /// Extraction runs that finished their delay
    pub completed: AtomicUsize,
}

impl SpyRunner {
    pub fn new(output: ToolOutput) -> Self {
        Self {
            output,
            delay: Duration::ZERO,
            version: "2024.01.01\n".to_string(),
            calls: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn printing(stdout: &str) -> Self {
        Self::new(ToolOutput {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls other than `--version`
    pub fn extraction_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|args| args.first().map(String::as_str) != Some("--version"))
            .count()
    }
}

#[async_trait]
impl ToolRunner for SpyRunner {
    async fn run(&self, args: &[String]) -> vrc_ytdlp_webtool::Result<ToolOutput> {
        self.calls.lock().unwrap().push(args.to_vec());

        if args.first().map(String::as_str) == Some("--version") {
            return Ok(ToolOutput {
                code: Some(0),
                stdout: self.version.clone(),
                stderr: String::new(),
            });
        }

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.running.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        Ok(self.output.clone())
    }
}

/// Release source answering with a fixed result
pub struct StaticReleases(pub Option<&'static str>);

#[async_trait]
impl ReleaseSource for StaticReleases {
    async fn latest_version(&self) -> Result<String, RelayError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| RelayError::VersionFetchFailed("offline".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub runner: Arc<SpyRunner>,
    pub state: AppState,
}

impl TestApp {
    pub fn new(runner: SpyRunner, latest: Option<&'static str>) -> Self {
        Self::with_static_dir(runner, latest, None)
    }

    pub fn with_static_dir(runner: SpyRunner, latest: Option<&'static str>, static_dir: Option<&Path>) -> Self {
        let runner = Arc::new(runner);
        let tool: Arc<dyn ToolRunner> = runner.clone();

        let state = AppState::new(
            Arc::new(YoutubeExtractor::new(tool.clone())),
            Arc::new(ConcurrencyGate::new(2)),
            Arc::new(VersionMonitor::new(
                tool,
                Arc::new(StaticReleases(latest)),
                Duration::from_secs(3600),
            )),
        );

        Self {
            router: create_router(state.clone(), static_dir),
            runner,
            state,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}
