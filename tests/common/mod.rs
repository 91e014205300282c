//! Purpose: Shared fixtures for integration tests.
//! Exports: `StubServer` (loopback geocoding endpoint), `RecordingTransport`, `TestResult`.
//! Role: Stand-ins for the real service so tests observe exact outbound requests.
//! Invariants: The stub binds 127.0.0.1 on an ephemeral port before the test proceeds.
//! Invariants: Servers shut down and join their runtime thread on drop.
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use gmaps_geocode::api::{Error, RawResponse, Transport};
use tokio::sync::oneshot;
use url::Url;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const GEOCODE_PATH: &str = "/maps/api/geocode/json";

struct StubState {
    status: u16,
    content_type: &'static str,
    body: String,
    requests: Mutex<Vec<String>>,
    user_agents: Mutex<Vec<String>>,
}

pub struct StubServer {
    base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl StubServer {
    pub fn json(body: &str) -> TestResult<Self> {
        Self::start(200, "application/json", body)
    }

    pub fn start(status: u16, content_type: &'static str, body: &str) -> TestResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let state = Arc::new(StubState {
            status,
            content_type,
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
            user_agents: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route(GEOCODE_PATH, get(handle_geocode))
            .with_state(Arc::clone(&state));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let thread = thread::spawn(move || {
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("adopt stub listener");
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{GEOCODE_PATH}", self.base_url)
    }

    /// Path and raw (still percent-encoded) query of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }

    /// `User-Agent` header of every request received so far.
    pub fn user_agents(&self) -> Vec<String> {
        self.state
            .user_agents
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn handle_geocode(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let recorded = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    state
        .requests
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(recorded);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .user_agents
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
        .push(user_agent);
    let status = StatusCode::from_u16(state.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body.clone(),
    )
        .into_response()
}

/// In-memory transport that records every url and replays one canned response.
#[derive(Clone)]
pub struct RecordingTransport {
    response: RawResponse,
    calls: Arc<Mutex<Vec<Url>>>,
}

impl RecordingTransport {
    pub fn ok_empty() -> Self {
        Self::replying(200, r#"{"status":"OK","results":[]}"#)
    }

    pub fn replying(status: u16, body: &str) -> Self {
        Self {
            response: RawResponse::new(status, body),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Url> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Transport for RecordingTransport {
    fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        self.calls
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(url.clone());
        Ok(self.response.clone())
    }
}
