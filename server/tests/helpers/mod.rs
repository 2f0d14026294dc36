//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router,
//! plus request-signing utilities.
//!
//! ## Test Servers
//!
//! Use [`spawn_test_server()`] when a real socket is needed instead of
//! `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sc_server::api::{create_router, AppState};
use sc_server::commands::{CommandInvocation, CommandRegistry};
use sc_server::config::Config;
use sc_server::webhooks::signing::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use tokio::task::JoinHandle;
use tower::ServiceExt;

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a test app with the bundled commands.
    pub fn new() -> Self {
        let registry =
            CommandRegistry::with_builtin_commands().expect("Failed to build command registry");
        Self::with_registry(registry)
    }

    /// Create a test app with a custom registry.
    pub fn with_registry(registry: CommandRegistry) -> Self {
        let state = AppState::new(Config::default_for_test(), registry);
        let router = create_router(state.clone());
        Self { router, state }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Build a slash-command POST signed at `timestamp`.
    pub fn signed_command(&self, body: &str, timestamp: i64) -> Request<Body> {
        let ts = timestamp.to_string();
        let signature = sign(&self.state.config.signing_secret, &ts, body.as_bytes());
        Self::request(Method::POST, "/slack/commands")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header(TIMESTAMP_HEADER, ts)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }
}

/// Form body for a command invocation.
pub fn command_body(command: &str, text: Option<&str>, team_id: &str) -> String {
    CommandInvocation {
        command: command.to_string(),
        text: text.map(str::to_string),
        team_id: team_id.to_string(),
    }
    .to_form_body()
}

/// Current time in seconds since the epoch.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Collect a response body as a UTF-8 string.
pub async fn body_to_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Collect a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

// ============================================================================
// Test Server
// ============================================================================

/// A running test server bound to a random port.
pub struct TestServer {
    /// Server address (127.0.0.1:PORT).
    pub addr: SocketAddr,
    /// Base URL for HTTP requests (e.g., `http://127.0.0.1:12345`).
    pub url: String,
    /// Handle to the server task for cleanup.
    _handle: JoinHandle<()>,
}

/// Spawn a real HTTP server on a random port.
pub async fn spawn_test_server(router: Router) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local addr");
    let url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Test server failed");
    });

    TestServer {
        addr,
        url,
        _handle: handle,
    }
}
