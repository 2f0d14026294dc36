//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{commands::CommandRegistry, config::Config, webhooks};

/// Shared application state.
///
/// Both fields are read-only after startup, so clones can be used from any
/// number of requests without locking.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration, including the signing secret
    pub config: Arc<Config>,
    /// Frozen slash-command registry
    pub registry: Arc<CommandRegistry>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, registry: CommandRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Slack slash commands
        .route("/slack/commands", post(webhooks::handlers::receive_command))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Number of registered slash commands
    commands: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        commands: state.registry.len(),
    })
}
