//! Slash-Command Webhook Handlers
//!
//! Verify → decode → dispatch, with every outcome turned into a 200 envelope.
//! Slack treats non-200 responses as delivery failures and retries, so errors
//! are reported in the body instead.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, error, instrument, warn};

use super::signing;
use super::types::{describe_error, InboundEvent, ResponseEnvelope, WebhookError};
use crate::api::AppState;
use crate::commands::CommandInvocation;

/// Verify the signature and decode the command payload.
fn decode(
    state: &AppState,
    headers: &HashMap<String, String>,
    body: &[u8],
    now: i64,
) -> Result<CommandInvocation, WebhookError> {
    debug!("Validating signature");
    signing::verify(headers, body, &state.config.signing_secret, now)?;
    Ok(CommandInvocation::from_form_body(body)?)
}

/// Run the handler bound to the invocation's command.
fn dispatch(state: &AppState, invocation: &CommandInvocation) -> Result<String, WebhookError> {
    let reply = state.registry.dispatch(
        &invocation.command,
        invocation.text.as_deref(),
        &invocation.team_id,
    )?;
    Ok(reply)
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic")
}

fn rejected(err: &WebhookError) -> ResponseEnvelope {
    warn!(
        kind = err.kind(),
        error = %describe_error(err),
        "Rejected slash-command request"
    );
    ResponseEnvelope::from(err)
}

/// Handle a request against the current wall clock.
pub fn handle_request(
    state: &AppState,
    headers: &HashMap<String, String>,
    body: &[u8],
) -> ResponseEnvelope {
    handle_request_at(state, headers, body, chrono::Utc::now().timestamp())
}

/// Handle a request as if the current time were `now` (seconds since epoch).
pub fn handle_request_at(
    state: &AppState,
    headers: &HashMap<String, String>,
    body: &[u8],
    now: i64,
) -> ResponseEnvelope {
    let invocation = match decode(state, headers, body, now) {
        Ok(invocation) => invocation,
        Err(err) => return rejected(&err),
    };

    match panic::catch_unwind(AssertUnwindSafe(|| dispatch(state, &invocation))) {
        Ok(Ok(reply)) => ResponseEnvelope::ok(reply),
        Ok(Err(err)) => rejected(&err),
        Err(payload) => {
            let command = invocation.command.as_str();
            let message = panic_message(payload.as_ref());
            error!(command, error = message, "Slash-command handler panicked");
            ResponseEnvelope::failure(&format!(
                "Unexpected panic in handler for command {command}: {message}"
            ))
        }
    }
}

/// Handle a function-invocation event, decoding its base64 body first.
pub fn handle_event(state: &AppState, event: &InboundEvent) -> ResponseEnvelope {
    handle_event_at(state, event, chrono::Utc::now().timestamp())
}

/// [`handle_event`] with an explicit clock.
pub fn handle_event_at(state: &AppState, event: &InboundEvent, now: i64) -> ResponseEnvelope {
    let body = if event.is_base64_encoded {
        match STANDARD.decode(event.body.as_bytes()) {
            Ok(body) => body,
            Err(e) => {
                let err = WebhookError::InvalidBodyEncoding(e);
                warn!(kind = err.kind(), "Rejected slash-command event");
                return ResponseEnvelope::from(&err);
            }
        }
    } else {
        event.body.as_bytes().to_vec()
    };

    handle_request_at(state, &event.headers, &body, now)
}

/// Copy HTTP headers into a plain map. Non-UTF-8 values are dropped.
pub fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// POST /slack/commands
///
/// Handlers are synchronous and may block, so the pipeline runs on the
/// blocking pool.
#[instrument(skip_all)]
pub async fn receive_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ResponseEnvelope {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection, "Could not read slash-command body");
            return ResponseEnvelope::failure(&rejection.body_text());
        }
    };
    let headers = header_map(&headers);
    match tokio::task::spawn_blocking(move || handle_request(&state, &headers, &body)).await {
        Ok(envelope) => envelope,
        Err(e) => {
            error!(error = %e, "Slash-command task failed");
            ResponseEnvelope::failure(&format!("Request task failed: {e}"))
        }
    }
}
