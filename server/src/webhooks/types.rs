//! Webhook Types
//!
//! Transport event, response envelope and the per-request error taxonomy.

use std::collections::HashMap;
use std::fmt::Write as _;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::signing::VerifyError;
use crate::commands::{DispatchError, InvocationError};

/// Prefix of every in-band failure message.
pub const FAILURE_PREFIX: &str = "Oops, I failed to execute properly:\n";

fn default_true() -> bool {
    true
}

/// Raw event handed over by a function-invocation runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Header name → value, case preserved as received.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request body, base64-encoded unless `is_base64_encoded` is false.
    #[serde(default)]
    pub body: String,
    /// Whether `body` is base64.
    #[serde(default = "default_true")]
    pub is_base64_encoded: bool,
}

/// Response returned to Slack.
///
/// Always status 200; failures are reported in `body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
}

impl ResponseEnvelope {
    /// Successful reply carrying handler output.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: body.into(),
        }
    }

    /// In-band diagnostic for a failed request.
    pub fn failure(description: &str) -> Self {
        Self::ok(format!("{FAILURE_PREFIX}{description}"))
    }

    /// Diagnostic built from an error and its `source()` chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::failure(&describe_error(err))
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.body,
        )
            .into_response()
    }
}

/// Render an error followed by its causes, one per line.
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {cause}");
        source = cause.source();
    }
    out
}

/// Per-request failures. All of them end up as a 200 envelope.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The transport body was not valid base64.
    #[error("Request body is not valid base64")]
    InvalidBodyEncoding(#[source] base64::DecodeError),

    /// Signature or freshness check failed.
    #[error("Request verification failed")]
    Verification(#[from] VerifyError),

    /// The command payload could not be decoded.
    #[error("Malformed command payload")]
    Invocation(#[from] InvocationError),

    /// The handler broke its contract.
    #[error("Command dispatch failed")]
    Dispatch(#[from] DispatchError),
}

impl WebhookError {
    /// Short machine-friendly tag used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBodyEncoding(_) => "invalid_body_encoding",
            Self::Verification(VerifyError::MissingField(_)) => "missing_field",
            Self::Verification(VerifyError::MalformedTimestamp(_)) => "malformed_timestamp",
            Self::Verification(VerifyError::StaleRequest { .. }) => "stale_request",
            Self::Verification(VerifyError::SignatureMismatch) => "signature_mismatch",
            Self::Invocation(InvocationError::InvalidUtf8) => "invalid_utf8",
            Self::Invocation(InvocationError::MissingField(_)) => "missing_field",
            Self::Dispatch(DispatchError::HandlerContractViolation { .. }) => {
                "handler_contract_violation"
            }
        }
    }
}

impl From<&WebhookError> for ResponseEnvelope {
    fn from(err: &WebhookError) -> Self {
        Self::from_error(err)
    }
}
