//! Slack Slash-Command Webhook
//!
//! Request signature verification and the endpoint that turns a verified
//! request into a command dispatch.

pub mod handlers;
pub mod signing;
pub mod types;

pub use handlers::{handle_event, handle_request};
pub use types::{InboundEvent, ResponseEnvelope, WebhookError};
