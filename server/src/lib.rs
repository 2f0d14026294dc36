//! Slash-Command Server
//!
//! Webhook endpoint for Slack slash commands. Requests are authenticated with
//! Slack's signing secret, routed to a registered command handler, and always
//! answered with a 200 whose body carries the reply or a diagnostic.

pub mod api;
pub mod commands;
pub mod config;
pub mod webhooks;
