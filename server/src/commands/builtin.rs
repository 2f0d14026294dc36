//! Bundled slash commands.

use std::sync::Arc;

use super::{CommandArgs, CommandHandler};

/// `/test` - liveness check from inside Slack.
pub fn hello_world(_args: CommandArgs) -> Option<String> {
    Some("Hello, World".to_string())
}

/// Declarative table of bundled commands.
pub fn table() -> Vec<(&'static str, CommandHandler)> {
    vec![("/test", Arc::new(hello_world) as CommandHandler)]
}
