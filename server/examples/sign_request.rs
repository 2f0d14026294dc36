//! Print a signed slash-command request for manual testing.
//!
//! Usage: `SLACK_SIGNING_SECRET=... cargo run --example sign_request -- /test [text]`

use sc_server::commands::CommandInvocation;
use sc_server::webhooks::signing::{sign, SigningSecret, SIGNATURE_HEADER, TIMESTAMP_HEADER};

fn main() {
    let secret = std::env::var("SLACK_SIGNING_SECRET").expect("SLACK_SIGNING_SECRET must be set");
    let command = std::env::args().nth(1).unwrap_or_else(|| "/test".to_string());
    let text = std::env::args().nth(2);

    let body = CommandInvocation {
        command,
        text,
        team_id: "T00000000".to_string(),
    }
    .to_form_body();
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = sign(&SigningSecret::new(secret), &timestamp, body.as_bytes());

    println!(
        "curl -X POST http://localhost:8080/slack/commands \\\n  -H '{TIMESTAMP_HEADER}: {timestamp}' \\\n  -H '{SIGNATURE_HEADER}: {signature}' \\\n  -H 'Content-Type: application/x-www-form-urlencoded' \\\n  --data '{body}'"
    );
}
