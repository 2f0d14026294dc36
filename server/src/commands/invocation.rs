//! Slash-command payload decoding.
//!
//! Slack posts slash commands as `application/x-www-form-urlencoded`. Only
//! `command`, `text` and `team_id` are used; other fields are ignored.

use std::collections::HashMap;

use thiserror::Error;
use url::form_urlencoded;

/// Errors decoding a command payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvocationError {
    /// The body is not valid UTF-8.
    #[error("Request body is not valid UTF-8")]
    InvalidUtf8,

    /// A required form field is absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// One slash-command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Command identifier, e.g. `/test`.
    pub command: String,
    /// Text typed after the command.
    pub text: Option<String>,
    /// Workspace identifier of the caller.
    pub team_id: String,
}

impl CommandInvocation {
    /// Decode a raw form body. On duplicate keys the last value wins.
    pub fn from_form_body(body: &[u8]) -> Result<Self, InvocationError> {
        let body = std::str::from_utf8(body).map_err(|_| InvocationError::InvalidUtf8)?;
        let mut fields: HashMap<String, String> = form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();

        let command = fields
            .remove("command")
            .ok_or(InvocationError::MissingField("command"))?;
        let team_id = fields
            .remove("team_id")
            .ok_or(InvocationError::MissingField("team_id"))?;
        let text = fields.remove("text");

        Ok(Self {
            command,
            text,
            team_id,
        })
    }

    /// Encode as a form body. `text` is omitted when absent.
    #[must_use]
    pub fn to_form_body(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair("command", &self.command);
        if let Some(text) = &self.text {
            serializer.append_pair("text", text);
        }
        serializer.append_pair("team_id", &self.team_id);
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_slack_payload() {
        let body = b"token=abc&team_id=T1DC2JH3J&team_domain=testteamnow&command=%2Fwebhook-collect&text=hello+there&response_url=https%3A%2F%2Fhooks.slack.com";
        let invocation = CommandInvocation::from_form_body(body).unwrap();
        assert_eq!(invocation.command, "/webhook-collect");
        assert_eq!(invocation.text.as_deref(), Some("hello there"));
        assert_eq!(invocation.team_id, "T1DC2JH3J");
    }

    #[test]
    fn text_is_optional() {
        let invocation = CommandInvocation::from_form_body(b"command=%2Ftest&team_id=T1").unwrap();
        assert_eq!(invocation.text, None);
    }

    #[test]
    fn empty_text_is_kept() {
        let invocation =
            CommandInvocation::from_form_body(b"command=%2Ftest&text=&team_id=T1").unwrap();
        assert_eq!(invocation.text.as_deref(), Some(""));
    }

    #[test]
    fn last_duplicate_wins() {
        let invocation =
            CommandInvocation::from_form_body(b"command=%2Fa&command=%2Fb&team_id=T1").unwrap();
        assert_eq!(invocation.command, "/b");
    }

    #[test]
    fn missing_fields() {
        assert_eq!(
            CommandInvocation::from_form_body(b"team_id=T1"),
            Err(InvocationError::MissingField("command"))
        );
        assert_eq!(
            CommandInvocation::from_form_body(b"command=%2Ftest"),
            Err(InvocationError::MissingField("team_id"))
        );
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert_eq!(
            CommandInvocation::from_form_body(&[b'c', 0xff, 0xfe]),
            Err(InvocationError::InvalidUtf8)
        );
    }

    #[test]
    fn form_round_trip_preserves_fields() {
        let original = CommandInvocation {
            command: "/deploy".to_string(),
            text: Some("prod & staging = 100% ✓".to_string()),
            team_id: "T0001".to_string(),
        };
        let decoded =
            CommandInvocation::from_form_body(original.to_form_body().as_bytes()).unwrap();
        assert_eq!(decoded, original);
    }
}
