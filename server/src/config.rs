//! Server Configuration
//!
//! Loads configuration from environment variables.

use std::env;

use thiserror::Error;

use crate::webhooks::signing::SigningSecret;

/// Default request body limit (64 KiB). Slash-command payloads are a few hundred bytes.
const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Startup configuration errors. The process refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `SLACK_SIGNING_SECRET` is unset or empty.
    #[error(
        "Set SLACK_SIGNING_SECRET as an environment variable. \
         You can find this on the Slack 'App Settings' under 'Signing Secret'."
    )]
    MissingSigningSecret,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080")
    pub bind_address: String,

    /// Slack app signing secret
    pub signing_secret: SigningSecret,

    /// Maximum accepted request body in bytes (default: 64KB)
    pub max_body_size: usize,
}

impl Config {
    /// Signing secret used by [`Config::default_for_test`].
    pub const TEST_SIGNING_SECRET: &'static str = "test-signing-secret";

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let signing_secret = lookup("SLACK_SIGNING_SECRET")
            .filter(|s| !s.is_empty())
            .map(SigningSecret::new)
            .ok_or(ConfigError::MissingSigningSecret)?;

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            signing_secret,
            max_body_size: lookup("MAX_BODY_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        })
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".into(),
            signing_secret: SigningSecret::new(Self::TEST_SIGNING_SECRET),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}
