//! HMAC-SHA256 Request Signing
//!
//! Verifies that an inbound slash-command request was signed by Slack with the
//! shared signing secret and is recent enough to be accepted.
//!
//! A request is authentic when `x-slack-signature` equals
//! `v0=` + hex(HMAC-SHA256(secret, "v0:" + timestamp + ":" + body)) and the
//! `x-slack-request-timestamp` is within [`MAX_REQUEST_AGE_SECS`] of the local clock.
//!
//! There is no nonce cache: a captured request can be replayed until it ages out
//! of the window.

use std::collections::HashMap;
use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request timestamp (decimal seconds since epoch).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Header carrying the `v0=<hex>` signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Signature scheme version.
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum allowed distance between the request timestamp and now (5 minutes).
pub const MAX_REQUEST_AGE_SECS: u64 = 300;

/// Longest prefix of a malformed timestamp echoed back in diagnostics.
const MAX_ECHOED_TIMESTAMP_CHARS: usize = 32;

/// Reasons a request fails verification.
///
/// Messages never include the secret or the computed signature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// A required header is absent.
    #[error("Missing required header: {0}")]
    MissingField(&'static str),

    /// The timestamp header is not a decimal integer.
    #[error("Request timestamp is not a valid integer: {0:?}")]
    MalformedTimestamp(String),

    /// The timestamp is outside the freshness window.
    #[error(
        "Message timestamp is stale ({skew_secs}s from now), something is wrong. \
         Are you replaying an old request?"
    )]
    StaleRequest { skew_secs: u64 },

    /// The provided signature does not match.
    #[error("Signature does not match, will not execute request")]
    SignatureMismatch,
}

/// Slack app signing secret.
///
/// Loaded once at startup and never printed; `Debug` is redacted and the
/// backing memory is wiped on drop.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<String>);

impl SigningSecret {
    /// Wrap a raw secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Key bytes for the MAC.
    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Whether the secret is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Values pulled from one request for the duration of a single verification.
#[derive(Debug)]
pub struct SignatureContext<'a> {
    /// Timestamp exactly as received, used verbatim in the basestring.
    pub raw_timestamp: &'a str,
    /// Parsed timestamp.
    pub timestamp: i64,
    /// Caller-supplied `v0=<hex>` signature.
    pub provided_signature: &'a str,
}

impl<'a> SignatureContext<'a> {
    /// Extract the timestamp and signature headers.
    pub fn from_headers(headers: &'a HashMap<String, String>) -> Result<Self, VerifyError> {
        let raw_timestamp = headers
            .get(TIMESTAMP_HEADER)
            .map(String::as_str)
            .ok_or(VerifyError::MissingField(TIMESTAMP_HEADER))?;
        let provided_signature = headers
            .get(SIGNATURE_HEADER)
            .map(String::as_str)
            .ok_or(VerifyError::MissingField(SIGNATURE_HEADER))?;

        let timestamp = raw_timestamp.parse::<i64>().map_err(|_| {
            VerifyError::MalformedTimestamp(
                raw_timestamp.chars().take(MAX_ECHOED_TIMESTAMP_CHARS).collect(),
            )
        })?;

        Ok(Self {
            raw_timestamp,
            timestamp,
            provided_signature,
        })
    }
}

/// Build the signed basestring `v0:<timestamp>:<body>`.
///
/// The body is appended as raw bytes, never re-encoded.
pub fn basestring(timestamp: &str, body: &[u8]) -> Vec<u8> {
    let prefix = format!("{SIGNATURE_VERSION}:{timestamp}:");
    let mut base = Vec::with_capacity(prefix.len() + body.len());
    base.extend_from_slice(prefix.as_bytes());
    base.extend_from_slice(body);
    base
}

/// Compute the `v0=<hex>` signature for a timestamp and body.
pub fn sign(secret: &SigningSecret, timestamp: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(&basestring(timestamp, body));
    format!(
        "{SIGNATURE_VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Constant-time comparison of the computed signature against the provided one.
///
/// Walks every byte of `expected` whatever the length or content of `provided`,
/// so neither the first differing position nor a length mismatch changes the
/// amount of work done.
pub fn constant_time_eq(expected: &[u8], provided: &[u8]) -> bool {
    let same_len = (expected.len() as u64).ct_eq(&(provided.len() as u64));
    let mut equal = Choice::from(1);
    for (i, byte) in expected.iter().enumerate() {
        let other = provided.get(i).copied().unwrap_or(!byte);
        equal &= byte.ct_eq(&other);
    }
    (equal & same_len).into()
}

/// Verify freshness and signature of an inbound request.
///
/// `now` is the current time in seconds since the Unix epoch.
pub fn verify(
    headers: &HashMap<String, String>,
    body: &[u8],
    secret: &SigningSecret,
    now: i64,
) -> Result<(), VerifyError> {
    let ctx = SignatureContext::from_headers(headers)?;

    let skew_secs = now.abs_diff(ctx.timestamp);
    if skew_secs > MAX_REQUEST_AGE_SECS {
        return Err(VerifyError::StaleRequest { skew_secs });
    }

    let computed = sign(secret, ctx.raw_timestamp, body);
    if !constant_time_eq(computed.as_bytes(), ctx.provided_signature.as_bytes()) {
        return Err(VerifyError::SignatureMismatch);
    }

    Ok(())
}
