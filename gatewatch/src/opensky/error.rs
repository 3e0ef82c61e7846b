//! Error types for telemetry acquisition.

use thiserror::Error;

/// Maximum number of characters of an upstream body kept in an error.
pub const BODY_SNIPPET_LEN: usize = 200;

/// Errors from the token exchange or the states endpoint.
///
/// All variants are scoped to a single fetch attempt; the caller decides the
/// fallback policy.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TelemetryError {
    /// Credentials missing or the token exchange was rejected.
    #[error("OpenSky authentication failed (status {status:?}): {body}")]
    Auth { status: Option<u16>, body: String },

    /// Non-success status or malformed response from the states endpoint.
    #[error("OpenSky request failed (status {status:?}): {body}")]
    Upstream { status: Option<u16>, body: String },

    /// The request did not complete within the configured timeout.
    #[error("OpenSky request timed out")]
    Timeout,
}

impl TelemetryError {
    /// Short failure class used as the response `source` tag.
    pub fn source_tag(&self) -> &'static str {
        match self {
            Self::Auth { .. } => "upstream_auth_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Timeout => "upstream_timeout",
        }
    }

    pub(crate) fn upstream(status: Option<u16>, body: &[u8]) -> Self {
        Self::Upstream {
            status,
            body: truncate_body(&String::from_utf8_lossy(body)),
        }
    }

    pub(crate) fn auth(status: Option<u16>, body: &[u8]) -> Self {
        Self::Auth {
            status,
            body: truncate_body(&String::from_utf8_lossy(body)),
        }
    }
}

/// Truncate a response body to [`BODY_SNIPPET_LEN`] characters.
pub fn truncate_body(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_LEN).collect()
}
