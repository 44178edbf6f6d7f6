//! Sonar completions client error types.

use std::sync::Arc;

use grantbridge_core::Error;

/// Errors from the Sonar completions API client.
#[derive(Debug, thiserror::Error)]
pub enum SonarError {
    /// Missing SONAR_API_KEY.
    #[error("missing API key: SONAR_API_KEY not set")]
    MissingApiKey,

    /// Request rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (invalid API key).
    #[error("authentication failed: invalid API key")]
    AuthError,

    /// Rate limited by the completions API.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The reply carried no message content.
    #[error("empty completion: no message content in reply")]
    EmptyReply,

    /// Response or content parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SonarError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SonarError::Timeout } else { SonarError::Network(Arc::new(err)) }
    }
}

impl From<SonarError> for Error {
    fn from(err: SonarError) -> Self {
        match err {
            SonarError::Parse(msg) => Error::Parse(msg),
            SonarError::EmptyReply => Error::Parse(err.to_string()),
            SonarError::HttpError { status } => Error::Upstream(format!("completions API returned HTTP {status}")),
            other => Error::Upstream(other.to_string()),
        }
    }
}
