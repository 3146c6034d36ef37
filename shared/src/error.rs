//! Error types for the Heritage Oracle.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving monument profiles.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (credential, timeouts, model names)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream generative-AI gateway failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::Gateway(_) => 502,
            _ => 500,
        }
    }
}

/// Failures talking to the generative-AI provider during profile retrieval.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Network failure or non-success HTTP status
    #[error("transport failure: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The provider answered, but not with something we can parse
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Stable short identifier, suitable for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "transport",
            GatewayError::Timeout => "timeout",
            GatewayError::MalformedResponse(_) => "malformed-response",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
