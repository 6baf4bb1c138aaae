use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// Rejected limiter / retry settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("rate limit must allow at least one call per window (got {0})")]
    InvalidMaxCalls(u32),

    #[error("rate limit window must be a positive number of seconds (got {0})")]
    InvalidWindow(f64),

    #[error("retry policy needs at least one attempt")]
    InvalidAttempts,

    #[error("retry delay must be zero or more seconds (got {0})")]
    InvalidRetryDelay(f64),
}

/// Outcome of a failed call to the AI provider.
///
/// Variants are split into transient failures, which the retry policy tries
/// again, and definitive ones, which go straight back to the caller.
#[derive(Error, Debug, Clone)]
pub enum AiError {
    #[error("AI provider is not configured (missing API key)")]
    NotConfigured,

    #[error("AI provider timed out")]
    Timeout,

    #[error("could not reach AI provider: {0}")]
    Connection(String),

    #[error("AI provider server error ({status}): {body}")]
    Server { status: u16, body: String },

    #[error("AI provider is rate limiting requests")]
    RateLimited,

    #[error("AI provider rejected the credentials ({0})")]
    Unauthorized(u16),

    #[error("AI provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed AI response: {0}")]
    MalformedResponse(String),
}

impl AiError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AiError::Timeout | AiError::Connection(_) | AiError::Server { .. }
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let body: String = body.chars().take(200).collect();
        match status.as_u16() {
            429 => AiError::RateLimited,
            401 | 403 => AiError::Unauthorized(status.as_u16()),
            code if status.is_server_error() => AiError::Server { status: code, body },
            code => AiError::Rejected { status: code, body },
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_decode() {
            AiError::MalformedResponse(e.to_string())
        } else if let Some(status) = e.status() {
            AiError::from_status(status, e.to_string())
        } else {
            AiError::Connection(e.to_string())
        }
    }
}

// Errors returned by the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Ai(#[from] AiError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ai(AiError::NotConfigured) | ApiError::Ai(AiError::RateLimited) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Ai(AiError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Ai(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
