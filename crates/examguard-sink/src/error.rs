//! Sink error types.
//!
//! These errors represent failures when talking to the quiz backend. They
//! are typed so callers can distinguish permanent failures from ones worth
//! a manual retry without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with the quiz backend.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API token).
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// No quiz exists for the given reference.
    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl SinkError {
    /// Returns `true` if this error is permanent and retrying the same
    /// submission cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, SinkError::Unauthorized(_) | SinkError::QuizNotFound(_))
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            SinkError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
