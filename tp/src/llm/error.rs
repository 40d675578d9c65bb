//! Completion errors and provider status mapping

use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;
use tracing::debug;

/// Retry-after used when a 429 carries no usable header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Errors from a single completion call
///
/// Provider errors are surfaced verbatim; nothing here is retried.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Client setup failed: {0}")]
    Setup(String),

    #[error("Rate limited, retry after {retry_after:?}: {message}")]
    RateLimited { retry_after: Duration, message: String },

    #[error("Provider credit exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Provider returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Could not reach provider: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unusable completion: {0}")]
    InvalidResponse(String),

    #[error("No completion within {0:?}")]
    Timeout(Duration),

    #[error("Malformed provider JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Provider's back-off hint, when it sent one
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Pass a successful response through, turn anything else into an error
///
/// Shared by every provider. Every failure keeps the provider's body: 429
/// becomes `RateLimited` with the `retry-after` seconds, 402 becomes
/// `QuotaExhausted`, anything else `ApiError` with its status.
pub(crate) async fn check_status(response: Response) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    debug!(%status, "check_status: provider rejected request");

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
        .unwrap_or(DEFAULT_RETRY_AFTER);
    let message = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited { retry_after, message },
        StatusCode::PAYMENT_REQUIRED => LlmError::QuotaExhausted(message),
        _ => LlmError::ApiError {
            status: status.as_u16(),
            message,
        },
    })
}

/// Seconds form of `retry-after`; HTTP dates are not honoured
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
