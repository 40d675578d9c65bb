//! Travel-data error types
//!
//! These never escape the travel module's lookup methods; they exist so the
//! degradation to "no data" is logged with a reason.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("Token exchange failed with status {status}: {message}")]
    Auth { status: u16, message: String },

    #[error("Travel-data credentials unavailable: {0}")]
    Credentials(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
