//! Caller authentication
//!
//! Resolves the credential presented with a generation request to a user
//! identity. The pipeline only needs "who is asking"; session handling lives
//! elsewhere.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::AuthConfig;
use crate::domain::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization credential required")]
    MissingCredential,

    #[error("Invalid credential")]
    InvalidCredential,
}

/// Resolves a credential to the user it belongs to
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credential: &str) -> Result<UserId, AuthError>;
}

/// Fixed credential table loaded from config
#[derive(Debug, Clone, Default)]
pub struct StaticAuthenticator {
    credentials: HashMap<String, UserId>,
}

impl StaticAuthenticator {
    pub fn new(credentials: HashMap<String, String>) -> Self {
        Self {
            credentials: credentials.into_iter().map(|(k, v)| (k, UserId::new(v))).collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.credentials.clone())
    }
}

/// Strip an optional `Bearer ` scheme and surrounding whitespace
fn bare_credential(credential: &str) -> &str {
    let trimmed = credential.trim();
    if trimmed.eq_ignore_ascii_case("bearer") {
        return "";
    }
    match trimmed.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => trimmed,
    }
}

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, credential: &str) -> Result<UserId, AuthError> {
        debug!("StaticAuthenticator::authenticate: called");
        let credential = bare_credential(credential);
        if credential.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        self.credentials
            .get(credential)
            .cloned()
            .ok_or(AuthError::InvalidCredential)
    }
}
