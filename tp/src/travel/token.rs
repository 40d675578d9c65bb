//! Cached bearer token with expiry tracking
//!
//! One cache per travel client. The lock is held across a refresh so
//! concurrent callers that find the token stale wait for the single
//! in-flight exchange instead of starting their own.

use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Longest lifetime honoured for an issued token
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// A token freshly issued by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    /// Lifetime in seconds from issuance
    pub expires_in_secs: u64,
}

#[derive(Debug)]
struct StoredToken {
    value: String,
    expires_at: Instant,
}

/// Expiring token cache guarded by an async lock
#[derive(Debug)]
pub struct TokenCache {
    margin: Duration,
    current: Mutex<Option<StoredToken>>,
}

impl TokenCache {
    /// A cache that stops using a token `margin` before it expires
    pub fn new(margin: Duration) -> Self {
        Self {
            margin,
            current: Mutex::new(None),
        }
    }

    /// Return the cached token, or run `refresh` and cache its result
    ///
    /// A failed refresh leaves the cache empty and returns the error.
    pub async fn get_or_refresh<F, Fut, E>(&self, refresh: F) -> Result<String, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<IssuedToken, E>>,
    {
        let mut current = self.current.lock().await;

        // A margin too large to add to the clock makes every token stale
        if let Some(stored) = current.as_ref()
            && Instant::now()
                .checked_add(self.margin)
                .is_some_and(|deadline| deadline < stored.expires_at)
        {
            debug!("TokenCache::get_or_refresh: cache hit");
            return Ok(stored.value.clone());
        }

        debug!("TokenCache::get_or_refresh: refreshing");
        *current = None;
        let issued = refresh().await?;
        let lifetime = Duration::from_secs(issued.expires_in_secs).min(MAX_TOKEN_LIFETIME);
        let expires_at = Instant::now() + lifetime;
        *current = Some(StoredToken {
            value: issued.value.clone(),
            expires_at,
        });

        Ok(issued.value)
    }

    /// Drop the cached token
    pub async fn clear(&self) {
        debug!("TokenCache::clear: called");
        *self.current.lock().await = None;
    }
}
