//! Anti-forgery token cache with single-flight fetch.

use crate::error::ClientResult;
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Something that can obtain a fresh anti-forgery token from the server.
///
/// [`crate::ServicesClient`] implements this by POSTing `/user/token`; tests
/// inject counting fakes.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> ClientResult<String>;
}

/// Lazily populated cache for the anti-forgery token.
///
/// The cache slot is guarded by an async mutex that stays held across the
/// fetch await, so concurrent callers racing an empty cache collapse onto a
/// single underlying token request and share its result.
#[derive(Debug, Default)]
pub struct TokenStore {
    cached: Mutex<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, fetching it from `source` first if the cache
    /// is empty. A failed fetch leaves the cache empty and surfaces the
    /// error unretried.
    pub async fn get(&self, source: &dyn TokenSource) -> ClientResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = source.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Overwrite the cache unconditionally.
    pub async fn set(&self, token: impl Into<String>) {
        *self.cached.lock().await = Some(token.into());
    }

    /// Clear the cache; the next [`TokenStore::get`] re-fetches.
    pub async fn reset(&self) {
        *self.cached.lock().await = None;
    }

    /// Current cache contents without triggering a fetch.
    pub async fn peek(&self) -> Option<String> {
        self.cached.lock().await.clone()
    }
}
