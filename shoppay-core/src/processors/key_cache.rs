//! Time-bounded cache for the processor's public key.
//!
//! Every payment needs the processor's current RSA key. With a TTL of
//! zero the key is fetched on every call. Otherwise the last key is reused
//! until it is older than the TTL or the endpoint changes (for example
//! after a config reload), so a rotated key is picked up within one TTL.

use rsa::RsaPublicKey;
use shoppay_sdk::client::{KeyRetrievalError, PublicKeyFetcher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

struct CachedKey {
    url: Url,
    key: Arc<RsaPublicKey>,
    fetched_at: Instant,
}

impl CachedKey {
    fn fresh_for(&self, url: &Url, ttl: Duration) -> Option<Arc<RsaPublicKey>> {
        (self.url == *url && self.fetched_at.elapsed() < ttl).then(|| Arc::clone(&self.key))
    }
}

/// Shared across requests; cheap to clone behind an `Arc`.
#[derive(Default)]
pub struct PublicKeyCache {
    slot: RwLock<Option<CachedKey>>,
}

impl PublicKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a key no older than `ttl`, fetching through `fetcher` if needed.
    pub async fn get(
        &self,
        fetcher: &PublicKeyFetcher,
        ttl: Duration,
    ) -> Result<Arc<RsaPublicKey>, KeyRetrievalError> {
        if ttl.is_zero() {
            return Ok(Arc::new(fetcher.fetch().await?));
        }

        if let Some(key) = self
            .slot
            .read()
            .await
            .as_ref()
            .and_then(|cached| cached.fresh_for(fetcher.url(), ttl))
        {
            debug!("Using cached processor public key");
            return Ok(key);
        }

        let key = Arc::new(fetcher.fetch().await?);
        *self.slot.write().await = Some(CachedKey {
            url: fetcher.url().clone(),
            key: Arc::clone(&key),
            fetched_at: Instant::now(),
        });
        Ok(key)
    }

    /// Forget the cached key.
    pub async fn clear(&self) {
        self.slot.write().await.take();
    }
}
