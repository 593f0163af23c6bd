//! Best-effort token lookups around the fast-path cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::IdempotencyKey;
use super::cache::{IdempotencyCache, NoopIdempotencyCache};

/// Default time a consumed token stays cached.
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(30);

/// Wraps an [`IdempotencyCache`] so that cache failures never fail an
/// operation.
#[derive(Clone)]
pub struct IdempotencyGuard {
    cache: Arc<dyn IdempotencyCache>,
    ttl: Duration,
}

impl IdempotencyGuard {
    /// Creates a guard over `cache` remembering tokens for `ttl`.
    #[must_use]
    pub fn new(cache: Arc<dyn IdempotencyCache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Guard that always defers to the ledger store.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopIdempotencyCache), DEFAULT_KEY_TTL)
    }

    /// How long consumed tokens stay cached.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns true only if the cache positively knows the token was used.
    pub async fn seen(&self, key: &IdempotencyKey) -> bool {
        match self.cache.exists(&key.cache_key()).await {
            Ok(true) => {
                debug!(key = %key, "Idempotency token found in cache");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(error = %e, key = %key, "Idempotency cache lookup failed");
                false
            }
        }
    }

    /// Records a consumed token. Failures are logged and swallowed.
    pub async fn remember(&self, key: &IdempotencyKey) {
        if let Err(e) = self.cache.set(&key.cache_key(), self.ttl).await {
            warn!(error = %e, key = %key, "Failed to cache idempotency token");
        }
    }
}

impl std::fmt::Debug for IdempotencyGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotencyGuard")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
