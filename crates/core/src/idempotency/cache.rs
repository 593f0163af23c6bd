//! Fast-path idempotency cache.
//!
//! The cache remembers recently consumed tokens so that an obvious repeat
//! can be answered without opening a transaction. A miss, an expired
//! entry, or a cache failure all fall through to the authoritative check
//! in the ledger store.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use thiserror::Error;

/// Default cache capacity (number of tokens).
const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

/// Idempotency cache failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The cache backend could not be reached.
    #[error("Idempotency cache unavailable: {0}")]
    Unavailable(String),
}

/// Store of recently consumed token keys.
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Returns true if `key` was recorded and has not expired.
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Records `key` for `ttl`.
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Expires each token after the TTL it was stored with.
struct TokenExpiry;

impl Expiry<String, Duration> for TokenExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        ttl: &Duration,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(*ttl)
    }
}

/// In-process idempotency cache backed by Moka.
///
/// Thread-safe and cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct MokaIdempotencyCache {
    cache: Cache<String, Duration>,
}

impl MokaIdempotencyCache {
    /// Creates a cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache holding at most `max_capacity` tokens.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(TokenExpiry)
            .build();

        Self { cache }
    }

    /// Returns the number of tokens currently cached.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs cache maintenance tasks.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for MokaIdempotencyCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdempotencyCache for MokaIdempotencyCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn set(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), ttl).await;
        Ok(())
    }
}

/// Cache that never remembers anything.
///
/// Every operation then goes to the ledger store, which is still correct.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIdempotencyCache;

#[async_trait]
impl IdempotencyCache for NoopIdempotencyCache {
    async fn exists(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn set(&self, _key: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
