use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Semaphore;

use crate::model::{Listing, Ms};

/// Listing-directory collaborator: resolves an apartment scope id to display
/// metadata. Resolution failure is expressed as `None` and must never fail a
/// calendar projection.
#[async_trait]
pub trait ListingDirectory: Send + Sync {
    async fn get_listing(&self, scope_id: &str) -> Option<Listing>;
}

/// Directory that knows nothing. Every event degrades to `null` metadata.
pub struct NullDirectory;

#[async_trait]
impl ListingDirectory for NullDirectory {
    async fn get_listing(&self, _scope_id: &str) -> Option<Listing> {
        None
    }
}

/// Fixed in-memory directory, for tests and embedders that preload listings.
pub struct StaticDirectory {
    listings: DashMap<String, Listing>,
}

impl Default for StaticDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self {
            listings: DashMap::new(),
        }
    }

    pub fn insert(&self, listing: Listing) {
        self.listings.insert(listing.id.clone(), listing);
    }
}

#[async_trait]
impl ListingDirectory for StaticDirectory {
    async fn get_listing(&self, scope_id: &str) -> Option<Listing> {
        self.listings.get(scope_id).map(|e| e.value().clone())
    }
}

/// TTL-cached, bounded-concurrency wrapper around a slow or rate-limited
/// directory. Hits are answered from the cache; misses go through a
/// semaphore so at most `max_in_flight` upstream lookups run at once.
/// Negative results are cached too, on a shorter TTL.
pub struct CachedDirectory<D> {
    inner: D,
    cache: DashMap<String, (Option<Listing>, Ms)>,
    permits: Semaphore,
    ttl_ms: Ms,
    negative_ttl_ms: Ms,
}

impl<D: ListingDirectory> CachedDirectory<D> {
    pub fn new(inner: D, max_in_flight: usize, ttl_ms: Ms, negative_ttl_ms: Ms) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            permits: Semaphore::new(max_in_flight),
            ttl_ms,
            negative_ttl_ms,
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn now_ms() -> Ms {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis() as Ms
    }
}

#[async_trait]
impl<D: ListingDirectory> ListingDirectory for CachedDirectory<D> {
    async fn get_listing(&self, scope_id: &str) -> Option<Listing> {
        let now = Self::now_ms();
        if let Some(entry) = self.cache.get(scope_id) {
            let (cached, expires_at) = entry.value();
            if *expires_at > now {
                metrics::counter!(crate::observability::DIRECTORY_CACHE_HITS_TOTAL).increment(1);
                return cached.clone();
            }
        }
        self.cache.remove(scope_id);
        metrics::counter!(crate::observability::DIRECTORY_CACHE_MISSES_TOTAL).increment(1);

        let _permit = self.permits.acquire().await.ok()?;
        let result = self.inner.get_listing(scope_id).await;
        let ttl = if result.is_some() {
            self.ttl_ms
        } else {
            self.negative_ttl_ms
        };
        self.cache
            .insert(scope_id.to_string(), (result.clone(), now + ttl));
        result
    }
}
