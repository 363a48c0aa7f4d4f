// cache.rs
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::graphql::FetchOutcome;
use super::models::NormalizedListing;
use super::ListingsError;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Time source for cache expiry. Swapped for a manual clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    listings: Arc<Vec<NormalizedListing>>,
    fetched_at: Instant,
    pages_fetched: usize,
    truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub populated: bool,
    pub fresh: bool,
    pub listings: usize,
    pub pages_fetched: usize,
    pub truncated: bool,
    pub age_secs: Option<u64>,
}

/// Single-slot cache holding the whole normalized collection.
///
/// The slot is only ever replaced wholesale. Refreshes are serialized on
/// `refresh_lock` so concurrent misses share one upstream fetch.
pub struct ListingsCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: RwLock<Option<CacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl ListingsCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Cached listings if present and younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<Vec<NormalizedListing>>> {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.listings))
    }

    /// Cached listings regardless of age.
    pub fn stale(&self) -> Option<Arc<Vec<NormalizedListing>>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|entry| Arc::clone(&entry.listings))
    }

    /// Returns fresh data, or runs `refresh` and stores its outcome.
    ///
    /// A failed refresh leaves the slot as it was.
    pub fn get_or_refresh<F>(&self, refresh: F) -> Result<Arc<Vec<NormalizedListing>>, ListingsError>
    where
        F: FnOnce() -> Result<FetchOutcome, ListingsError>,
    {
        if let Some(listings) = self.fresh() {
            tracing::debug!(count = listings.len(), "listings cache hit");
            return Ok(listings);
        }

        let _guard = self.refresh_lock.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have refreshed while we waited.
        if let Some(listings) = self.fresh() {
            tracing::debug!(count = listings.len(), "listings cache filled by concurrent refresh");
            return Ok(listings);
        }

        tracing::info!("listings cache miss, refreshing");
        let outcome = refresh()?;
        Ok(self.store(outcome))
    }

    fn store(&self, outcome: FetchOutcome) -> Arc<Vec<NormalizedListing>> {
        let listings = Arc::new(outcome.listings);
        let entry = CacheEntry {
            listings: Arc::clone(&listings),
            fetched_at: self.clock.now(),
            pages_fetched: outcome.pages_fetched,
            truncated: outcome.truncated,
        };

        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(entry);
        listings
    }

    pub fn status(&self) -> CacheStatus {
        let now = self.clock.now();
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());

        match slot.as_ref() {
            Some(entry) => {
                let age = now.saturating_duration_since(entry.fetched_at);
                CacheStatus {
                    populated: true,
                    fresh: age < self.ttl,
                    listings: entry.listings.len(),
                    pages_fetched: entry.pages_fetched,
                    truncated: entry.truncated,
                    age_secs: Some(age.as_secs()),
                }
            }
            None => CacheStatus {
                populated: false,
                fresh: false,
                listings: 0,
                pages_fetched: 0,
                truncated: false,
                age_secs: None,
            },
        }
    }
}
