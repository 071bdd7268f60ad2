// Time-boxed cache and the caching location source decorator
use crate::application::location_source::{FetchError, LocationSource};
use crate::domain::driver::DriverId;
use crate::domain::location::DriverLocationFix;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Cache key for the full driver location set
pub const DRIVER_LOCATIONS_KEY: &str = "driver-locations";

pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory cache; entries vanish once their expiry passes
pub struct MemoryCache<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send> Cache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();
        entries.retain(|_, e| e.expires_at > now);
        entries.get(key).map(|e| e.value.clone())
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

/// Serves `fetch_all` from the cache while the entry is fresh.
/// Single-driver lookups always go to the inner source.
pub struct CachedLocationSource {
    inner: Arc<dyn LocationSource>,
    cache: Arc<dyn Cache<Vec<DriverLocationFix>>>,
    ttl: Duration,
}

impl CachedLocationSource {
    pub fn new(
        inner: Arc<dyn LocationSource>,
        cache: Arc<dyn Cache<Vec<DriverLocationFix>>>,
        ttl: Duration,
    ) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl LocationSource for CachedLocationSource {
    async fn fetch_all(&self) -> Result<Vec<DriverLocationFix>, FetchError> {
        if let Some(fixes) = self.cache.get(DRIVER_LOCATIONS_KEY) {
            tracing::debug!("Serving {} driver locations from cache", fixes.len());
            return Ok(fixes);
        }

        let fixes = self.inner.fetch_all().await?;
        self.cache.set(DRIVER_LOCATIONS_KEY, fixes.clone(), self.ttl);
        Ok(fixes)
    }

    async fn fetch_one(&self, driver_id: DriverId) -> Result<DriverLocationFix, FetchError> {
        self.inner.fetch_one(driver_id).await
    }
}
