// src/services/road_cache.rs
// DOCUMENTATION: In-memory cache for road networks fetched from Overpass
// PURPOSE: Avoid re-querying the road service for the same search area

use crate::models::BoundingBox;
use geo_types::LineString;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache entry with expiration
#[derive(Clone, Debug)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

type Roads = Arc<Vec<LineString<f64>>>;

/// Road network cache with TTL
/// DOCUMENTATION: Thread-safe; shared by all workers through an Arc
pub struct RoadCache {
    store: RwLock<HashMap<String, CacheEntry<Roads>>>,
    default_ttl: Duration,
}

impl RoadCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Generate cache key from a bounding box
    pub fn generate_key(bbox: &BoundingBox) -> String {
        format!(
            "roads:{}:{}:{}:{}",
            (bbox.min_lat * 10000.0).round() as i64, // Round to ~10m precision
            (bbox.min_lon * 10000.0).round() as i64,
            (bbox.max_lat * 10000.0).round() as i64,
            (bbox.max_lon * 10000.0).round() as i64,
        )
    }

    /// Get cached roads
    pub async fn get(&self, key: &str) -> Option<Roads> {
        let store = self.store.read().await;

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                log::debug!("Road cache HIT for key: {}", key);
                Some(entry.data.clone())
            }
            Some(_) => {
                log::debug!("Road cache EXPIRED for key: {}", key);
                None
            }
            None => {
                log::debug!("Road cache MISS for key: {}", key);
                None
            }
        }
    }

    /// Set cached roads with default TTL
    pub async fn set(&self, key: String, roads: Roads) {
        let mut store = self.store.write().await;
        log::debug!(
            "Road cache SET for key: {} ({} roads, TTL: {}s)",
            key,
            roads.len(),
            self.default_ttl.as_secs()
        );
        store.insert(key, CacheEntry::new(roads, self.default_ttl));
    }

    /// Clear expired entries
    pub async fn cleanup(&self) {
        let mut store = self.store.write().await;
        let before_count = store.len();
        store.retain(|_, entry| !entry.is_expired());
        let after_count = store.len();

        if before_count > after_count {
            log::info!(
                "Road cache cleanup: removed {} expired entries ({} remaining)",
                before_count - after_count,
                after_count
            );
        }
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        let total = store.len();
        let expired = store.values().filter(|e| e.is_expired()).count();

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

/// Cache statistics
#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes expired entries
pub fn start_cleanup_task(cache: Arc<RoadCache>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roads() -> Roads {
        Arc::new(vec![LineString::from(vec![(37.61, 55.75), (37.62, 55.76)])])
    }

    fn bbox(min_lat: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            min_lon: 37.6,
            max_lat: min_lat + 0.02,
            max_lon: 37.64,
        }
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = RoadCache::new(60);
        let key = RoadCache::generate_key(&bbox(55.74));

        cache.set(key.clone(), roads()).await;
        let result = cache.get(&key).await;

        assert_eq!(result.map(|r| r.len()), Some(1));
    }

    #[tokio::test]
    async fn test_cache_expiration() {
        let cache = RoadCache::new(1); // 1 second TTL
        let key = RoadCache::generate_key(&bbox(55.74));

        cache.set(key.clone(), roads()).await;
        assert!(cache.get(&key).await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(cache.get(&key).await.is_none());
    }

    #[test]
    fn test_generate_key() {
        let key1 = RoadCache::generate_key(&bbox(55.7400));
        let key2 = RoadCache::generate_key(&bbox(55.74001));
        let key3 = RoadCache::generate_key(&bbox(55.7410));

        assert_eq!(key1, key2); // Sub-10m jitter maps to the same key
        assert_ne!(key1, key3);
    }

    #[tokio::test]
    async fn test_cache_cleanup() {
        let cache = RoadCache::new(1);

        cache.set("a".to_string(), roads()).await;
        cache.set("b".to_string(), roads()).await;

        tokio::time::sleep(Duration::from_secs(2)).await;

        cache.cleanup().await;

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.active_entries, 0);
    }
}
