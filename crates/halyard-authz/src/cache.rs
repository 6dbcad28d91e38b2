//! Role caching for authorization.
//!
//! Caches each user's role set so warm invocations skip the storage round trip.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Configuration for the role cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of users in the cache.
    pub max_entries: usize,
    /// Time-to-live for a cached role set.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(300),
        }
    }
}

impl CacheConfig {
    /// Create a production cache configuration.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            max_entries: 50_000,
            ttl: Duration::from_secs(60),
        }
    }

    /// Create a development cache configuration.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(30),
        }
    }

    /// Disable caching.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_entries: 0,
            ttl: Duration::ZERO,
        }
    }

    /// Returns `true` if the cache stores anything.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.max_entries > 0 && !self.ttl.is_zero()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    roles: BTreeSet<String>,
    created_at: Instant,
}

impl CacheEntry {
    fn new(roles: BTreeSet<String>) -> Self {
        Self {
            roles,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of users currently in cache.
    pub size: usize,
    /// Number of evictions due to expiry or capacity.
    pub evictions: u64,
}

/// Per-user role cache.
#[derive(Debug)]
pub struct RoleCache {
    config: CacheConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl RoleCache {
    /// Create a new role cache.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns the cache configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the cached roles for a user.
    pub fn get(&self, user_id: &str) -> Option<BTreeSet<String>> {
        if !self.config.is_enabled() {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let entries = self.entries.read();
        if let Some(entry) = entries.get(user_id) {
            if !entry.is_expired(self.config.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.roles.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Cache the roles for a user.
    pub fn insert(&self, user_id: &str, roles: &BTreeSet<String>) {
        if !self.config.is_enabled() {
            return;
        }

        let mut entries = self.entries.write();

        if entries.len() >= self.config.max_entries && !entries.contains_key(user_id) {
            self.evict_expired(&mut entries);
        }

        while entries.len() >= self.config.max_entries && !entries.contains_key(user_id) {
            let Some(oldest) = Self::find_oldest(&entries) else {
                break;
            };
            entries.remove(&oldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        entries.insert(user_id.to_owned(), CacheEntry::new(roles.clone()));
    }

    /// Drop one user's cached roles.
    pub fn invalidate(&self, user_id: &str) {
        self.entries.write().remove(user_id);
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.entries.read().len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict_expired(&self, entries: &mut HashMap<String, CacheEntry>) {
        let ttl = self.config.ttl;
        let before = entries.len();
        entries.retain(|_, v| !v.is_expired(ttl));
        let evicted = before - entries.len();
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }

    fn find_oldest(entries: &HashMap<String, CacheEntry>) -> Option<String> {
        entries
            .iter()
            .min_by_key(|(_, v)| v.created_at)
            .map(|(k, _)| k.clone())
    }
}

impl Default for RoleCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_cache_hit_miss() {
        let cache = RoleCache::default();

        assert!(cache.get("u-1").is_none());

        cache.insert("u-1", &roles(&["admin"]));
        assert_eq!(cache.get("u-1"), Some(roles(&["admin"])));
    }

    #[test]
    fn test_cache_stats() {
        let cache = RoleCache::default();

        cache.get("u-1"); // miss
        cache.insert("u-1", &roles(&["reader"]));
        cache.get("u-1"); // hit
        cache.get("u-1"); // hit

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_cache_disabled() {
        let cache = RoleCache::new(CacheConfig::disabled());
        cache.insert("u-1", &roles(&["admin"]));
        assert!(cache.get("u-1").is_none());
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache = RoleCache::new(CacheConfig {
            max_entries: 10,
            ttl: Duration::from_millis(1),
        });
        cache.insert("u-1", &roles(&["admin"]));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("u-1").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = RoleCache::new(CacheConfig {
            max_entries: 2,
            ttl: Duration::from_secs(60),
        });
        cache.insert("u-1", &roles(&["a"]));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("u-2", &roles(&["b"]));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("u-3", &roles(&["c"]));

        assert!(cache.get("u-1").is_none());
        assert!(cache.get("u-2").is_some());
        assert!(cache.get("u-3").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_reinsert_at_capacity_does_not_evict() {
        let cache = RoleCache::new(CacheConfig {
            max_entries: 1,
            ttl: Duration::from_secs(60),
        });
        cache.insert("u-1", &roles(&["a"]));
        cache.insert("u-1", &roles(&["a", "b"]));
        assert_eq!(cache.get("u-1"), Some(roles(&["a", "b"])));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = RoleCache::default();
        cache.insert("u-1", &roles(&["a"]));
        cache.insert("u-2", &roles(&["b"]));

        cache.invalidate("u-1");
        assert!(cache.get("u-1").is_none());
        assert!(cache.get("u-2").is_some());

        cache.clear();
        assert!(cache.get("u-2").is_none());
    }
}
