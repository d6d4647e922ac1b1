//! In-process cache backed by a `DashMap` with per-entry expiry.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use regex::Regex;

use crate::cache::{AppCache, CacheError};
use crate::config::MemoryCacheConfig;

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// In-memory cache with size limit and TTL.
pub struct MemoryCache {
    store: DashMap<String, Entry>,
    max_size: usize,
    default_ttl: u64,
}

impl MemoryCache {
    pub fn new(config: &MemoryCacheConfig, default_ttl: u64) -> Self {
        Self {
            store: DashMap::new(),
            max_size: config.max_size.max(1),
            default_ttl,
        }
    }

    /// Make room for one more key: expired entries go first, then the entry
    /// closest to expiry.
    fn evict_if_full(&self, incoming: &str) {
        if self.store.len() < self.max_size || self.store.contains_key(incoming) {
            return;
        }

        let now = Instant::now();
        self.store.retain(|_, entry| !entry.is_expired(now));
        if self.store.len() < self.max_size {
            return;
        }

        let victim = self
            .store
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = victim {
            self.store.remove(&key);
        }
    }
}

/// Translate a Redis-style glob into an anchored regex.
pub(crate) fn glob_to_regex(pattern: &str) -> Result<Regex, CacheError> {
    let mut source = String::with_capacity(pattern.len() + 8);
    source.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    source.push('$');
    Regex::new(&source).map_err(|e| CacheError::Pattern(e.to_string()))
}

#[async_trait]
impl AppCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let now = Instant::now();
        let hit = match self.store.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if hit {
            self.store.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        self.evict_if_full(key);
        let ttl = Duration::from_secs(ttl_seconds.unwrap_or(self.default_ttl));
        self.store.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key);
        Ok(())
    }

    async fn invalidate_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = glob_to_regex(pattern)?;
        let before = self.store.len();
        self.store.retain(|key, _| !matcher.is_match(key));
        Ok(before.saturating_sub(self.store.len()))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max_size: usize) -> MemoryCache {
        MemoryCache::new(&MemoryCacheConfig { max_size }, 300)
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let cache = cache(10);
        cache.set("stats:jobs", b"42".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("stats:jobs").await.unwrap(), Some(b"42".to_vec()));

        cache.remove("stats:jobs").await.unwrap();
        assert_eq!(cache.get("stats:jobs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_expires_immediately() {
        let cache = cache(10);
        cache.set("jobs:x", b"1".to_vec(), Some(0)).await.unwrap();
        assert_eq!(cache.get("jobs:x").await.unwrap(), None);
        assert!(cache.store.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_pattern_only_touches_matching_keys() {
        let cache = cache(10);
        for key in [
            r#"jobs:{"remote":true}:1:20:postedDate:desc"#,
            "jobs:detail:5",
            "search:{}:1:20",
            "user:7:saved",
            "user:71:saved",
        ] {
            cache.set(key, b"v".to_vec(), None).await.unwrap();
        }

        assert_eq!(cache.invalidate_pattern("jobs:*").await.unwrap(), 2);
        assert_eq!(cache.invalidate_pattern("user:7:*").await.unwrap(), 1);
        assert!(cache.get("search:{}:1:20").await.unwrap().is_some());
        assert!(cache.get("user:71:saved").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_max_size_evicts_one_entry() {
        let cache = cache(2);
        cache.set("a", b"1".to_vec(), Some(10)).await.unwrap();
        cache.set("b", b"2".to_vec(), Some(600)).await.unwrap();
        cache.set("c", b"3".to_vec(), Some(600)).await.unwrap();

        assert_eq!(cache.store.len(), 2);
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_at_capacity_keeps_other_entries() {
        let cache = cache(2);
        cache.set("a", b"1".to_vec(), None).await.unwrap();
        cache.set("b", b"2".to_vec(), None).await.unwrap();
        cache.set("a", b"3".to_vec(), None).await.unwrap();

        assert_eq!(cache.get("a").await.unwrap(), Some(b"3".to_vec()));
        assert_eq!(cache.get("b").await.unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_glob_to_regex_escapes_metacharacters() {
        let re = glob_to_regex("jobs:{\"a\":[1]}:*").unwrap();
        assert!(re.is_match("jobs:{\"a\":[1]}:1:20"));
        assert!(!re.is_match("jobs:{\"a\":[2]}:1:20"));

        let re = glob_to_regex("user:?:*").unwrap();
        assert!(re.is_match("user:7:applied"));
        assert!(!re.is_match("user:77:applied"));
    }
}
