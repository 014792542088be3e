//! In-memory response cache for the LLM client

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

const DEFAULT_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// TTL cache keyed by content hash.
///
/// When full, expired entries are dropped first; if none have expired the
/// entry closest to expiry is evicted.
pub struct LLMCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl LLMCache {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_CAPACITY)
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Get cached value if present and not expired
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;
        (Instant::now() < entry.expires_at).then(|| entry.value.clone())
    }

    pub fn set(&self, key: String, value: String) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        let now = Instant::now();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            entries.retain(|_, e| now < e.expires_at);
            if entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LLMCache {
    fn default() -> Self {
        Self::new()
    }
}

fn hashed_key(kind: &str, model: &str, payload: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(model.as_bytes());
    hasher.update(&[0]);
    hasher.update(payload.as_bytes());
    format!("{}:{}:{}", kind, model, &hasher.finalize().to_hex()[..32])
}

/// Cache key for an embedding request
pub fn embedding_cache_key(model: &str, text: &str) -> String {
    hashed_key("embed", model, text)
}

/// Cache key for a chat completion request
pub fn chat_cache_key(model: &str, messages: &str) -> String {
    hashed_key("chat", model, messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_basic() {
        let cache = LLMCache::new();
        cache.set("key1".to_string(), "value1".to_string());
        assert_eq!(cache.get("key1"), Some("value1".to_string()));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn test_cache_expiry() {
        let cache = LLMCache::with_limits(Duration::from_millis(50), 8);
        cache.set("key1".to_string(), "value1".to_string());
        std::thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get("key1"), None);
    }

    #[test]
    fn test_cache_capacity_evicts() {
        let cache = LLMCache::with_limits(Duration::from_secs(60), 2);
        cache.set("a".to_string(), "1".to_string());
        std::thread::sleep(Duration::from_millis(2));
        cache.set("b".to_string(), "2".to_string());
        cache.set("c".to_string(), "3".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some("3".to_string()));
    }

    #[test]
    fn test_cache_key_generation() {
        let key1 = embedding_cache_key("model1", "text1");
        let key2 = embedding_cache_key("model1", "text1");
        let key3 = embedding_cache_key("model1", "text2");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_ne!(key1, chat_cache_key("model1", "text1"));
    }
}
