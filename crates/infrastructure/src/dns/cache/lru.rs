//! Bounded LRU response cache with TTL expiry checked at read time.

use super::key::CacheKey;
use crate::dns::forwarding::{cap_ttls, min_ttl};
use ferrous_relay_application::ports::{DnsCachePort, MetricsPort};
use hickory_proto::op::Message;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

struct CachedResponse {
    response: Message,
    expires_at: Instant,
}

impl CachedResponse {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct LruDnsCache {
    entries: Mutex<LruCache<CacheKey, CachedResponse>>,
    metrics: Arc<dyn MetricsPort>,
}

impl LruDnsCache {
    pub fn new(capacity: NonZeroUsize, metrics: Arc<dyn MetricsPort>) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            metrics,
        }
    }
}

impl DnsCachePort for LruDnsCache {
    fn get(&self, request: &Message) -> Option<Message> {
        let key = CacheKey::from_request(request)?;
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = entries.get(&key) else {
            self.metrics.cache_missed();
            return None;
        };

        if entry.is_expired(now) {
            entries.pop(&key);
            self.metrics.cache_expired();
            self.metrics.cache_missed();
            debug!(domain = %key.name, record_type = %key.record_type, "Cache entry expired");
            return None;
        }

        let remaining = entry.expires_at.saturating_duration_since(now).as_secs();
        let mut response = entry.response.clone();
        drop(entries);

        cap_ttls(&mut response, u32::try_from(remaining).unwrap_or(u32::MAX));
        self.metrics.cache_hit();
        Some(response)
    }

    fn add(&self, request: &Message, response: &Message) {
        let Some(key) = CacheKey::from_request(request) else {
            return;
        };
        let ttl = match min_ttl(response) {
            Some(ttl) if ttl > 0 => ttl,
            _ => return,
        };

        let entry = CachedResponse {
            response: response.clone(),
            expires_at: Instant::now() + Duration::from_secs(u64::from(ttl)),
        };

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((evicted_key, _)) = entries.push(key.clone(), entry) {
            if evicted_key != key {
                self.metrics.cache_evicted();
            }
        }
        drop(entries);

        self.metrics.cache_inserted();
    }

    fn remove(&self, request: &Message) {
        let Some(key) = CacheKey::from_request(request) else {
            return;
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop(&key);
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
