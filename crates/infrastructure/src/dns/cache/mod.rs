pub mod key;
pub mod lru;
pub mod noop;

pub use key::CacheKey;
pub use lru::LruDnsCache;
pub use noop::NoopDnsCache;

use ferrous_relay_application::ports::{DnsCachePort, MetricsPort};
use ferrous_relay_domain::{CacheConfig, CacheType};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{info, warn};

/// Selects the cache strategy once, from already validated settings.
pub fn build_cache(config: &CacheConfig, metrics: Arc<dyn MetricsPort>) -> Arc<dyn DnsCachePort> {
    match config.cache_type {
        CacheType::Lru => match NonZeroUsize::new(config.max_entries) {
            Some(capacity) => {
                info!(max_entries = config.max_entries, "Initializing LRU DNS cache");
                Arc::new(LruDnsCache::new(capacity, metrics))
            }
            None => {
                warn!("LRU cache with zero capacity, caching disabled");
                Arc::new(NoopDnsCache)
            }
        },
        CacheType::Noop => {
            info!(cache_type = config.cache_type.as_str(), "DNS cache disabled");
            Arc::new(NoopDnsCache)
        }
    }
}
