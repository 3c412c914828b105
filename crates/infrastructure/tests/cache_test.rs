mod helpers;

use ferrous_relay_application::ports::DnsCachePort;
use ferrous_relay_domain::{CacheConfig, CacheType};
use ferrous_relay_infrastructure::dns::cache::{build_cache, LruDnsCache};
use ferrous_relay_infrastructure::dns::metrics::CounterMetrics;
use helpers::{address_response, query};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

fn lru(capacity: usize) -> (LruDnsCache, Arc<CounterMetrics>) {
    let metrics = Arc::new(CounterMetrics::new());
    let cache = LruDnsCache::new(NonZeroUsize::new(capacity).unwrap(), metrics.clone());
    (cache, metrics)
}

fn store(cache: &LruDnsCache, name: &str, ttl: u32) {
    let request = query(name, RecordType::A);
    cache.add(&request, &address_response(&request, "192.0.2.10".parse().unwrap(), ttl));
}

fn hit(cache: &LruDnsCache, name: &str) -> bool {
    cache.get(&query(name, RecordType::A)).is_some()
}

#[tokio::test(start_paused = true)]
async fn test_entry_served_until_ttl_then_missed() {
    let (cache, metrics) = lru(16);
    store(&cache, "example.com.", 60);

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(hit(&cache, "example.com."));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!hit(&cache, "example.com."));

    assert_eq!(metrics.cache_hits(), 1);
    assert_eq!(metrics.cache_expirations(), 1);
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hit_lowers_ttl_to_remaining_lifetime() {
    let (cache, _) = lru(16);
    store(&cache, "example.com.", 300);

    tokio::time::advance(Duration::from_secs(100)).await;
    let cached = cache.get(&query("example.com.", RecordType::A)).unwrap();

    assert_eq!(cached.answers()[0].ttl(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_zero_ttl_is_never_cached() {
    let (cache, metrics) = lru(16);
    store(&cache, "zero.example.", 0);

    assert!(!hit(&cache, "zero.example."));
    assert_eq!(metrics.cache_inserts(), 0);
}

#[tokio::test]
async fn test_response_without_records_is_not_cached() {
    let (cache, _) = lru(16);
    let request = query("empty.example.", RecordType::A);
    let empty = ferrous_relay_application::services::reply_with_code(&request, ResponseCode::NoError);

    cache.add(&request, &empty);

    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_least_recently_used_entry_evicted_first() {
    let (cache, metrics) = lru(2);
    store(&cache, "a.example.", 300);
    store(&cache, "b.example.", 300);

    assert!(hit(&cache, "a.example."));
    store(&cache, "c.example.", 300);

    assert!(hit(&cache, "a.example."));
    assert!(!hit(&cache, "b.example."));
    assert!(hit(&cache, "c.example."));
    assert_eq!(metrics.cache_evictions(), 1);
}

#[tokio::test]
async fn test_replacing_entry_is_not_an_eviction() {
    let (cache, metrics) = lru(2);
    store(&cache, "a.example.", 300);
    store(&cache, "a.example.", 600);

    assert_eq!(cache.len(), 1);
    assert_eq!(metrics.cache_evictions(), 0);
    assert_eq!(metrics.cache_inserts(), 2);
}

#[tokio::test]
async fn test_key_ignores_case_and_separates_types() {
    let (cache, _) = lru(16);
    store(&cache, "Example.COM.", 300);

    assert!(hit(&cache, "example.com."));
    assert!(cache.get(&query("example.com.", RecordType::AAAA)).is_none());
}

#[tokio::test]
async fn test_remove_purges_entry() {
    let (cache, _) = lru(16);
    store(&cache, "gone.example.", 300);

    cache.remove(&query("gone.example.", RecordType::A));

    assert!(!hit(&cache, "gone.example."));
}

#[tokio::test]
async fn test_noop_cache_never_stores() {
    let config = CacheConfig {
        cache_type: CacheType::Noop,
        max_entries: 10,
    };
    let cache = build_cache(&config, Arc::new(CounterMetrics::new()));
    let request = query("example.com.", RecordType::A);

    cache.add(&request, &address_response(&request, "192.0.2.1".parse().unwrap(), 300));

    assert!(cache.get(&request).is_none());
    assert!(cache.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access_stays_bounded() {
    let metrics = Arc::new(CounterMetrics::new());
    let cache = Arc::new(LruDnsCache::new(NonZeroUsize::new(64).unwrap(), metrics));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..200 {
        let cache = cache.clone();
        tasks.spawn(async move {
            let name = format!("host{}.example.", i % 100);
            let request = query(&name, RecordType::A);
            cache.add(&request, &address_response(&request, "192.0.2.1".parse().unwrap(), 300));
            let _ = cache.get(&request);
            if i % 7 == 0 {
                cache.remove(&request);
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert!(cache.len() <= 64);
}
