//! In-process counters, readable by tests and by the shutdown summary.

use dashmap::DashMap;
use ferrous_relay_application::ports::{DialOutcome, MetricsPort};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{DNSClass, RecordType};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSizes {
    pub hostnames: usize,
    pub ips: usize,
    pub prefixes: usize,
}

#[derive(Default)]
pub struct CounterMetrics {
    cache_inserts: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    cache_expired: AtomicU64,
    cache_evictions: AtomicU64,

    blocked_hostnames: AtomicUsize,
    blocked_ips: AtomicUsize,
    blocked_prefixes: AtomicUsize,
    requests_filtered: DashMap<String, u64>,
    responses_filtered: DashMap<String, u64>,

    requests: AtomicU64,
    responses: AtomicU64,
    inflight: AtomicI64,
    questions: DashMap<String, u64>,
    answers: DashMap<String, u64>,
    response_codes: DashMap<String, u64>,

    upstream_dials: DashMap<String, u64>,
}

fn bump(map: &DashMap<String, u64>, label: String) {
    map.entry(label).and_modify(|c| *c += 1).or_insert(1);
}

fn question_label(class: DNSClass, record_type: RecordType) -> String {
    format!("{class}/{record_type}")
}

fn read(map: &DashMap<String, u64>, label: &str) -> u64 {
    map.get(label).map(|c| *c).unwrap_or(0)
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_inserts(&self) -> u64 {
        self.cache_inserts.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn cache_expirations(&self) -> u64 {
        self.cache_expired.load(Ordering::Relaxed)
    }

    pub fn cache_evictions(&self) -> u64 {
        self.cache_evictions.load(Ordering::Relaxed)
    }

    pub fn filter_sizes_snapshot(&self) -> FilterSizes {
        FilterSizes {
            hostnames: self.blocked_hostnames.load(Ordering::Relaxed),
            ips: self.blocked_ips.load(Ordering::Relaxed),
            prefixes: self.blocked_prefixes.load(Ordering::Relaxed),
        }
    }

    pub fn requests_filtered(&self, class: DNSClass, record_type: RecordType) -> u64 {
        read(&self.requests_filtered, &question_label(class, record_type))
    }

    pub fn responses_filtered(&self, class: DNSClass, record_type: RecordType) -> u64 {
        read(&self.responses_filtered, &question_label(class, record_type))
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn responses(&self) -> u64 {
        self.responses.load(Ordering::Relaxed)
    }

    pub fn inflight(&self) -> i64 {
        self.inflight.load(Ordering::Relaxed)
    }

    pub fn questions(&self, class: DNSClass, record_type: RecordType) -> u64 {
        read(&self.questions, &question_label(class, record_type))
    }

    pub fn answers(&self, class: DNSClass, record_type: RecordType) -> u64 {
        read(&self.answers, &question_label(class, record_type))
    }

    pub fn response_codes(&self, code: ResponseCode) -> u64 {
        read(&self.response_codes, &code.to_string())
    }

    pub fn upstream_dials(&self, provider: &str, address: &str, outcome: DialOutcome) -> u64 {
        read(
            &self.upstream_dials,
            &format!("{provider}/{address}/{}", outcome.as_str()),
        )
    }
}

impl MetricsPort for CounterMetrics {
    fn cache_inserted(&self) {
        self.cache_inserts.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_missed(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_expired(&self) {
        self.cache_expired.fetch_add(1, Ordering::Relaxed);
    }

    fn cache_evicted(&self) {
        self.cache_evictions.fetch_add(1, Ordering::Relaxed);
    }

    fn filter_sizes(&self, hostnames: usize, ips: usize, prefixes: usize) {
        self.blocked_hostnames.store(hostnames, Ordering::Relaxed);
        self.blocked_ips.store(ips, Ordering::Relaxed);
        self.blocked_prefixes.store(prefixes, Ordering::Relaxed);
    }

    fn request_filtered(&self, class: DNSClass, record_type: RecordType) {
        bump(&self.requests_filtered, question_label(class, record_type));
    }

    fn response_filtered(&self, class: DNSClass, record_type: RecordType) {
        bump(&self.responses_filtered, question_label(class, record_type));
    }

    fn request_received(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn question_received(&self, class: DNSClass, record_type: RecordType) {
        bump(&self.questions, question_label(class, record_type));
    }

    fn inflight_changed(&self, delta: i64) {
        self.inflight.fetch_add(delta, Ordering::Relaxed);
    }

    fn response_code(&self, code: ResponseCode) {
        bump(&self.response_codes, code.to_string());
    }

    fn answer_sent(&self, class: DNSClass, record_type: RecordType) {
        bump(&self.answers, question_label(class, record_type));
    }

    fn response_sent(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    fn upstream_dial(&self, provider: &str, address: &str, outcome: DialOutcome) {
        bump(
            &self.upstream_dials,
            format!("{provider}/{address}/{}", outcome.as_str()),
        );
    }
}
