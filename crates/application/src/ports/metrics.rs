use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{DNSClass, RecordType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialOutcome {
    Success,
    Error,
}

impl DialOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialOutcome::Success => "success",
            DialOutcome::Error => "error",
        }
    }
}

/// Operational counters and gauges. Every method is called concurrently
/// from in-flight queries.
pub trait MetricsPort: Send + Sync {
    fn cache_inserted(&self);
    fn cache_hit(&self);
    fn cache_missed(&self);
    fn cache_expired(&self);
    fn cache_evicted(&self);

    fn filter_sizes(&self, hostnames: usize, ips: usize, prefixes: usize);
    fn request_filtered(&self, class: DNSClass, record_type: RecordType);
    fn response_filtered(&self, class: DNSClass, record_type: RecordType);

    fn request_received(&self);
    fn question_received(&self, class: DNSClass, record_type: RecordType);
    fn inflight_changed(&self, delta: i64);
    fn response_code(&self, code: ResponseCode);
    fn answer_sent(&self, class: DNSClass, record_type: RecordType);
    fn response_sent(&self);

    fn upstream_dial(&self, provider: &str, address: &str, outcome: DialOutcome);
}
