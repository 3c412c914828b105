use ferrous_relay_application::ports::{DialOutcome, MetricsPort};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{DNSClass, RecordType};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsPort for NoopMetrics {
    fn cache_inserted(&self) {}
    fn cache_hit(&self) {}
    fn cache_missed(&self) {}
    fn cache_expired(&self) {}
    fn cache_evicted(&self) {}

    fn filter_sizes(&self, _hostnames: usize, _ips: usize, _prefixes: usize) {}
    fn request_filtered(&self, _class: DNSClass, _record_type: RecordType) {}
    fn response_filtered(&self, _class: DNSClass, _record_type: RecordType) {}

    fn request_received(&self) {}
    fn question_received(&self, _class: DNSClass, _record_type: RecordType) {}
    fn inflight_changed(&self, _delta: i64) {}
    fn response_code(&self, _code: ResponseCode) {}
    fn answer_sent(&self, _class: DNSClass, _record_type: RecordType) {}
    fn response_sent(&self) {}

    fn upstream_dial(&self, _provider: &str, _address: &str, _outcome: DialOutcome) {}
}
